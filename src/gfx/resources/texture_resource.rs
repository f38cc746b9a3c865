//! Texture loading and GPU texture resources
//!
//! Image files are decoded on the CPU into a [`DecodedTexture`] whose channel
//! layout is inferred from the file itself: one channel becomes a red-only
//! texture, three channels are expanded to RGBA with opaque alpha, four are
//! uploaded as is. [`TextureResource`] owns the uploaded texture, its view
//! and sampler.

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to read texture {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode texture {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("texture {} has {channels} channels, expected 1, 3 or 4", .path.display())]
    UnsupportedChannels { path: PathBuf, channels: u8 },
}

/// Channel layout found in the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Single channel, sampled as `(r, 0, 0, 1)`
    Red,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            ChannelLayout::Red => wgpu::TextureFormat::R8Unorm,
            ChannelLayout::Rgb | ChannelLayout::Rgba => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Bytes per pixel of the uploaded data
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            ChannelLayout::Red => 1,
            ChannelLayout::Rgb | ChannelLayout::Rgba => 4,
        }
    }
}

/// Pixels ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub pixels: Vec<u8>,
}

impl DecodedTexture {
    /// Reads and decodes an image file
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes, path)
    }

    /// Decodes an in-memory image. `path` is only used for error reporting.
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = (image.width(), image.height());
        let (layout, pixels) = match image.color().channel_count() {
            1 => (ChannelLayout::Red, image.into_luma8().into_raw()),
            3 => (ChannelLayout::Rgb, image.into_rgba8().into_raw()),
            4 => (ChannelLayout::Rgba, image.into_rgba8().into_raw()),
            channels => {
                return Err(TextureError::UnsupportedChannels {
                    path: path.to_path_buf(),
                    channels,
                })
            }
        };

        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            width,
            height,
            layout
        );

        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// A 1x1 texture of a single colour
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            layout: ChannelLayout::Rgba,
            pixels: rgba.to_vec(),
        }
    }
}

/// GPU texture resource containing texture, view, and sampler
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the renderer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `config` - Surface configuration to match dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads decoded pixels as a sampled texture.
    ///
    /// Sampling repeats outside 0..1 and filters linearly; no mipmaps are
    /// generated.
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `queue` - WGPU queue for uploading data
    /// * `decoded` - Pixels and their channel layout
    /// * `label` - Debug label for the texture
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        decoded: &DecodedTexture,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: decoded.width,
            height: decoded.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: decoded.layout.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &decoded.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(decoded.layout.bytes_per_pixel() * decoded.width),
                rows_per_image: Some(decoded.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn single_channel_becomes_red() {
        let png = encode_png(DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            2,
            3,
            image::Luma([200]),
        )));
        let decoded = DecodedTexture::decode(&png, Path::new("grey.png")).unwrap();

        assert_eq!(decoded.layout, ChannelLayout::Red);
        assert_eq!(decoded.layout.texture_format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.pixels, vec![200; 6]);
    }

    #[test]
    fn rgb_is_expanded_with_opaque_alpha() {
        let png = encode_png(DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            2,
            2,
            image::Rgb([10, 20, 30]),
        )));
        let decoded = DecodedTexture::decode(&png, Path::new("wall.png")).unwrap();

        assert_eq!(decoded.layout, ChannelLayout::Rgb);
        assert_eq!(decoded.pixels.len(), 2 * 2 * 4);
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn rgba_is_kept() {
        let png = encode_png(DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([1, 2, 3, 4]),
        )));
        let decoded = DecodedTexture::decode(&png, Path::new("metal.png")).unwrap();

        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(decoded.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let png = encode_png(DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
            1,
            1,
            image::LumaA([1, 2]),
        )));
        let err = DecodedTexture::decode(&png, Path::new("la.png")).unwrap_err();
        assert!(matches!(err, TextureError::UnsupportedChannels { channels: 2, .. }));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = DecodedTexture::decode(b"not an image", Path::new("bad.jpg")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("bad.jpg"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DecodedTexture::load(Path::new("no/such/texture.png")).unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }

    #[test]
    fn solid_texture_is_one_pixel() {
        let solid = DecodedTexture::solid([0, 0, 0, 255]);
        assert_eq!((solid.width, solid.height), (1, 1));
        assert_eq!(solid.pixels.len() as u32, solid.layout.bytes_per_pixel());
    }
}
