use thiserror::Error;

use super::object::{MeshId, SceneObject, TextureId};
use crate::gfx::geometry::mesh_vertices;
use crate::gfx::resources::{MeshHandle, TextureHandle};

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("object '{object}' draws {requested} vertices but its mesh only has {available}")]
    VertexCountExceedsMesh {
        object: &'static str,
        requested: u32,
        available: u32,
    },
}

/// The classroom's textured objects in draw order
#[derive(Debug, Clone)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Builds the classroom and checks every draw against its mesh
    pub fn classroom() -> Result<Self, SceneError> {
        let scene = Self {
            objects: classroom_objects(),
        };
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let available: Vec<u32> = MeshId::ALL
            .iter()
            .map(|&mesh| mesh_vertices(mesh).len() as u32)
            .collect();

        for object in &self.objects {
            let available = available[object.mesh.index()];
            if object.vertex_count > available {
                return Err(SceneError::VertexCountExceedsMesh {
                    object: object.name,
                    requested: object.vertex_count,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn classroom_objects() -> Vec<SceneObject> {
    use crate::gfx::scene::object::{MeshId as M, TextureId as T, TransformOp as Op};

    let no_turn = Op::rotate(0.0, [0.01, 0.01, 0.01]);
    let blackboard_recipe = vec![
        Op::rotate(0.0, [3.01, 0.01, -11.01]),
        Op::translate(0.0, 1.5, -3.67),
        Op::uniform_scale(4.0),
    ];
    let mut ground_recipe = blackboard_recipe.clone();
    ground_recipe.extend([
        Op::rotate(0.0, [0.001, 0.001, 0.0001]),
        Op::translate(0.0, -4.1, -0.3),
        Op::uniform_scale(7.0),
    ]);

    let pen_count = |mesh| mesh_vertices(mesh).len() as u32;

    vec![
        SceneObject::new(
            "compass",
            M::Compass,
            T::Protractor,
            vec![
                Op::rotate(240.0, [0.01, 0.01, 0.01]),
                Op::translate(0.14, -0.2, 0.467),
                Op::uniform_scale(1.1),
                Op::scale(0.75, 0.75, 0.25),
            ],
            18,
        ),
        SceneObject::new("blackboard", M::Blackboard, T::Blackboard, blackboard_recipe, 36)
            .with_accent(),
        SceneObject::new(
            "desk",
            M::Cube,
            T::Desk,
            vec![no_turn, Op::translate(0.0, 0.0, 0.0), Op::scale(1.8, 1.2, 1.5)],
            36,
        ),
        SceneObject::new(
            "red book",
            M::Cube,
            T::Red,
            vec![no_turn, Op::translate(0.0, 0.62, 0.05), Op::scale(0.4, 0.035, 0.6)],
            36,
        ),
        SceneObject::new(
            "blue book",
            M::Cube,
            T::Blue,
            vec![
                Op::rotate(0.0, [0.01, -1.1, 0.01]),
                Op::translate(0.0, 0.695, 0.03),
                Op::scale(0.4, 0.035, 0.4),
            ],
            36,
        ),
        SceneObject::new(
            "laptop base",
            M::Cube,
            T::LightGrey,
            vec![no_turn, Op::translate(-0.5, 0.64, 0.0285), Op::scale(0.4, 0.07, 0.5)],
            36,
        ),
        SceneObject::new(
            "laptop lower shell",
            M::Cube,
            T::Grey,
            vec![no_turn, Op::translate(-0.5, 0.605, 0.03), Op::scale(0.41, 0.01, 0.51)],
            36,
        ),
        SceneObject::new(
            "laptop upper shell",
            M::Cube,
            T::Grey,
            vec![no_turn, Op::translate(-0.5, 0.678, 0.03), Op::scale(0.41, 0.01, 0.51)],
            36,
        ),
        SceneObject::new(
            "laptop hinge",
            M::Cube,
            T::Grey,
            vec![no_turn, Op::translate(-0.3, 0.639, 0.03), Op::scale(0.01, 0.07, 0.51)],
            36,
        ),
        SceneObject::new(
            "laptop lid",
            M::Cube,
            T::Grey,
            vec![
                Op::rotate(7.0, [0.0, -0.08, 0.0]),
                Op::translate(-0.5, 0.7, 0.05),
                Op::scale(0.31, 0.03, 0.41),
            ],
            36,
        ),
        SceneObject::new(
            "purple book",
            M::Cube,
            T::Purple,
            vec![
                Op::rotate(-9.0, [0.0, 1.0, 0.0]),
                Op::translate(0.0, 0.66, 0.03),
                Op::scale(0.4, 0.035, 0.6),
            ],
            36,
        ),
        SceneObject::new("ground", M::Ground, T::Ground, ground_recipe, 6),
        SceneObject::new("pen body", M::PenBody, T::Metal, vec![], pen_count(M::PenBody)),
        SceneObject::new("pen clip", M::PenClip, T::Metal, vec![], pen_count(M::PenClip)),
        SceneObject::new("pen accent", M::PenAccent, T::Metal, vec![], pen_count(M::PenAccent)),
        SceneObject::new("pen point", M::PenPoint, T::Ballpoint, vec![], pen_count(M::PenPoint)),
        SceneObject::new(
            "skybox",
            M::Cube,
            T::Wall,
            vec![Op::translate(0.0, 0.0, -0.2), Op::uniform_scale(7.0)],
            36,
        ),
    ]
}

/// GPU handles for every texture and mesh, indexed by id
#[derive(Debug, Clone, Copy)]
pub struct SceneHandles {
    pub textures: [TextureHandle; TextureId::COUNT],
    pub meshes: [MeshHandle; MeshId::COUNT],
}

impl SceneHandles {
    pub fn texture(&self, id: TextureId) -> TextureHandle {
        self.textures[id.index()]
    }

    pub fn mesh(&self, id: MeshId) -> MeshHandle {
        self.meshes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, SquareMatrix};

    #[test]
    fn classroom_validates() {
        let scene = Scene::classroom().unwrap();
        assert_eq!(scene.len(), 17);
        assert_eq!(scene.objects[0].name, "compass");
        assert_eq!(scene.objects[16].name, "skybox");
    }

    #[test]
    fn only_the_blackboard_is_accented() {
        let scene = Scene::classroom().unwrap();
        let accented: Vec<_> = scene
            .objects
            .iter()
            .filter(|o| o.accent)
            .map(|o| o.name)
            .collect();
        assert_eq!(accented, vec!["blackboard"]);
    }

    #[test]
    fn ground_continues_the_blackboard_chain() {
        let scene = Scene::classroom().unwrap();
        let blackboard = &scene.objects[1];
        let ground = &scene.objects[11];
        assert_eq!(ground.name, "ground");
        assert_eq!(&ground.recipe[..3], &blackboard.recipe[..]);
        assert_eq!(ground.vertex_count, 6);
    }

    #[test]
    fn pen_parts_use_identity_models() {
        let scene = Scene::classroom().unwrap();
        for object in scene.objects.iter().filter(|o| o.name.starts_with("pen")) {
            assert_eq!(object.model_matrix(), Matrix4::identity());
        }
    }

    #[test]
    fn oversized_draw_is_rejected() {
        let scene = Scene {
            objects: vec![SceneObject::new("bad compass", MeshId::Compass, TextureId::Protractor, vec![], 36)],
        };
        assert_eq!(
            scene.validate(),
            Err(SceneError::VertexCountExceedsMesh {
                object: "bad compass",
                requested: 36,
                available: 18,
            })
        );
    }

    #[test]
    fn handles_are_looked_up_by_id() {
        let textures = std::array::from_fn(|i| TextureHandle::from_raw(i as u32 + 1));
        let meshes = std::array::from_fn(|i| MeshHandle::from_raw(i as u32 + 100));
        let handles = SceneHandles { textures, meshes };
        assert_eq!(handles.texture(TextureId::Wall).raw(), 5);
        assert_eq!(handles.mesh(MeshId::LightCube).raw(), 108);
    }
}
