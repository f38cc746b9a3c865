//! Handle-based ownership of GPU resources
//!
//! Resources are loaded once at startup and referred to by small opaque
//! handles afterwards. The cache owns every resource; dropping the cache (or
//! releasing a handle) drops the wgpu objects, which frees the GPU memory.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque, typed reference to a resource in a [`ResourceCache`].
///
/// Raw value 0 is never handed out.
pub struct ResourceHandle<T> {
    raw: u32,
    resource_type: PhantomData<fn() -> T>,
}

impl<T> ResourceHandle<T> {
    pub const INVALID: Self = Self::from_raw(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            resource_type: PhantomData,
        }
    }

    pub fn raw(self) -> u32 {
        self.raw
    }

    pub fn is_valid(self) -> bool {
        self.raw != 0
    }
}

// Manual impls: derives would demand `T: Clone` etc. for the marker type.
impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResourceHandle<T> {}

impl<T> PartialEq for ResourceHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for ResourceHandle<T> {}

impl<T> Hash for ResourceHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.raw)
    }
}

pub struct ResourceCache<T> {
    label: &'static str,
    entries: HashMap<u32, T>,
    next_raw: u32,
}

impl<T> ResourceCache<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: HashMap::new(),
            next_raw: 1,
        }
    }

    /// Takes ownership of `resource` and returns its handle
    pub fn insert(&mut self, resource: T) -> ResourceHandle<T> {
        let raw = self.next_raw;
        self.next_raw += 1;
        self.entries.insert(raw, resource);
        ResourceHandle::from_raw(raw)
    }

    pub fn get(&self, handle: ResourceHandle<T>) -> Option<&T> {
        self.entries.get(&handle.raw)
    }

    pub fn contains(&self, handle: ResourceHandle<T>) -> bool {
        self.entries.contains_key(&handle.raw)
    }

    /// Removes the resource and hands it back.
    ///
    /// Handles are never reused, so releasing twice returns `None` the second
    /// time instead of freeing an unrelated resource.
    pub fn release(&mut self, handle: ResourceHandle<T>) -> Option<T> {
        self.entries.remove(&handle.raw)
    }

    /// Drops every resource, returning how many were released
    pub fn release_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        log::debug!("Released {} {} resources", count, self.label);
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn handles_are_unique_and_never_zero() {
        let mut cache = ResourceCache::new("test");
        let a = cache.insert("a");
        let b = cache.insert("b");

        assert!(a.is_valid());
        assert!(b.is_valid());
        assert_ne!(a, b);
        assert_eq!(cache.get(a), Some(&"a"));
        assert_eq!(cache.get(b), Some(&"b"));
    }

    #[test]
    fn invalid_handle_resolves_to_nothing() {
        let mut cache = ResourceCache::new("test");
        cache.insert(1u8);
        assert!(!ResourceHandle::<u8>::INVALID.is_valid());
        assert!(cache.get(ResourceHandle::INVALID).is_none());
    }

    #[test]
    fn second_release_is_a_no_op() {
        let mut cache = ResourceCache::new("test");
        let a = cache.insert(String::from("a"));
        let b = cache.insert(String::from("b"));

        assert_eq!(cache.release(a).as_deref(), Some("a"));
        assert_eq!(cache.release(a), None);
        assert!(cache.contains(b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn handles_are_not_reused_after_release() {
        let mut cache = ResourceCache::new("test");
        let a = cache.insert(1);
        cache.release(a);
        let b = cache.insert(2);
        assert_ne!(a, b);
        assert!(cache.get(a).is_none());
    }

    #[test]
    fn dropping_cache_releases_everything() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut cache = ResourceCache::new("test");
            cache.insert(DropCounter(drops.clone()));
            cache.insert(DropCounter(drops.clone()));
        }
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn release_all_counts_entries() {
        let drops = Rc::new(Cell::new(0));
        let mut cache = ResourceCache::new("test");
        cache.insert(DropCounter(drops.clone()));
        cache.insert(DropCounter(drops.clone()));
        cache.insert(DropCounter(drops.clone()));

        assert_eq!(cache.release_all(), 3);
        assert_eq!(drops.get(), 3);
        assert!(cache.is_empty());
    }
}
