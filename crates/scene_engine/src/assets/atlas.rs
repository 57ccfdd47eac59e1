//! Fixed-capacity, name-keyed resource registry

use std::collections::HashMap;
use std::marker::PhantomData;

use super::handle::AssetHandle;

/// Stores up to `capacity` resources and hands out typed handles for them
pub struct Atlas<H, T> {
    items: Vec<T>,
    names: HashMap<String, u32>,
    capacity: usize,
    _handle: PhantomData<H>,
}

impl<H: AssetHandle, T> Atlas<H, T> {
    /// Create an empty atlas holding at most `capacity` resources
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            names: HashMap::new(),
            capacity,
            _handle: PhantomData,
        }
    }

    /// Register a resource under `name`
    ///
    /// Returns the existing handle when the name is already registered and
    /// the invalid handle when the atlas is full.
    pub fn add(&mut self, name: &str, item: T) -> H {
        if let Some(&index) = self.names.get(name) {
            log::warn!("Atlas already holds '{}', keeping the first entry", name);
            return H::from_raw(index);
        }
        if self.items.len() >= self.capacity {
            log::error!("Atlas full ({} entries), cannot add '{}'", self.capacity, name);
            return H::INVALID;
        }
        let Ok(index) = u32::try_from(self.items.len()) else {
            return H::INVALID;
        };
        self.items.push(item);
        self.names.insert(name.to_string(), index);
        log::debug!("Atlas registered '{}' as {:?}", name, H::from_raw(index));
        H::from_raw(index)
    }

    /// Look up a resource; invalid or out-of-range handles yield `None`
    pub fn get(&self, handle: H) -> Option<&T> {
        if !handle.is_valid() {
            return None;
        }
        self.items.get(handle.raw() as usize)
    }

    /// Handle registered under `name`, or the invalid handle
    pub fn find(&self, name: &str) -> H {
        self.names.get(name).map_or(H::INVALID, |&index| H::from_raw(index))
    }

    /// Number of registered resources
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of resources
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GeometryHandle;

    #[test]
    fn test_add_and_find() {
        let mut atlas: Atlas<GeometryHandle, &str> = Atlas::new(4);
        let cube = atlas.add("cube", "cube-data");
        assert!(cube.is_valid());
        assert_eq!(atlas.find("cube"), cube);
        assert_eq!(atlas.get(cube), Some(&"cube-data"));
        assert_eq!(atlas.find("sphere"), GeometryHandle::INVALID);
    }

    #[test]
    fn test_full_atlas_returns_invalid_handle() {
        let mut atlas: Atlas<GeometryHandle, u32> = Atlas::new(1);
        assert!(atlas.add("a", 1).is_valid());
        assert_eq!(atlas.add("b", 2), GeometryHandle::INVALID);
        assert_eq!(atlas.len(), 1);
        assert_eq!(atlas.get(GeometryHandle::INVALID), None);
        assert_eq!(atlas.get(GeometryHandle(7)), None);
    }
}
