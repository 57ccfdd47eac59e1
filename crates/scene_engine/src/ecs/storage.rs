//! Sparse-set component storage
//!
//! One table per component kind. Lookup goes through a sparse array indexed by
//! entity index; values live densely packed for iteration.

use std::any::Any;

use super::{ComponentStore, EcsError, Entity};

/// Hook run after a component is constructed; an error rolls the insert back
pub type ConstructHook = fn(&mut ComponentStore, Entity) -> Result<(), EcsError>;

/// Hook run after a component is replaced, receiving the previous value; an error rolls the update back
pub type UpdateHook<T> = fn(&mut ComponentStore, Entity, &T) -> Result<(), EcsError>;

/// Hook run when a component is destroyed, receiving the removed value
pub type DestroyHook<T> = fn(&mut ComponentStore, Entity, &T);

/// Lifecycle hooks registered for one component kind
pub struct Hooks<T> {
    pub(crate) on_construct: Option<ConstructHook>,
    pub(crate) on_update: Option<UpdateHook<T>>,
    pub(crate) on_destroy: Option<DestroyHook<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            on_construct: None,
            on_update: None,
            on_destroy: None,
        }
    }
}

/// Type-erased removal entry point, instantiated per component type
pub(crate) type EraseFn = fn(&mut ComponentStore, Entity) -> bool;

/// Type-erased view of a component table
pub(crate) trait AnyStorage {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn len(&self) -> usize;
    fn entities(&self) -> &[Entity];
    fn erase_fn(&self) -> EraseFn;
}

/// Storage for a single component type
pub struct ComponentStorage<T> {
    sparse: Vec<Option<u32>>,
    dense: Vec<Entity>,
    data: Vec<T>,
    pub(crate) hooks: Hooks<T>,
    retain_removed: bool,
    retired: Vec<(Entity, T)>,
    erase: EraseFn,
}

impl<T: 'static> ComponentStorage<T> {
    pub(crate) fn new(erase: EraseFn) -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
            hooks: Hooks::default(),
            retain_removed: false,
            retired: Vec::new(),
            erase,
        }
    }

    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let slot = (*self.sparse.get(entity.index() as usize)?)? as usize;
        (self.dense[slot] == entity).then_some(slot)
    }

    /// Whether the entity has a value in this table
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Insert a value; returns false if one already exists
    pub(crate) fn insert(&mut self, entity: Entity, value: T) -> bool {
        if self.contains(entity) {
            return false;
        }
        let slot = entity.index() as usize;
        if self.sparse.len() <= slot {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.dense.len() as u32);
        self.dense.push(entity);
        self.data.push(value);
        true
    }

    /// Swap in a new value, returning the previous one
    pub(crate) fn replace(&mut self, entity: Entity, value: T) -> Option<T> {
        let slot = self.dense_index(entity)?;
        Some(std::mem::replace(&mut self.data[slot], value))
    }

    /// Remove and return a value without running hooks
    pub(crate) fn take(&mut self, entity: Entity) -> Option<T> {
        let slot = self.dense_index(entity)?;
        let last = self.dense.len() - 1;
        self.dense.swap(slot, last);
        self.data.swap(slot, last);
        self.dense.pop();
        let value = self.data.pop()?;
        self.sparse[entity.index() as usize] = None;
        if slot < self.dense.len() {
            let moved = self.dense[slot];
            self.sparse[moved.index() as usize] = Some(slot as u32);
        }
        Some(value)
    }

    /// Dispose of a value that has finished its destroy hooks
    pub(crate) fn retire(&mut self, entity: Entity, value: T) {
        if self.retain_removed {
            self.retired.push((entity, value));
        }
    }

    pub(crate) fn set_retain_removed(&mut self, retain: bool) {
        self.retain_removed = retain;
    }

    pub(crate) fn drain_retired(&mut self) -> Vec<(Entity, T)> {
        std::mem::take(&mut self.retired)
    }

    /// Get a value
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|slot| &self.data[slot])
    }

    /// Get a mutable value
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(move |slot| &mut self.data[slot])
    }

    /// Iterate entity/value pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.dense.iter().copied().zip(self.data.iter())
    }

    /// Iterate entity/value pairs mutably in dense order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.dense.iter().copied().zip(self.data.iter_mut())
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<T: 'static> AnyStorage for ComponentStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn entities(&self) -> &[Entity] {
        &self.dense
    }

    fn erase_fn(&self) -> EraseFn {
        self.erase
    }
}
