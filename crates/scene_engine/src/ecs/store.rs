//! Component store
//!
//! Owns every component table, the entity allocator, per-entity kind masks and
//! the registered change observers. Mutations made through [`ComponentStore::insert`],
//! [`ComponentStore::replace`], [`ComponentStore::patch`] and [`ComponentStore::remove`]
//! run the kind's lifecycle hooks and notify observers; [`ComponentStore::get_mut`]
//! is a silent write used by engine systems for derived data.

use std::collections::BTreeMap;

use super::entity::EntityAllocator;
use super::observer::{Observer, ObserverId, Trigger};
use super::storage::{AnyStorage, ComponentStorage, ConstructHook, DestroyHook, UpdateHook};
use super::view::ComponentView;
use super::{Component, ComponentKind, EcsError, Entity, KindSet};

fn erase_component<T: Component>(store: &mut ComponentStore, entity: Entity) -> bool {
    store.remove::<T>(entity).is_some()
}

/// Typed component tables keyed by kind, plus entity bookkeeping
pub struct ComponentStore {
    entities: EntityAllocator,
    masks: Vec<KindSet>,
    storages: BTreeMap<ComponentKind, Box<dyn AnyStorage>>,
    observers: Vec<Observer>,
}

impl ComponentStore {
    /// Create an empty store with the placeholder entity materialized at index 0
    pub fn new() -> Self {
        let mut store = Self {
            entities: EntityAllocator::default(),
            masks: Vec::new(),
            storages: BTreeMap::new(),
            observers: Vec::new(),
        };
        let placeholder = store.create();
        debug_assert_eq!(placeholder, Entity::INVALID);
        store
    }

    // --- Entities ---------------------------------------------------------

    /// Create a new entity
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.allocate();
        let slot = entity.index() as usize;
        if self.masks.len() <= slot {
            self.masks.resize(slot + 1, KindSet::empty());
        }
        self.masks[slot] = KindSet::empty();
        log::trace!("Created entity {:?}", entity);
        entity
    }

    /// Destroy an entity, removing every component (with hooks) first
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        if entity.is_invalid() {
            return Err(EcsError::ReservedEntity(entity));
        }
        self.check_alive(entity)?;

        for kind in self.mask(entity).kinds() {
            // Earlier hooks may already have removed this kind
            if !self.mask(entity).contains(kind.set()) {
                continue;
            }
            if let Some(erase) = self.storages.get(&kind).map(|storage| storage.erase_fn()) {
                erase(self, entity);
            }
        }

        for observer in &mut self.observers {
            observer.forget(entity);
        }
        self.masks[entity.index() as usize] = KindSet::empty();
        self.entities.free(entity);
        log::debug!("Destroyed entity {:?}", entity);
        Ok(())
    }

    /// Whether the handle names a live entity (the placeholder counts as alive)
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live user entities (the placeholder is not counted)
    pub fn entity_count(&self) -> usize {
        self.entities.live_count().saturating_sub(1)
    }

    /// Iterate live user entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive().filter(|entity| !entity.is_invalid())
    }

    /// The set of component kinds attached to an entity
    pub fn mask(&self, entity: Entity) -> KindSet {
        if !self.is_alive(entity) {
            return KindSet::empty();
        }
        self.masks.get(entity.index() as usize).copied().unwrap_or_default()
    }

    fn check_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::DeadEntity(entity))
        }
    }

    fn check_writable(&self, entity: Entity) -> Result<(), EcsError> {
        if entity.is_invalid() {
            return Err(EcsError::ReservedEntity(entity));
        }
        self.check_alive(entity)
    }

    fn set_mask_bit(&mut self, entity: Entity, kind: ComponentKind, present: bool) {
        if let Some(mask) = self.masks.get_mut(entity.index() as usize) {
            mask.set(kind.set(), present);
        }
    }

    // --- Tables -----------------------------------------------------------

    /// Typed table for a component kind, if one has been created
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages.get(&T::KIND)?.as_any().downcast_ref()
    }

    fn existing_storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages.get_mut(&T::KIND)?.as_any_mut().downcast_mut()
    }

    fn storage_mut<T: Component>(&mut self) -> Result<&mut ComponentStorage<T>, EcsError> {
        self.storages
            .entry(T::KIND)
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new(erase_component::<T>)))
            .as_any_mut()
            .downcast_mut()
            .ok_or(EcsError::KindMismatch(T::KIND))
    }

    /// Register the hook run after a `T` is constructed
    pub fn on_construct<T: Component>(&mut self, hook: ConstructHook) -> Result<(), EcsError> {
        self.storage_mut::<T>()?.hooks.on_construct = Some(hook);
        Ok(())
    }

    /// Register the hook run after a `T` is replaced
    pub fn on_update<T: Component>(&mut self, hook: UpdateHook<T>) -> Result<(), EcsError> {
        self.storage_mut::<T>()?.hooks.on_update = Some(hook);
        Ok(())
    }

    /// Register the hook run when a `T` is destroyed
    pub fn on_destroy<T: Component>(&mut self, hook: DestroyHook<T>) -> Result<(), EcsError> {
        self.storage_mut::<T>()?.hooks.on_destroy = Some(hook);
        Ok(())
    }

    /// Keep removed `T` values until [`ComponentStore::drain_retired`] collects them
    pub fn retain_removed<T: Component>(&mut self) -> Result<(), EcsError> {
        self.storage_mut::<T>()?.set_retain_removed(true);
        Ok(())
    }

    /// Collect removed values retained for `T`
    pub fn drain_retired<T: Component>(&mut self) -> Vec<(Entity, T)> {
        self.existing_storage_mut::<T>()
            .map(ComponentStorage::drain_retired)
            .unwrap_or_default()
    }

    // --- Component CRUD ---------------------------------------------------

    /// Attach a component, running the on-construct hook
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<&mut T, EcsError> {
        self.check_writable(entity)?;

        let storage = self.storage_mut::<T>()?;
        if !storage.insert(entity, value) {
            log::error!("Entity {:?} already has a {} component", entity, T::KIND);
            return Err(EcsError::DuplicateComponent { entity, kind: T::KIND });
        }
        let hook = storage.hooks.on_construct;
        self.set_mask_bit(entity, T::KIND, true);

        if let Some(hook) = hook {
            if let Err(err) = hook(self, entity) {
                log::error!("Construct hook for {} on {:?} failed: {}", T::KIND, entity, err);
                if let Ok(storage) = self.storage_mut::<T>() {
                    storage.take(entity);
                }
                self.set_mask_bit(entity, T::KIND, false);
                return Err(err);
            }
        }

        self.notify_membership(entity, T::KIND, true);
        self.get_mut::<T>(entity)
            .ok_or(EcsError::MissingComponent { entity, kind: T::KIND })
    }

    /// Attach a default-constructed component
    pub fn emplace<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.insert(entity, T::default())
    }

    /// Replace a component's full value, running the on-update hook and notifying observers
    pub fn replace<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        self.check_writable(entity)?;

        let storage = self.storage_mut::<T>()?;
        let Some(previous) = storage.replace(entity, value) else {
            log::error!("Entity {:?} has no {} component to update", entity, T::KIND);
            return Err(EcsError::MissingComponent { entity, kind: T::KIND });
        };
        let hook = storage.hooks.on_update;

        if let Some(hook) = hook {
            if let Err(err) = hook(self, entity, &previous) {
                log::error!("Update hook for {} on {:?} failed: {}", T::KIND, entity, err);
                if let Ok(storage) = self.storage_mut::<T>() {
                    storage.replace(entity, previous);
                }
                return Err(err);
            }
        }

        self.notify_updated(entity, T::KIND);
        Ok(())
    }

    /// Edit a component in place; counts as an update
    pub fn patch<T: Component>(&mut self, entity: Entity, edit: impl FnOnce(&mut T)) -> Result<(), EcsError> {
        let mut value = self
            .get::<T>(entity)
            .cloned()
            .ok_or(EcsError::MissingComponent { entity, kind: T::KIND })?;
        edit(&mut value);
        self.replace(entity, value)
    }

    /// Insert the component, or replace it if already present
    pub fn insert_or_replace<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if self.has::<T>(entity) {
            self.replace(entity, value)
        } else {
            self.insert(entity, value).map(|_| ())
        }
    }

    /// Detach a component, running the on-destroy hook first
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let storage = self.existing_storage_mut::<T>()?;
        let value = storage.take(entity)?;
        let hook = storage.hooks.on_destroy;
        self.set_mask_bit(entity, T::KIND, false);

        if let Some(hook) = hook {
            hook(self, entity, &value);
        }
        self.notify_membership(entity, T::KIND, false);

        if let Some(storage) = self.existing_storage_mut::<T>() {
            storage.retire(entity, value.clone());
        }
        Some(value)
    }

    /// Read a component
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Write a component without running hooks or notifying observers
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.existing_storage_mut::<T>()?.get_mut(entity)
    }

    /// Whether the entity has a `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_kind(entity, T::KIND)
    }

    /// Whether the entity has a component of `kind`
    pub fn has_kind(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.mask(entity).contains(kind.set())
    }

    /// Whether the entity has every kind in `kinds`
    pub fn has_all(&self, entity: Entity, kinds: KindSet) -> bool {
        self.is_alive(entity) && self.mask(entity).contains(kinds)
    }

    /// Iterate every `T` with its entity
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    /// Number of stored components of `kind`
    pub fn count(&self, kind: ComponentKind) -> usize {
        self.storages.get(&kind).map_or(0, |storage| storage.len())
    }

    pub(crate) fn entities_of(&self, kind: ComponentKind) -> &[Entity] {
        self.storages.get(&kind).map_or(&[], |storage| storage.entities())
    }

    /// Entities having every `include` kind and none of the `exclude` kinds
    pub fn query(&self, include: KindSet, exclude: KindSet) -> Vec<Entity> {
        ComponentView::new(include).excluding(exclude).iter(self).collect()
    }

    // --- Observers --------------------------------------------------------

    /// Register an observer
    pub fn observe(&mut self, trigger: Trigger) -> ObserverId {
        self.observers.push(Observer::new(trigger));
        ObserverId(self.observers.len() - 1)
    }

    /// Inspect an observer
    pub fn observer(&self, id: ObserverId) -> Option<&Observer> {
        self.observers.get(id.0)
    }

    /// Take an observer's pending entities, leaving it empty
    pub fn drain(&mut self, id: ObserverId) -> Vec<Entity> {
        self.observers.get_mut(id.0).map(Observer::drain).unwrap_or_default()
    }

    fn notify_membership(&mut self, entity: Entity, kind: ComponentKind, added: bool) {
        let mask = self.mask(entity);
        for observer in &mut self.observers {
            observer.on_membership_changed(entity, kind, mask, added);
        }
    }

    fn notify_updated(&mut self, entity: Entity, kind: ComponentKind) {
        let mask = self.mask(entity);
        for observer in &mut self.observers {
            observer.on_updated(entity, kind, mask);
        }
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}
