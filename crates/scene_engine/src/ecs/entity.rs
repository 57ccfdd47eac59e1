//! Entity implementation

/// Entity identifier
///
/// An index into every per-kind component table plus a generation that
/// invalidates stale handles once the index is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

/// Reserved "no object" handle. Index 0 is materialized as a placeholder
/// when a store is created, so it never names a user object.
pub const ENGINE_INVALID_GAME_OBJECT_ID: Entity = Entity::INVALID;

impl Entity {
    /// The sentinel handle
    pub const INVALID: Self = Self { index: 0, generation: 0 };

    /// Create an entity handle from its parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the entity index (row in the component tables)
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the entity generation
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.index
    }

    /// Whether this handle is the reserved sentinel
    pub const fn is_invalid(&self) -> bool {
        self.index == 0
    }

    /// Pack into a single opaque integer
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Unpack from [`Entity::to_bits`]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Allocates entity indices, recycling freed ones with a bumped generation
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live_count: usize,
}

impl EntityAllocator {
    pub(crate) fn allocate(&mut self) -> Entity {
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Entity::new(index, self.generations[slot]);
        }

        let index = u32::try_from(self.generations.len()).unwrap_or(u32::MAX);
        self.generations.push(0);
        self.alive.push(true);
        Entity::new(index, 0)
    }

    pub(crate) fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.index() as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index());
        self.live_count -= 1;
        true
    }

    pub(crate) fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index() as usize;
        slot < self.alive.len() && self.alive[slot] && self.generations[slot] == entity.generation()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live_count
    }

    pub(crate) fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| Entity::new(index as u32, self.generations[index]))
    }
}
