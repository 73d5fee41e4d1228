//! Generational entity storage
//!
//! Slots are reused after an entity is purged, but each reuse bumps the slot
//! generation so a handle kept from before the purge resolves to `None`
//! instead of aliasing the new occupant.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Stable reference to an entity in an [`EntityArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Reserved handle for the player, never issued by an arena
    pub const PLAYER: EntityHandle = EntityHandle {
        index: u32::MAX,
        generation: 0,
    };

    /// Placeholder carried by entities that have not been inserted yet
    pub const DETACHED: EntityHandle = EntityHandle {
        index: u32::MAX - 1,
        generation: 0,
    };

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Owned collection of live entities
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, stamping it with its new handle
    pub fn insert(&mut self, mut entity: Entity) -> EntityHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let handle = EntityHandle {
            index,
            generation: slot.generation,
        };
        entity.id = handle;
        slot.entity = Some(entity);
        self.len += 1;
        handle
    }

    /// Remove an entity; stale or unknown handles return `None`
    pub fn remove(&mut self, handle: EntityHandle) -> Option<Entity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(entity)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every entity, invalidating all outstanding handles
    pub fn clear(&mut self) {
        let handles: Vec<_> = self.handles().collect();
        for handle in handles {
            self.remove(handle);
        }
    }

    /// Purge entities whose `active` flag is false. Returns how many were removed.
    pub fn purge_inactive(&mut self) -> usize {
        let dead: Vec<_> = self
            .iter()
            .filter(|e| !e.active)
            .map(|e| e.id)
            .collect();
        for handle in &dead {
            self.remove(*handle);
        }
        dead.len()
    }

    /// Iterate live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|s| s.entity.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter_map(|s| s.entity.as_mut())
    }

    pub fn handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.iter().map(|e| e.id)
    }
}
