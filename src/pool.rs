//! Fixed-capacity recycler of entity records of a single kind.
//!
//! Live entities are kept in a contiguous prefix of the slot vector and dead
//! ones at the back.  `acquire` always examines the last slot and rotates it
//! to the front; `advance` rotates a finished entity to the back.  Both are
//! in-place rotations, so a pool never allocates after construction.

use tracing::debug;

use crate::entities::{Entity, EntityKind, SpriteSizes};
use crate::error::GameError;

#[derive(Clone, Debug)]
pub struct Pool {
    kind: EntityKind,
    slots: Vec<Entity>,
}

impl Pool {
    /// Fill `capacity` slots with dead records of `kind`, sized from `sprites`.
    pub fn new(kind: EntityKind, capacity: usize, sprites: &SpriteSizes) -> Result<Self, GameError> {
        if !kind.is_poolable() {
            return Err(GameError::UnsupportedPoolKind(kind));
        }
        if capacity == 0 {
            return Err(GameError::InvalidConfig(format!(
                "{kind:?} pool capacity must be non-zero"
            )));
        }
        let size = sprites.for_kind(kind);
        let slots = (0..capacity).map(|_| Entity::new(kind, size)).collect();
        Ok(Pool { kind, slots })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Kill every entity in place.  Used on restart.
    pub fn reset(&mut self) {
        for entity in &mut self.slots {
            entity.clear();
        }
    }

    /// Spawn the designated free slot at `(x, y)`.  Returns `false` when the
    /// pool is saturated; the request is simply dropped.
    pub fn acquire(&mut self, x: f32, y: f32, speed: f32) -> bool {
        let Some(last) = self.slots.last_mut() else {
            return false;
        };
        if last.alive {
            debug!(kind = ?self.kind, "pool saturated, spawn dropped");
            return false;
        }
        last.spawn(x, y, speed);
        self.slots.rotate_right(1);
        true
    }

    /// Spawn two entities, or none.  Both designated free slots (last and
    /// second to last) must be dead.
    pub fn acquire_pair(&mut self, first: (f32, f32, f32), second: (f32, f32, f32)) -> bool {
        let len = self.slots.len();
        if len < 2 || self.slots[len - 1].alive || self.slots[len - 2].alive {
            return false;
        }
        let (x1, y1, s1) = first;
        let (x2, y2, s2) = second;
        self.acquire(x1, y1, s1) && self.acquire(x2, y2, s2)
    }

    /// Advance every live entity front to back.  Finished entities are
    /// cleared and rotated to the back.  Iteration ends at the first dead
    /// slot.  Returns how many finished entities had been flagged colliding.
    pub fn advance(&mut self) -> u32 {
        let mut destroyed = 0;
        let mut i = 0;
        while i < self.slots.len() && self.slots[i].alive {
            let entity = &mut self.slots[i];
            if entity.advance() {
                if entity.is_colliding {
                    destroyed += 1;
                }
                entity.clear();
                self.slots[i..].rotate_left(1);
            } else {
                i += 1;
            }
        }
        destroyed
    }

    /// Live entities, in slot order.
    pub fn live(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().take_while(|entity| entity.alive)
    }

    /// Live entities paired with their slot index, for handing to the
    /// spatial index.  The slot index stays valid until the next `acquire`
    /// or `advance`.
    pub fn snapshot(&self) -> Vec<(usize, &Entity)> {
        self.live().enumerate().collect()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn is_exhausted(&self) -> bool {
        self.live_count() == 0
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Entity> {
        self.slots.get_mut(slot)
    }

    /// Every slot, live or dead.
    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }
}
