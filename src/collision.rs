//! Broad-phase driven collision detection.
//!
//! The quadtree stores lightweight `Collider` copies rather than references
//! into the pools; each carries an `EntityHandle` so the orchestrator can
//! write the resulting flags back to the owning pool.

use std::collections::HashSet;

use crate::entities::{Entity, EntityKind, Rect};
use crate::quadtree::{Bounded, QuadTree};

/// Which container an entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Ribbon,
    Bullets,
    Hostiles,
}

/// Stable for the duration of one frame's detection pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub owner: Owner,
    pub slot: usize,
}

impl EntityHandle {
    pub const fn new(owner: Owner, slot: usize) -> Self {
        EntityHandle { owner, slot }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub handle: EntityHandle,
    pub rect: Rect,
    pub kind: EntityKind,
    pub collidable_with: Option<EntityKind>,
}

impl Collider {
    pub fn from_entity(handle: EntityHandle, entity: &Entity) -> Self {
        Collider {
            handle,
            rect: entity.rect,
            kind: entity.kind,
            collidable_with: entity.collidable_with,
        }
    }

    /// Tag match from this side only, plus exact overlap.
    pub fn hits(&self, other: &Collider) -> bool {
        self.collidable_with == Some(other.kind) && self.rect.overlaps(&other.rect)
    }
}

impl Bounded for Collider {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Test every stored collider against its broad-phase candidates and return
/// the handles of everything that should be flagged colliding.  A match is
/// decided by the querying side's tag, but both participants are flagged.
pub fn resolve(tree: &QuadTree<Collider>) -> HashSet<EntityHandle> {
    let mut flagged = HashSet::new();
    let mut candidates = Vec::new();
    for collider in tree.all() {
        candidates.clear();
        tree.query_into(&collider, &mut candidates);
        for candidate in &candidates {
            if collider.hits(candidate) {
                flagged.insert(collider.handle);
                flagged.insert(candidate.handle);
            }
        }
    }
    flagged
}
