//! Entity records and the plain geometry they carry.
//!
//! Every poolable, collidable object in the game is an `Entity`: a rectangle,
//! a kind tag, the kind it can collide with, two flags and a per-kind motion
//! state.  Records are created once and recycled forever via `spawn` and
//! `clear`; nothing here allocates.

use serde::Deserialize;

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The player-controlled ribbon.
    Ribbon,
    Bullet,
    /// A hostile cell, destroyed by bullets.
    Hostile,
    Background,
}

impl EntityKind {
    /// The single kind this kind can collide with, if it takes part at all.
    pub const fn collidable_with(self) -> Option<EntityKind> {
        match self {
            EntityKind::Bullet => Some(EntityKind::Hostile),
            EntityKind::Hostile => Some(EntityKind::Bullet),
            EntityKind::Ribbon | EntityKind::Background => None,
        }
    }

    /// Only bullets and hostiles are recycled through a pool.
    pub const fn is_poolable(self) -> bool {
        matches!(self, EntityKind::Bullet | EntityKind::Hostile)
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in canvas units.  `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict AABB overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Finite coordinates and a non-negative size.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

// ── Sprite sizes ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SpriteSize {
    pub width: f32,
    pub height: f32,
}

impl SpriteSize {
    pub const fn new(width: f32, height: f32) -> Self {
        SpriteSize { width, height }
    }
}

/// Pixel dimensions of every kind's sprite.  Needed before any pool is built,
/// because an entity's size is its sprite's size.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpriteSizes {
    pub background: SpriteSize,
    pub ribbon: SpriteSize,
    pub bullet: SpriteSize,
    pub hostile: SpriteSize,
}

impl Default for SpriteSizes {
    fn default() -> Self {
        SpriteSizes {
            background: SpriteSize::new(600.0, 360.0),
            ribbon: SpriteSize::new(38.0, 36.0),
            bullet: SpriteSize::new(7.0, 7.0),
            hostile: SpriteSize::new(36.0, 30.0),
        }
    }
}

impl SpriteSizes {
    pub fn for_kind(&self, kind: EntityKind) -> SpriteSize {
        match kind {
            EntityKind::Background => self.background,
            EntityKind::Ribbon => self.ribbon,
            EntityKind::Bullet => self.bullet,
            EntityKind::Hostile => self.hostile,
        }
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

/// How far left of its spawn column a hostile may sway.
pub const HOSTILE_SWAY_LEFT: f32 = 45.0;
/// Right sway limit, measured back from the spawn column before adding width.
pub const HOSTILE_SWAY_RIGHT: f32 = 30.0;
/// Distance a hostile descends before it starts sweeping sideways.
pub const HOSTILE_DESCENT: f32 = 185.0;
/// Lift applied once when a hostile reaches its descent limit.
pub const HOSTILE_LIFT: f32 = 5.0;
/// Sideways speed after the descent phase ends.
pub const HOSTILE_SWEEP_SPEED: f32 = 1.1;

/// Kind-specific motion state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Ribbon and background move under orchestrator control, not on their own.
    Still,
    Bullet {
        speed: f32,
    },
    Hostile {
        speed: f32,
        speed_x: f32,
        speed_y: f32,
        left_edge: f32,
        right_edge: f32,
        bottom_edge: f32,
        top_edge: f32,
    },
}

impl Motion {
    fn idle(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Bullet => Motion::Bullet { speed: 0.0 },
            EntityKind::Hostile => Motion::Hostile {
                speed: 0.0,
                speed_x: 0.0,
                speed_y: 0.0,
                left_edge: 0.0,
                right_edge: 0.0,
                bottom_edge: 0.0,
                top_edge: 0.0,
            },
            EntityKind::Ribbon | EntityKind::Background => Motion::Still,
        }
    }
}

// ── Entity record ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub rect: Rect,
    pub kind: EntityKind,
    /// `None` means the entity never takes part in collisions.
    pub collidable_with: Option<EntityKind>,
    pub is_colliding: bool,
    pub alive: bool,
    pub motion: Motion,
}

impl Entity {
    /// A dead record at the origin, sized from the kind's sprite.
    pub fn new(kind: EntityKind, size: SpriteSize) -> Self {
        Entity {
            rect: Rect::new(0.0, 0.0, size.width, size.height),
            kind,
            collidable_with: kind.collidable_with(),
            is_colliding: false,
            alive: false,
            motion: Motion::idle(kind),
        }
    }

    /// Re-initialise this record as live at `(x, y)` moving at `speed`.
    pub fn spawn(&mut self, x: f32, y: f32, speed: f32) {
        self.rect.x = x;
        self.rect.y = y;
        self.alive = true;
        self.motion = match self.motion {
            Motion::Bullet { .. } => Motion::Bullet { speed },
            Motion::Hostile { .. } => Motion::Hostile {
                speed,
                speed_x: 0.0,
                speed_y: speed,
                left_edge: x - HOSTILE_SWAY_LEFT,
                right_edge: x - HOSTILE_SWAY_RIGHT,
                bottom_edge: y + HOSTILE_DESCENT,
                top_edge: y,
            },
            Motion::Still => Motion::Still,
        };
    }

    /// Zero the record and mark it dead.  Also drops any collision flag so it
    /// can never leak into the slot's next life.
    pub fn clear(&mut self) {
        self.rect.x = 0.0;
        self.rect.y = 0.0;
        self.alive = false;
        self.is_colliding = false;
        self.motion = Motion::idle(self.kind);
    }

    pub fn is_collidable_with(&self, other: EntityKind) -> bool {
        self.collidable_with == Some(other)
    }

    /// Apply one tick of kind-specific movement.  Returns `true` once the
    /// entity is finished and should be cleared by its pool.
    pub fn advance(&mut self) -> bool {
        match &mut self.motion {
            Motion::Still => false,
            Motion::Bullet { speed } => {
                self.rect.y -= *speed;
                self.is_colliding || self.rect.y <= -self.rect.height
            }
            Motion::Hostile {
                speed,
                speed_x,
                speed_y,
                left_edge,
                right_edge,
                bottom_edge,
                ..
            } => {
                self.rect.x += *speed_x;
                self.rect.y += *speed_y;

                if self.rect.x <= *left_edge {
                    *speed_x = *speed;
                } else if self.rect.x >= *right_edge + self.rect.width {
                    *speed_x = -*speed;
                } else if self.rect.y >= *bottom_edge {
                    *speed = HOSTILE_SWEEP_SPEED;
                    *speed_y = 0.0;
                    self.rect.y -= HOSTILE_LIFT;
                    *speed_x = -*speed;
                }

                self.is_colliding
            }
        }
    }
}
