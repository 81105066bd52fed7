//! Frame orchestration.
//!
//! `Game::tick` runs one frame as a straight-line sequence: rebuild the
//! quadtree from the live entities, resolve collisions, respawn the wave if
//! every hostile is gone, then advance the background, the ribbon and both
//! pools.  Nothing carries across ticks except the data held in the pools.

use tracing::{debug, info};

use crate::collision::{self, Collider, EntityHandle, Owner};
use crate::config::{Settings, WaveLayout};
use crate::entities::{Entity, EntityKind, Rect, SpriteSizes};
use crate::error::GameError;
use crate::input::KeyStatus;
use crate::pool::Pool;
use crate::quadtree::QuadTree;

/// Gun muzzles sit this far inside the ribbon's edges.
const MUZZLE_INSET: f32 = 2.0;
/// Bullets spawn this far above the ribbon.
const MUZZLE_RISE: f32 = 8.0;

// ── Background ────────────────────────────────────────────────────────────────

/// Endlessly panning backdrop.  Only its vertical offset matters to the core.
#[derive(Clone, Debug)]
pub struct Background {
    pub entity: Entity,
    speed: f32,
}

impl Background {
    pub fn new(sprites: &SpriteSizes) -> Self {
        let mut entity = Entity::new(EntityKind::Background, sprites.background);
        entity.alive = true;
        Background { entity, speed: 1.0 }
    }

    pub fn offset(&self) -> f32 {
        self.entity.rect.y
    }

    /// Pan down one step and wrap at the canvas height.
    pub fn pan(&mut self, canvas_height: f32) {
        self.entity.rect.y += self.speed;
        if self.entity.rect.y >= canvas_height {
            self.entity.rect.y = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.entity.rect.y = 0.0;
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// The ribbon and the bullet pool it fires from.
#[derive(Clone, Debug)]
pub struct Player {
    pub entity: Entity,
    pub bullets: Pool,
    fire_counter: u32,
}

impl Player {
    pub fn new(settings: &Settings, sprites: &SpriteSizes) -> Result<Self, GameError> {
        let mut player = Player {
            entity: Entity::new(EntityKind::Ribbon, sprites.ribbon),
            bullets: Pool::new(EntityKind::Bullet, settings.pool_capacity, sprites)?,
            fire_counter: 0,
        };
        player.place_at_start(settings);
        Ok(player)
    }

    /// Bottom middle of the canvas, pulled back inside if the sprite is tall.
    fn place_at_start(&mut self, settings: &Settings) {
        let rect = &mut self.entity.rect;
        rect.x = (settings.canvas_width / 2.0 - rect.width).max(0.0);
        rect.y = (settings.canvas_height / 4.0 * 3.0 + rect.height * 2.0)
            .min(settings.canvas_height - rect.height)
            .max(0.0);
        self.entity.alive = true;
        self.entity.is_colliding = false;
        self.fire_counter = 0;
    }

    pub fn reset(&mut self, settings: &Settings) {
        self.bullets.reset();
        self.place_at_start(settings);
    }

    /// One tick of player control.  Movement takes the first held direction
    /// in the order left, right, up, down; the ribbon may only rise into the
    /// bottom quarter of the canvas.
    pub fn update(&mut self, keys: &KeyStatus, settings: &Settings) {
        self.fire_counter = self.fire_counter.saturating_add(1);
        let speed = settings.ribbon_speed;
        let rect = &mut self.entity.rect;

        if keys.left {
            rect.x = (rect.x - speed).max(0.0);
        } else if keys.right {
            rect.x = (rect.x + speed).min(settings.canvas_width - rect.width);
        } else if keys.up {
            rect.y = (rect.y - speed).max(settings.canvas_height / 4.0 * 3.0);
        } else if keys.down {
            rect.y = (rect.y + speed).min(settings.canvas_height - rect.height);
        }

        if keys.fire && self.fire_counter >= settings.fire_rate && !self.entity.is_colliding {
            self.fire(settings.bullet_speed);
            self.fire_counter = 0;
        }
    }

    /// Fire one bullet from each gun, or none at all.
    pub fn fire(&mut self, speed: f32) -> bool {
        let rect = self.entity.rect;
        let bullet_width = self
            .bullets
            .slots()
            .first()
            .map(|bullet| bullet.rect.width)
            .unwrap_or(0.0);
        let y = rect.y - MUZZLE_RISE;
        let left = (rect.x + MUZZLE_INSET, y, speed);
        let right = (rect.right() - bullet_width - MUZZLE_INSET, y, speed);
        self.bullets.acquire_pair(left, right)
    }
}

// ── Game ──────────────────────────────────────────────────────────────────────

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Entities flagged colliding this frame.
    pub flagged: usize,
    pub wave_spawned: bool,
    /// Hostiles destroyed (and scored) this frame.
    pub destroyed: u32,
}

#[derive(Clone, Debug)]
pub struct Game {
    pub settings: Settings,
    pub sprites: SpriteSizes,
    pub background: Background,
    pub player: Player,
    pub hostiles: Pool,
    quadtree: QuadTree<Collider>,
    pub score: u32,
    pub frame: u64,
    pub waves: u32,
}

impl Game {
    /// Build every pool and spawn the first wave.  Sprite sizes must already
    /// be known.
    pub fn new(settings: Settings, sprites: SpriteSizes) -> Result<Self, GameError> {
        settings.validate()?;
        let bounds = Rect::new(0.0, 0.0, settings.canvas_width, settings.canvas_height);
        let mut game = Game {
            background: Background::new(&sprites),
            player: Player::new(&settings, &sprites)?,
            hostiles: Pool::new(EntityKind::Hostile, settings.pool_capacity, &sprites)?,
            quadtree: QuadTree::with_limits(
                bounds,
                settings.quadtree_max_objects,
                settings.quadtree_max_depth,
            ),
            settings,
            sprites,
            score: 0,
            frame: 0,
            waves: 0,
        };
        let spawned = game.spawn_wave();
        info!(spawned, "game initialised");
        Ok(game)
    }

    /// Back to the opening state: empty pools, fresh wave, zero score.
    pub fn restart(&mut self) {
        self.quadtree.clear();
        self.background.reset();
        self.player.reset(&self.settings);
        self.hostiles.reset();
        self.score = 0;
        self.frame = 0;
        self.waves = 0;
        let spawned = self.spawn_wave();
        info!(spawned, "game restarted");
    }

    /// Lay out one wave of hostiles above the top edge, row by row.  Returns
    /// how many were actually spawned.
    pub fn spawn_wave(&mut self) -> usize {
        let WaveLayout {
            count,
            columns,
            origin_x,
            gap_x,
        } = self.settings.wave;
        let size = self.sprites.hostile;
        let row_step = -size.height * 1.5;

        let mut x = origin_x;
        let mut y = -size.height;
        let mut spawned = 0;
        for i in 1..=count {
            if self.hostiles.acquire(x, y, self.settings.hostile_speed) {
                spawned += 1;
            }
            x += size.width + gap_x;
            if i % columns == 0 {
                x = origin_x;
                y += row_step;
            }
        }
        self.waves += 1;
        debug!(wave = self.waves, spawned, "wave spawned");
        spawned
    }

    /// Colliders for every live entity, ribbon first.
    fn colliders(&self) -> Vec<Collider> {
        let ribbon = Collider::from_entity(EntityHandle::new(Owner::Ribbon, 0), &self.player.entity);
        let bullets = self.player.bullets.snapshot().into_iter().map(|(slot, entity)| {
            Collider::from_entity(EntityHandle::new(Owner::Bullets, slot), entity)
        });
        let hostiles = self.hostiles.snapshot().into_iter().map(|(slot, entity)| {
            Collider::from_entity(EntityHandle::new(Owner::Hostiles, slot), entity)
        });
        std::iter::once(ribbon).chain(bullets).chain(hostiles).collect()
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        match handle.owner {
            Owner::Ribbon => Some(&mut self.player.entity),
            Owner::Bullets => self.player.bullets.get_mut(handle.slot),
            Owner::Hostiles => self.hostiles.get_mut(handle.slot),
        }
    }

    /// Rebuild the index and flag every colliding pair.  Returns how many
    /// entities were flagged.
    pub fn detect_collisions(&mut self) -> usize {
        self.quadtree.clear();
        let colliders = self.colliders();
        self.quadtree.insert_all(colliders);
        let flagged = collision::resolve(&self.quadtree);
        for handle in &flagged {
            if let Some(entity) = self.entity_mut(*handle) {
                entity.is_colliding = true;
            }
        }
        flagged.len()
    }

    /// Run one frame.
    pub fn tick(&mut self, keys: &KeyStatus) -> FrameReport {
        self.frame += 1;
        let flagged = self.detect_collisions();

        let wave_spawned = self.hostiles.is_exhausted();
        if wave_spawned {
            self.spawn_wave();
        }

        self.background.pan(self.settings.canvas_height);
        self.player.update(keys, &self.settings);
        self.player.bullets.advance();
        let destroyed = self.hostiles.advance();
        self.score += destroyed;

        FrameReport {
            flagged,
            wave_spawned,
            destroyed,
        }
    }

    pub fn quadtree(&self) -> &QuadTree<Collider> {
        &self.quadtree
    }
}
