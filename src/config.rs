//! Startup configuration: command-line arguments, game-rule settings and the
//! sprite-size manifest.  Built once before the first frame and read-only
//! afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::entities::{EntityKind, SpriteSizes};
use crate::error::GameError;
use crate::quadtree::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_OBJECTS};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "ribbon_shooter", about = "Shoot down waves of hostile cells")]
pub struct Args {
    /// Logical canvas width in pixels.
    #[arg(long, default_value_t = 600.0)]
    pub canvas_width: f32,

    /// Logical canvas height in pixels.
    #[arg(long, default_value_t = 360.0)]
    pub canvas_height: f32,

    /// Target frames per second.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// TOML manifest overriding the built-in sprite sizes.
    #[arg(long)]
    pub sprites: Option<PathBuf>,

    /// Write logs to this file.  Logging is off without it.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn settings(&self) -> Result<Settings, GameError> {
        let settings = Settings {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            fps: self.fps,
            ..Settings::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn sprite_sizes(&self) -> Result<SpriteSizes, GameError> {
        match &self.sprites {
            Some(path) => load_sprite_sizes(path),
            None => Ok(SpriteSizes::default()),
        }
    }
}

// ── Game rules ────────────────────────────────────────────────────────────────

/// Placement of one wave of hostiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveLayout {
    pub count: usize,
    pub columns: usize,
    pub origin_x: f32,
    /// Horizontal gap between neighbouring hostiles.
    pub gap_x: f32,
}

impl Default for WaveLayout {
    fn default() -> Self {
        WaveLayout {
            count: 18,
            columns: 6,
            origin_x: 100.0,
            gap_x: 25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub fps: u32,
    pub pool_capacity: usize,
    pub quadtree_max_objects: usize,
    pub quadtree_max_depth: u32,
    /// Ticks between paired shots while fire is held.
    pub fire_rate: u32,
    pub ribbon_speed: f32,
    pub bullet_speed: f32,
    pub hostile_speed: f32,
    pub wave: WaveLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            canvas_width: 600.0,
            canvas_height: 360.0,
            fps: 60,
            pool_capacity: 30,
            quadtree_max_objects: DEFAULT_MAX_OBJECTS,
            quadtree_max_depth: DEFAULT_MAX_DEPTH,
            fire_rate: 12,
            ribbon_speed: 3.0,
            bullet_speed: 3.0,
            hostile_speed: 2.0,
            wave: WaveLayout::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), GameError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(self.canvas_width) || !positive(self.canvas_height) {
            return Err(GameError::InvalidConfig(format!(
                "canvas must have a positive size, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.fps == 0 {
            return Err(GameError::InvalidConfig("fps must be non-zero".into()));
        }
        if self.pool_capacity == 0 {
            return Err(GameError::InvalidConfig("pool capacity must be non-zero".into()));
        }
        if self.quadtree_max_objects == 0 {
            return Err(GameError::InvalidConfig(
                "quadtree node capacity must be non-zero".into(),
            ));
        }
        if self.wave.columns == 0 {
            return Err(GameError::InvalidConfig("wave needs at least one column".into()));
        }
        Ok(())
    }
}

// ── Sprite manifest ───────────────────────────────────────────────────────────

pub fn load_sprite_sizes(path: &Path) -> Result<SpriteSizes, GameError> {
    let contents = fs::read_to_string(path).map_err(|source| GameError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sprite_manifest(&contents)
}

/// Parse a manifest such as:
///
/// ```toml
/// [bullet]
/// width = 7
/// height = 7
/// ```
///
/// Kinds left out keep their built-in size.
pub fn parse_sprite_manifest(contents: &str) -> Result<SpriteSizes, GameError> {
    let sizes: SpriteSizes = toml::from_str(contents)?;
    for kind in [
        EntityKind::Background,
        EntityKind::Ribbon,
        EntityKind::Bullet,
        EntityKind::Hostile,
    ] {
        let size = sizes.for_kind(kind);
        if !(size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0) {
            return Err(GameError::InvalidSprite {
                kind,
                width: size.width,
                height: size.height,
            });
        }
    }
    Ok(sizes)
}
