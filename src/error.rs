//! Startup-time failures.
//!
//! Nothing in a running frame produces an error: a full pool just drops the
//! spawn request and malformed spatial-index input is logged and skipped.
//! What remains are configuration defects, which are fatal at startup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entities::EntityKind;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("entities of kind {0:?} cannot be pooled")]
    UnsupportedPoolKind(EntityKind),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read sprite manifest at {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse sprite manifest")]
    ManifestParse(#[from] toml::de::Error),

    #[error("sprite for {kind:?} has unusable size {width}x{height}")]
    InvalidSprite {
        kind: EntityKind,
        width: f32,
        height: f32,
    },
}
