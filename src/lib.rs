//! Simulation core of Ribbon Shooter: pooled entities, a quadtree broad
//! phase and the per-frame orchestration that ties them together.  All
//! terminal I/O lives in the binary.

pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod pool;
pub mod quadtree;
