//! Procedural tile world library
//!
//! Infinite noise-derived meta tiles, neighbour-aware visual resolution,
//! a deduplicating atlas and a toroidal viewport cache.

pub mod ascii;
pub mod atlas;
pub mod config;
pub mod coords;
pub mod engine;
pub mod meta;
pub mod noise_field;
pub mod raster;
pub mod scroll_cache;
pub mod seeds;
pub mod tilemap;
pub mod viewport;
pub mod visual;

pub use config::{ConfigError, EngineConfig};
pub use coords::Coord;
pub use engine::{EngineStats, SlotPair, TileEngine};
