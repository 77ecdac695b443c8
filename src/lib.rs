//! Terrastream - streaming 3D geospatial tileset engine.
//!
//! This library implements the tile lifecycle core of a streaming tileset
//! renderer: each node in the spatial hierarchy (a [`tile::Tile`]) moves from
//! discovery through asynchronous content fetch, off-thread decoding, raster
//! overlay binding with generated texture coordinates, renderer resource
//! preparation, visibility participation, and eventual eviction.
//!
//! # High-Level Flow
//!
//! ```text
//! Tile::load_content ──► AssetRequest ──► I/O callback ──► TaskProcessor
//!        (main)            (network)      (status checks)     (worker)
//!                                                               │
//!          decode ── texture coordinates ── load-thread prep ───┘
//!                                │
//!                         ContentLoaded
//!                                │
//! Tile::update ── main-thread prep ── children/bounds ──► Done
//!     (main)                                               │
//!            raster overlay attachment, per frame ◄────────┘
//! ```
//!
//! Synchronization between the three execution contexts (main thread, I/O
//! callback, worker pool) is carried by a single atomic state cell; see
//! [`tile::TileStateCell`].
//!
//! # Example
//!
//! ```ignore
//! use terrastream::tile::{Tile, TileId};
//! use std::sync::Arc;
//!
//! let mut tile = Tile::new(host);
//! tile.set_tile_id(TileId::Url("tiles/0/0/0.b3dm".into()))?;
//! tile.load_content();
//!
//! // Once per frame, on the main thread:
//! tile.update();
//! if tile.is_renderable() {
//!     // hand the tile to the render list
//! }
//! ```

pub mod content;
pub mod executor;
pub mod externals;
pub mod geodetic;
pub mod pipeline;
pub mod raster;
pub mod tile;

/// Version of the terrastream library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
