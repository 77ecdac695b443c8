//! The tile: one node in the spatial hierarchy.
//!
//! A [`Tile`] couples a concurrent lifecycle state machine with the data a
//! streaming tileset renderer needs per node: bounds, geometric error,
//! refinement policy, children, decoded content, raster overlay mappings,
//! and renderer resources.
//!
//! # Lifecycle
//!
//! ```text
//!             load_content          worker            update
//! Unloaded ──────────────► ContentLoading ──► ContentLoaded ──► Done
//!     ▲                         │   │                             │
//!     │                         │   └──► Failed ◄── Destroying    │
//!     └───────── unload_content ┴─────────┴───────────────────────┘
//! ```
//!
//! The state lives in a single atomic cell ([`TileStateCell`]) shared with
//! the in-flight load; see the [`pipeline`](crate::pipeline) module for
//! the asynchronous half of the picture.

mod core;
mod error;
mod id;
mod selection;
mod state;

pub use self::core::{Tile, TileRefine};
pub use self::error::TileError;
pub use self::id::TileId;
pub use self::selection::{LoadedTileLinks, TileSelectionResult, TileSelectionState};
pub use self::state::{LoadState, TileStateCell};
