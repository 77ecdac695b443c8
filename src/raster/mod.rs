//! Raster overlay binding.
//!
//! A raster overlay drapes 2D imagery over tile geometry. The overlay
//! provider cuts its imagery into overlay tiles and maps them onto
//! geometry tiles; each binding is a [`RasterMapping`] carrying the
//! texture coordinate set to sample and an attachment state driven from
//! the main thread.
//!
//! Overlay tiles are shared by reference count across geometry tiles; this
//! module holds mappings, never owns the imagery pipeline.

mod mapping;
mod overlay_tile;
mod provider;

pub use mapping::{AttachmentState, RasterMapping};
pub use overlay_tile::{RasterOverlayTile, RasterTileState};
pub use provider::RasterOverlayTileProvider;
