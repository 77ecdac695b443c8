//! A single tile of raster overlay imagery.

use crate::geodetic::Projection;
use std::sync::atomic::{AtomicU8, Ordering};

/// Load state of a raster overlay tile.
///
/// The overlay provider's own pipeline drives `Loading → Loaded` (or
/// `Failed`); the geometry tile's `update` drives `Loaded → Done` via
/// [`RasterOverlayTile::load_in_main_thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RasterTileState {
    /// Imagery fetch/decode is in flight on the overlay pipeline.
    Loading = 0,
    /// Imagery is decoded; main-thread resource creation has not run.
    Loaded = 1,
    /// Main-thread resource creation finished.
    Done = 2,
    /// The overlay tile failed to load.
    Failed = 3,
}

impl RasterTileState {
    #[inline]
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RasterTileState::Loading,
            1 => RasterTileState::Loaded,
            2 => RasterTileState::Done,
            3 => RasterTileState::Failed,
            _ => unreachable!("invalid raster tile state {raw}"),
        }
    }
}

/// A tile of overlay imagery, shared by reference count across all
/// geometry tiles it drapes.
#[derive(Debug)]
pub struct RasterOverlayTile {
    projection: Projection,
    state: AtomicU8,
}

impl RasterOverlayTile {
    /// Creates an overlay tile in the `Loading` state.
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            state: AtomicU8::new(RasterTileState::Loading as u8),
        }
    }

    /// The projection the overlay imagery is delivered in.
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn state(&self) -> RasterTileState {
        RasterTileState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Marks the imagery as decoded. Called by the overlay pipeline.
    pub fn mark_loaded(&self) {
        let _ = self.state.compare_exchange(
            RasterTileState::Loading as u8,
            RasterTileState::Loaded as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Marks the overlay tile as failed. Called by the overlay pipeline.
    pub fn mark_failed(&self) {
        let _ = self.state.compare_exchange(
            RasterTileState::Loading as u8,
            RasterTileState::Failed as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Finishes loading on the main thread (resource creation that must not
    /// happen on a worker). A no-op unless the tile is `Loaded`.
    pub fn load_in_main_thread(&self) {
        let _ = self.state.compare_exchange(
            RasterTileState::Loaded as u8,
            RasterTileState::Done as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_is_loading() {
        let tile = RasterOverlayTile::new(Projection::WebMercator);
        assert_eq!(tile.state(), RasterTileState::Loading);
        assert_eq!(tile.projection(), Projection::WebMercator);
    }

    #[test]
    fn test_loading_to_loaded_to_done() {
        let tile = RasterOverlayTile::new(Projection::Geographic);
        tile.mark_loaded();
        assert_eq!(tile.state(), RasterTileState::Loaded);
        tile.load_in_main_thread();
        assert_eq!(tile.state(), RasterTileState::Done);
    }

    #[test]
    fn test_main_thread_load_requires_loaded() {
        let tile = RasterOverlayTile::new(Projection::Geographic);
        tile.load_in_main_thread();
        assert_eq!(tile.state(), RasterTileState::Loading);
    }

    #[test]
    fn test_failed_is_terminal() {
        let tile = RasterOverlayTile::new(Projection::Geographic);
        tile.mark_failed();
        assert_eq!(tile.state(), RasterTileState::Failed);
        tile.mark_loaded();
        assert_eq!(tile.state(), RasterTileState::Failed);
    }
}
