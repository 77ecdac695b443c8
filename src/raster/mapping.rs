//! Binding of an overlay tile to a region of tile geometry.

use super::overlay_tile::{RasterOverlayTile, RasterTileState};
use crate::tile::TileId;
use std::sync::Arc;
use tracing::debug;

/// Whether a mapping's overlay resources are bound to the tile's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentState {
    /// Constructed but not yet bound; waiting for the overlay tile to load.
    Unattached,
    /// Bound to the tile's geometry.
    Attached,
    /// Unbound during unload.
    Detached,
}

/// Maps one raster overlay tile onto a geometry tile.
///
/// Constructed by the overlay provider during `load_content`. The decode
/// worker assigns the texture coordinate ID; attachment and detachment
/// happen on the main thread.
#[derive(Debug)]
pub struct RasterMapping {
    raster_tile: Arc<RasterOverlayTile>,
    texture_coordinate_id: u32,
    state: AttachmentState,
}

impl RasterMapping {
    pub fn new(raster_tile: Arc<RasterOverlayTile>) -> Self {
        Self {
            raster_tile,
            texture_coordinate_id: 0,
            state: AttachmentState::Unattached,
        }
    }

    pub fn raster_tile(&self) -> &RasterOverlayTile {
        &self.raster_tile
    }

    /// Index of the texture coordinate set this mapping samples.
    ///
    /// IDs are dense, start at 0, and are shared between mappings whose
    /// overlay tiles use the same projection.
    pub fn texture_coordinate_id(&self) -> u32 {
        self.texture_coordinate_id
    }

    pub(crate) fn set_texture_coordinate_id(&mut self, id: u32) {
        self.texture_coordinate_id = id;
    }

    pub fn state(&self) -> AttachmentState {
        self.state
    }

    /// Attaches the overlay tile's resources to the tile's geometry.
    ///
    /// Main thread only. The overlay tile must no longer be `Loading`.
    pub fn attach_to_tile(&mut self, tile: &TileId) {
        debug_assert_ne!(
            self.raster_tile.state(),
            RasterTileState::Loading,
            "attach requires a loaded overlay tile"
        );
        debug!(
            tile = %tile,
            projection = self.raster_tile.projection().name(),
            texture_coordinate_id = self.texture_coordinate_id,
            "attaching raster overlay"
        );
        self.state = AttachmentState::Attached;
    }

    /// Unbinds the overlay tile's resources at unload. Main thread only.
    pub fn detach_from_tile(&mut self) {
        if self.state == AttachmentState::Attached {
            self.state = AttachmentState::Detached;
        }
    }
}
