//! Shared state and the load-time snapshot.

use crate::content::TileContent;
use crate::externals::{AssetRequest, RendererResourceHandle, TilesetHost};
use crate::geodetic::BoundingVolume;
use crate::raster::RasterMapping;
use crate::tile::{TileId, TileRefine, TileStateCell};
use glam::DMat4;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Worker output waiting for the main thread.
///
/// `load_content` parks the freshly mapped raster mappings here; the
/// worker adds decoded content, assigned texture coordinate IDs, and the
/// load-thread renderer handle; `update` drains the slot after observing
/// `ContentLoaded`.
#[derive(Default)]
pub(crate) struct LoadSlot {
    pub content: Option<TileContent>,
    pub raster_mappings: Vec<RasterMapping>,
    pub renderer_resources: Option<RendererResourceHandle>,
}

/// The allocation a tile shares with its in-flight load.
///
/// The state cell arbitrates the protocol: between transitions exactly one
/// context may touch the slot, so the mutex is never contended across a
/// transition. It exists because safe Rust cannot alias the tile's fields
/// across threads, not to add a second synchronization channel.
pub(crate) struct TileShared {
    pub state: TileStateCell,
    slot: Mutex<LoadSlot>,
}

impl TileShared {
    pub fn new() -> Self {
        Self {
            state: TileStateCell::default(),
            slot: Mutex::new(LoadSlot::default()),
        }
    }

    /// Locks the handoff slot.
    ///
    /// A poisoned lock is recovered: the slot's contents are plain data
    /// guarded by the state protocol, and a panicking collaborator must
    /// not wedge unload.
    pub fn lock_slot(&self) -> MutexGuard<'_, LoadSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot of a tile captured when its load began.
///
/// The pipeline never touches the live tile; everything the network
/// callback and the decode worker need rides in this context, and the
/// main thread is free to keep traversing while they run.
pub(crate) struct LoadContext {
    pub shared: Arc<TileShared>,
    pub host: Arc<dyn TilesetHost>,
    pub request: Arc<dyn AssetRequest>,
    pub id: TileId,
    pub bounding_volume: BoundingVolume,
    pub content_bounding_volume: Option<BoundingVolume>,
    pub geometric_error: f64,
    pub refine: TileRefine,
    pub transform: DMat4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::LoadState;

    #[test]
    fn test_shared_starts_unloaded_and_empty() {
        let shared = TileShared::new();
        assert_eq!(shared.state.load(), LoadState::Unloaded);
        let slot = shared.lock_slot();
        assert!(slot.content.is_none());
        assert!(slot.raster_mappings.is_empty());
        assert!(slot.renderer_resources.is_none());
    }
}
