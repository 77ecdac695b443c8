//! Contracts the tile lifecycle consumes.
//!
//! The lifecycle does no I/O, scheduling, decoding, or GPU work of its
//! own; it drives collaborators through the traits in this module,
//! mirroring the dependency-inversion layering of the rest of the crate.
//! The tileset supplies concrete implementations through
//! [`TilesetExternals`].

use crate::content::{ContentFactory, TileContent};
use crate::geodetic::BoundingVolume;
use crate::raster::{RasterMapping, RasterOverlayTileProvider};
use crate::tile::{Tile, TileId, TileRefine};
use glam::DMat4;
use std::any::Any;
use std::sync::Arc;

/// A completed HTTP-like response.
pub trait AssetResponse: Send + Sync {
    /// HTTP-like status code; the 200 range is success.
    fn status_code(&self) -> u16;

    /// Content type, opaque to the lifecycle (the factory dispatches on it).
    fn content_type(&self) -> &str;

    /// Payload bytes.
    fn data(&self) -> &[u8];
}

/// An in-flight asset request.
///
/// The lifecycle binds a one-shot completion callback; the network stack
/// invokes it on its own I/O context once, when the request completes or
/// fails. Cancellation is best-effort: a cancelled request may still
/// deliver its completion.
pub trait AssetRequest: Send + Sync {
    /// The URL being fetched.
    fn url(&self) -> &str;

    /// Registers the one-shot completion callback.
    fn bind(&self, callback: Box<dyn FnOnce() + Send>);

    /// Requests cancellation (best-effort).
    fn cancel(&self);

    /// The response, once complete. `None` means the request delivered no
    /// response at all (network failure).
    fn response(&self) -> Option<&dyn AssetResponse>;
}

/// Schedules work on a worker pool.
///
/// No ordering guarantees exist between tasks; the lifecycle's decode task
/// re-checks the tile state rather than assuming scheduling order.
pub trait TaskProcessor: Send + Sync {
    fn start_task(&self, task: Box<dyn FnOnce() + Send>);
}

/// Opaque renderer resource handle.
///
/// Owned logically by the renderer adapter; the tile only carries it
/// between preparation phases and back into [`PrepareRendererResources::free`].
pub type RendererResourceHandle = Box<dyn Any + Send>;

/// The tile as the load-thread renderer preparation sees it.
///
/// The main thread owns the live [`Tile`] while the worker runs, so the
/// adapter receives the load-time snapshot plus the freshly decoded
/// content instead.
pub struct TileLoadView<'a> {
    pub id: &'a TileId,
    pub bounding_volume: &'a BoundingVolume,
    pub content_bounding_volume: Option<&'a BoundingVolume>,
    pub geometric_error: f64,
    pub refine: TileRefine,
    pub transform: &'a DMat4,
    pub content: &'a TileContent,
    pub raster_mappings: &'a [RasterMapping],
}

/// Prepares and frees renderer (GPU) resources for tile content.
///
/// Preparation is split across two contexts: the expensive part runs on
/// the decode worker, the part that must touch the graphics API runs on
/// the main thread. `free` receives the handle back in the slot matching
/// the context convention it was handed out under; at most one slot is
/// occupied.
pub trait PrepareRendererResources: Send + Sync {
    /// Worker-context preparation, called once per successful decode with
    /// a model. The returned handle is carried on the tile.
    fn prepare_in_load_thread(&self, tile: &TileLoadView<'_>) -> Option<RendererResourceHandle>;

    /// Main-thread preparation, called once from `update`. Receives the
    /// load-thread handle and returns the handle the tile keeps while
    /// `Done`.
    fn prepare_in_main_thread(
        &self,
        tile: &Tile,
        load_thread_result: Option<RendererResourceHandle>,
    ) -> Option<RendererResourceHandle>;

    /// Releases whatever preparation produced. Called exactly once when a
    /// tile leaves the loaded states.
    fn free(
        &self,
        tile: &Tile,
        main_thread_result: Option<RendererResourceHandle>,
        load_thread_result: Option<RendererResourceHandle>,
    );
}

/// External services shared by every tile of a tileset.
#[derive(Clone)]
pub struct TilesetExternals {
    /// Renderer adapter; absent for headless use.
    pub prepare_renderer_resources: Option<Arc<dyn PrepareRendererResources>>,

    /// Worker pool for decode tasks.
    pub task_processor: Arc<dyn TaskProcessor>,

    /// Decoder for fetched payloads.
    pub content_factory: Arc<dyn ContentFactory>,
}

/// The tileset as its tiles see it.
///
/// Provides I/O, overlay, and notification services. Outlives every tile
/// it hosts.
pub trait TilesetHost: Send + Sync {
    /// Issues the content request for a tile.
    ///
    /// Returning `None` marks the tile synthetic (its content came with
    /// its parent, e.g. children-from-content); it completes loading
    /// immediately with no content.
    fn request_tile_content(&self, tile: &Tile) -> Option<Arc<dyn AssetRequest>>;

    /// Load-completion notification, fired exactly once per load, from the
    /// context that sets the terminal state.
    fn notify_tile_done_loading(&self, tile: &TileId);

    /// Raster overlay providers to map onto loading tiles.
    fn overlays(&self) -> Vec<Arc<dyn RasterOverlayTileProvider>>;

    /// Shared external services.
    fn externals(&self) -> &TilesetExternals;
}
