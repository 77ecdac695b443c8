//! The tile aggregate and its lifecycle API.

use super::error::TileError;
use super::id::TileId;
use super::selection::{LoadedTileLinks, TileSelectionState};
use super::state::LoadState;
use crate::content::TileContent;
use crate::externals::{
    AssetRequest, PrepareRendererResources, RendererResourceHandle, TilesetHost,
};
use crate::geodetic::BoundingVolume;
use crate::pipeline::{content_response_received, LoadContext, TileShared};
use crate::raster::{AttachmentState, RasterMapping, RasterOverlayTileProvider, RasterTileState};
use glam::DMat4;
use std::fmt;
use std::mem;
use std::sync::Arc;
use tracing::debug;

/// Geometric error assigned to tiles whose content carries no model, so
/// the traversal always refines past them.
const UNRENDERABLE_GEOMETRIC_ERROR: f64 = 999_999_999.0;

/// How a tile's children relate to it during refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileRefine {
    /// Children replace the parent's content.
    #[default]
    Replace,
    /// Children render in addition to the parent's content.
    Add,
}

/// One node in the spatial hierarchy of a streaming tileset.
///
/// A tile aggregates identity, bounds, refinement policy, children,
/// content, raster overlay mappings, and renderer resources, and exposes
/// the lifecycle API: [`load_content`](Tile::load_content),
/// [`update`](Tile::update), [`unload_content`](Tile::unload_content),
/// [`prepare_to_destroy`](Tile::prepare_to_destroy).
///
/// # Threading
///
/// All methods are main-thread only except `prepare_to_destroy` and the
/// read-only state accessors. While a load is in flight the network
/// callback and the decode worker own the tile's loading output; the
/// atomic state cell decides when ownership returns to the main thread.
///
/// Tiles are movable but not copyable: moving transfers children, content,
/// the in-flight request, and renderer resources as one unit. Moves are
/// expected only between traversal passes.
pub struct Tile {
    id: TileId,
    parent: Option<TileId>,
    children: Vec<Tile>,
    bounding_volume: BoundingVolume,
    viewer_request_volume: Option<BoundingVolume>,
    content_bounding_volume: Option<BoundingVolume>,
    geometric_error: f64,
    refine: TileRefine,
    transform: DMat4,
    host: Arc<dyn TilesetHost>,
    shared: Arc<TileShared>,
    content_request: Option<Arc<dyn AssetRequest>>,
    content: Option<TileContent>,
    renderer_resources: Option<RendererResourceHandle>,
    raster_mappings: Vec<RasterMapping>,
    last_selection_state: TileSelectionState,
    loaded_tile_links: LoadedTileLinks,
}

impl Tile {
    /// Creates an unloaded tile hosted by `host`.
    pub fn new(host: Arc<dyn TilesetHost>) -> Self {
        Self {
            id: TileId::default(),
            parent: None,
            children: Vec::new(),
            bounding_volume: BoundingVolume::default(),
            viewer_request_volume: None,
            content_bounding_volume: None,
            geometric_error: 0.0,
            refine: TileRefine::default(),
            transform: DMat4::IDENTITY,
            host,
            shared: Arc::new(TileShared::new()),
            content_request: None,
            content: None,
            renderer_resources: None,
            raster_mappings: Vec::new(),
            last_selection_state: TileSelectionState::default(),
            loaded_tile_links: LoadedTileLinks::default(),
        }
    }

    pub fn id(&self) -> &TileId {
        &self.id
    }

    /// Identity of the parent tile, if any. Non-owning: the parent always
    /// outlives its children in the tree.
    pub fn parent(&self) -> Option<&TileId> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<TileId>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[Tile] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Tile] {
        &mut self.children
    }

    pub fn bounding_volume(&self) -> &BoundingVolume {
        &self.bounding_volume
    }

    pub fn viewer_request_volume(&self) -> Option<&BoundingVolume> {
        self.viewer_request_volume.as_ref()
    }

    pub fn content_bounding_volume(&self) -> Option<&BoundingVolume> {
        self.content_bounding_volume.as_ref()
    }

    pub fn geometric_error(&self) -> f64 {
        self.geometric_error
    }

    pub fn refine(&self) -> TileRefine {
        self.refine
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    /// Current lifecycle state (acquire load).
    pub fn state(&self) -> LoadState {
        self.shared.state.load()
    }

    /// Decoded content, present only in `ContentLoaded` and `Done`, and
    /// visible here only after `update` has drained the worker's output.
    pub fn content(&self) -> Option<&TileContent> {
        self.content.as_ref()
    }

    pub fn renderer_resources(&self) -> Option<&RendererResourceHandle> {
        self.renderer_resources.as_ref()
    }

    pub fn raster_mappings(&self) -> &[RasterMapping] {
        &self.raster_mappings
    }

    pub fn last_selection_state(&self) -> TileSelectionState {
        self.last_selection_state
    }

    /// Stamped by the traversal; the tile never interprets it.
    pub fn set_last_selection_state(&mut self, state: TileSelectionState) {
        self.last_selection_state = state;
    }

    pub fn loaded_tile_links(&self) -> &LoadedTileLinks {
        &self.loaded_tile_links
    }

    /// LRU bookkeeping owned by the tileset; the tile never interprets it.
    pub fn loaded_tile_links_mut(&mut self) -> &mut LoadedTileLinks {
        &mut self.loaded_tile_links
    }

    fn ensure_not_loading(&self) -> Result<(), TileError> {
        if self.shared.state.load() == LoadState::ContentLoading {
            return Err(TileError::ModifiedWhileLoading);
        }
        Ok(())
    }

    /// Sets the tile's identity. Main thread only; refused while loading.
    pub fn set_tile_id(&mut self, id: TileId) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.id = id;
        Ok(())
    }

    pub fn set_bounding_volume(&mut self, volume: BoundingVolume) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.bounding_volume = volume;
        Ok(())
    }

    pub fn set_viewer_request_volume(
        &mut self,
        volume: Option<BoundingVolume>,
    ) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.viewer_request_volume = volume;
        Ok(())
    }

    pub fn set_content_bounding_volume(
        &mut self,
        volume: Option<BoundingVolume>,
    ) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.content_bounding_volume = volume;
        Ok(())
    }

    pub fn set_geometric_error(&mut self, error: f64) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.geometric_error = error;
        Ok(())
    }

    pub fn set_refine(&mut self, refine: TileRefine) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.refine = refine;
        Ok(())
    }

    pub fn set_transform(&mut self, transform: DMat4) -> Result<(), TileError> {
        self.ensure_not_loading()?;
        self.transform = transform;
        Ok(())
    }

    /// Adopts `children` as this tile's children.
    ///
    /// Children may be populated at most once, whether from tileset
    /// metadata or from decoded content.
    pub fn create_child_tiles(&mut self, children: Vec<Tile>) -> Result<(), TileError> {
        if !self.children.is_empty() {
            return Err(TileError::ChildrenAlreadyCreated);
        }
        self.children = children;
        Ok(())
    }

    /// Creates `count` default children hosted by the same tileset.
    pub fn create_default_child_tiles(&mut self, count: usize) -> Result<(), TileError> {
        if !self.children.is_empty() {
            return Err(TileError::ChildrenAlreadyCreated);
        }
        self.children = (0..count).map(|_| Tile::new(Arc::clone(&self.host))).collect();
        Ok(())
    }

    /// Whether the tile can be put on the render list.
    ///
    /// True once the asynchronous part of loading finished, the content
    /// (if any) carries a model, and no mapped raster overlay is still
    /// loading. A tile whose content is an external tileset has no
    /// renderable geometry; selecting it would leave a hole until its
    /// children load, so it reports false.
    pub fn is_renderable(&self) -> bool {
        if self.shared.state.load() < LoadState::ContentLoaded {
            return false;
        }

        // Until update() drains the handoff slot the loaded artifacts are
        // still parked there; consult both places.
        let slot = self.shared.lock_slot();
        let content = self.content.as_ref().or(slot.content.as_ref());
        if let Some(content) = content {
            if content.model.is_none() {
                return false;
            }
        }
        self.raster_mappings
            .iter()
            .chain(slot.raster_mappings.iter())
            .all(|mapping| mapping.raster_tile().state() != RasterTileState::Loading)
    }

    /// Begins loading this tile's content.
    ///
    /// Main thread only. Does nothing unless the tile is `Unloaded`.
    /// Returns immediately after scheduling; completion is delivered
    /// through the network callback and the worker pool, and consumed by
    /// [`update`](Tile::update).
    pub fn load_content(&mut self) {
        if self.shared.state.load() != LoadState::Unloaded {
            return;
        }
        self.shared.state.store(LoadState::ContentLoading);

        // Overlay mapping needs the tile's footprint on the globe, which
        // only region-based bounding volumes know before geometry exists.
        // Overlay mapping for box- and sphere-bounded tiles is deferred
        // until placeholder resolution against real geometry is in place.
        let rectangle = self.bounding_volume.globe_rectangle().copied();
        if let Some(rectangle) = rectangle {
            // Build the replacement list fully before swapping it in, so
            // overlay tiles that are already loaded and still needed are
            // not released before their successors exist.
            let mut mappings = Vec::new();
            for provider in self.host.overlays() {
                provider.map_raster_tiles_to_geometry_tile(
                    &rectangle,
                    self.geometric_error,
                    &mut mappings,
                );
            }
            self.shared.lock_slot().raster_mappings = mappings;
        }

        match self.host.request_tile_content(&*self) {
            None => {
                // Synthetic tile: its content arrived with its parent.
                self.host.notify_tile_done_loading(&self.id);
                self.shared.state.store(LoadState::ContentLoaded);
            }
            Some(request) => {
                debug!(tile = %self.id, url = request.url(), "requesting tile content");
                self.content_request = Some(Arc::clone(&request));
                let ctx = LoadContext {
                    shared: Arc::clone(&self.shared),
                    host: Arc::clone(&self.host),
                    request: Arc::clone(&request),
                    id: self.id.clone(),
                    bounding_volume: self.bounding_volume,
                    content_bounding_volume: self.content_bounding_volume,
                    geometric_error: self.geometric_error,
                    refine: self.refine,
                    transform: self.transform,
                };
                request.bind(Box::new(move || content_response_received(ctx)));
            }
        }
    }

    /// Per-frame main-thread step.
    ///
    /// Promotes `ContentLoaded` tiles to `Done` (main-thread renderer
    /// prep, children from content, refined bounding volume) and
    /// finalizes raster overlay attachments on `Done` tiles.
    pub fn update(&mut self) {
        if self.shared.state.load() == LoadState::ContentLoaded {
            // The acquire load above pairs with the worker's release
            // store; drain its output.
            {
                let mut slot = self.shared.lock_slot();
                self.content = slot.content.take();
                self.raster_mappings = mem::take(&mut slot.raster_mappings);
                self.renderer_resources = slot.renderer_resources.take();
            }

            let prepare = self.host.externals().prepare_renderer_resources.clone();
            if let Some(prepare) = prepare {
                let load_result = self.renderer_resources.take();
                self.renderer_resources = prepare.prepare_in_main_thread(&*self, load_result);
            }

            if let Some(mut content) = self.content.take() {
                // Children described by the content, applied at most once.
                if self.children.is_empty() {
                    if let Some(mut children) = content.child_tiles.take() {
                        for child in &mut children {
                            child.set_parent(Some(self.id.clone()));
                        }
                        self.children = children;
                    }
                }

                // A tile with no model renders nothing; raise its
                // geometric error so traversal always refines past it.
                // (Distinct from a present-but-blank model, which renders
                // empty space on purpose.)
                if content.model.is_none() {
                    self.geometric_error = UNRENDERABLE_GEOMETRIC_ERROR;
                }

                if let Some(volume) = content.updated_bounding_volume.take() {
                    self.bounding_volume = volume;
                }

                self.content = Some(content);
            }

            // The request is complete; release it.
            self.content_request = None;

            self.shared.state.store(LoadState::Done);
            debug!(tile = %self.id, "tile done");
        }

        if self.shared.state.load() == LoadState::Done {
            let id = self.id.clone();
            for mapping in &mut self.raster_mappings {
                if mapping.state() == AttachmentState::Unattached
                    && mapping.raster_tile().state() != RasterTileState::Loading
                {
                    mapping.raster_tile().load_in_main_thread();
                    mapping.attach_to_tile(&id);
                }
            }
        }
    }

    /// Releases content, raster mappings, and renderer resources.
    ///
    /// Main thread only. Returns `false` while an asynchronous load is in
    /// flight (the pipeline still owns the tile); `true` otherwise, with
    /// the tile back in `Unloaded`.
    pub fn unload_content(&mut self) -> bool {
        let state = self.shared.state.load();
        if state == LoadState::ContentLoading || state == LoadState::Destroying {
            return false;
        }
        if state == LoadState::Unloaded {
            return true;
        }

        // If update() never ran after the worker finished, the loaded
        // artifacts are still parked in the handoff slot; drain them so
        // the renderer adapter sees the tile the worker produced.
        {
            let mut slot = self.shared.lock_slot();
            if self.content.is_none() {
                self.content = slot.content.take();
            }
            if self.raster_mappings.is_empty() {
                self.raster_mappings = mem::take(&mut slot.raster_mappings);
            }
            if self.renderer_resources.is_none() {
                self.renderer_resources = slot.renderer_resources.take();
            }
        }

        let prepare = self.host.externals().prepare_renderer_resources.clone();
        if let Some(prepare) = prepare {
            let resources = self.renderer_resources.take();
            // The handle slot tells the adapter which context the handle
            // was handed out under: the main-thread slot when unloading
            // from ContentLoaded, the load-thread slot otherwise.
            if state == LoadState::ContentLoaded {
                prepare.free(&*self, resources, None);
            } else {
                prepare.free(&*self, None, resources);
            }
        }

        for mapping in &mut self.raster_mappings {
            mapping.detach_from_tile();
        }
        self.raster_mappings.clear();
        self.renderer_resources = None;
        self.content = None;
        self.content_request = None;
        self.shared.state.store(LoadState::Unloaded);
        debug!(tile = %self.id, "tile unloaded");
        true
    }

    /// Cancels any in-flight load ahead of destruction.
    ///
    /// Cancellation of the request is best-effort; the provider may still
    /// deliver a completion. Atomically moves a `ContentLoading` tile to
    /// `Destroying`; tiles in other states are unaffected. Idempotent.
    pub fn prepare_to_destroy(&self) {
        if let Some(request) = &self.content_request {
            request.cancel();
        }
        let _ = self
            .shared
            .state
            .compare_exchange(LoadState::ContentLoading, LoadState::Destroying);
    }
}

impl Drop for Tile {
    fn drop(&mut self) {
        self.prepare_to_destroy();
        let _ = self.unload_content();
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("id", &self.id)
            .field("state", &self.shared.state.load())
            .field("geometric_error", &self.geometric_error)
            .field("refine", &self.refine)
            .field("children", &self.children.len())
            .field("raster_mappings", &self.raster_mappings.len())
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentFactory, TileContent, TileContentInput};
    use crate::externals::{TaskProcessor, TilesetExternals, TilesetHost};
    use crate::raster::RasterOverlayTileProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InlineTasks;

    impl TaskProcessor for InlineTasks {
        fn start_task(&self, task: Box<dyn FnOnce() + Send>) {
            task();
        }
    }

    struct NullFactory;

    impl ContentFactory for NullFactory {
        fn create_content(&self, _input: TileContentInput) -> Option<TileContent> {
            None
        }
    }

    struct SyntheticHost {
        externals: TilesetExternals,
        notified: AtomicUsize,
    }

    impl SyntheticHost {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                externals: TilesetExternals {
                    prepare_renderer_resources: None,
                    task_processor: Arc::new(InlineTasks),
                    content_factory: Arc::new(NullFactory),
                },
                notified: AtomicUsize::new(0),
            })
        }
    }

    impl TilesetHost for SyntheticHost {
        fn request_tile_content(&self, _tile: &Tile) -> Option<Arc<dyn crate::externals::AssetRequest>> {
            None
        }

        fn notify_tile_done_loading(&self, _tile: &TileId) {
            self.notified.fetch_add(1, Ordering::SeqCst);
        }

        fn overlays(&self) -> Vec<Arc<dyn RasterOverlayTileProvider>> {
            Vec::new()
        }

        fn externals(&self) -> &TilesetExternals {
            &self.externals
        }
    }

    #[test]
    fn test_new_tile_defaults() {
        let tile = Tile::new(SyntheticHost::new());
        assert_eq!(tile.state(), LoadState::Unloaded);
        assert_eq!(tile.geometric_error(), 0.0);
        assert_eq!(tile.refine(), TileRefine::Replace);
        assert!(tile.children().is_empty());
        assert!(tile.content().is_none());
        assert!(!tile.is_renderable());
    }

    #[test]
    fn test_children_created_at_most_once() {
        let host = SyntheticHost::new();
        let mut tile = Tile::new(host.clone());
        tile.create_default_child_tiles(2).unwrap();
        assert_eq!(tile.children().len(), 2);

        let extra = vec![Tile::new(host.clone())];
        assert_eq!(
            tile.create_child_tiles(extra),
            Err(TileError::ChildrenAlreadyCreated)
        );
        assert_eq!(
            tile.create_default_child_tiles(3),
            Err(TileError::ChildrenAlreadyCreated)
        );
    }

    #[test]
    fn test_synthetic_tile_loads_without_request() {
        let host = SyntheticHost::new();
        let mut tile = Tile::new(host.clone());
        tile.load_content();
        assert_eq!(tile.state(), LoadState::ContentLoaded);
        assert_eq!(host.notified.load(Ordering::SeqCst), 1);

        tile.update();
        assert_eq!(tile.state(), LoadState::Done);
        // No content at all is a blank tile, which is renderable.
        assert!(tile.is_renderable());
    }

    #[test]
    fn test_load_content_ignored_unless_unloaded() {
        let host = SyntheticHost::new();
        let mut tile = Tile::new(host.clone());
        tile.load_content();
        assert_eq!(host.notified.load(Ordering::SeqCst), 1);

        // Already ContentLoaded: a second call must not re-notify.
        tile.load_content();
        assert_eq!(host.notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unload_already_unloaded_is_noop() {
        let mut tile = Tile::new(SyntheticHost::new());
        assert!(tile.unload_content());
        assert_eq!(tile.state(), LoadState::Unloaded);
    }

    #[test]
    fn test_unload_after_done_round_trips() {
        let mut tile = Tile::new(SyntheticHost::new());
        tile.load_content();
        tile.update();
        assert_eq!(tile.state(), LoadState::Done);

        assert!(tile.unload_content());
        assert_eq!(tile.state(), LoadState::Unloaded);

        tile.load_content();
        tile.update();
        assert_eq!(tile.state(), LoadState::Done);
    }

    #[test]
    fn test_prepare_to_destroy_outside_loading_is_noop() {
        let tile = Tile::new(SyntheticHost::new());
        tile.prepare_to_destroy();
        assert_eq!(tile.state(), LoadState::Unloaded);
        tile.prepare_to_destroy();
        assert_eq!(tile.state(), LoadState::Unloaded);
    }

    #[test]
    fn test_setters_guarded_while_loading() {
        let mut tile = Tile::new(SyntheticHost::new());
        tile.set_geometric_error(16.0).unwrap();
        assert_eq!(tile.geometric_error(), 16.0);

        // Force the loading state directly; the synthetic host would
        // otherwise complete immediately.
        tile.shared.state.store(LoadState::ContentLoading);
        assert_eq!(
            tile.set_geometric_error(32.0),
            Err(TileError::ModifiedWhileLoading)
        );
        assert_eq!(
            tile.set_tile_id(TileId::from("other")),
            Err(TileError::ModifiedWhileLoading)
        );
        assert_eq!(tile.geometric_error(), 16.0);
        tile.shared.state.store(LoadState::Unloaded);
    }

    #[test]
    fn test_move_transfers_tile_wholesale() {
        let host = SyntheticHost::new();
        let mut tile = Tile::new(host.clone());
        tile.set_tile_id(TileId::from("moved")).unwrap();
        tile.load_content();
        tile.update();

        let moved = tile;
        assert_eq!(moved.id(), &TileId::from("moved"));
        assert_eq!(moved.state(), LoadState::Done);
    }
}
