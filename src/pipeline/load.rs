//! Response handling and the decode worker task.

use super::context::{LoadContext, LoadSlot};
use super::error::LoadFailure;
use crate::content::{ContentFactory, ModelGeometry, TileContentInput};
use crate::externals::{
    AssetRequest, AssetResponse, PrepareRendererResources, TaskProcessor, TileLoadView,
    TilesetHost,
};
use crate::geodetic::Projection;
use crate::tile::LoadState;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminates a load as `Failed`.
///
/// Notifies the host first, then publishes the state, matching the order
/// every other terminal transition uses. The host hears exactly one
/// notification per load, from whichever context terminates it.
fn fail(ctx: &LoadContext, failure: LoadFailure) {
    if matches!(failure, LoadFailure::CancelledByDestroy) {
        debug!(tile = %ctx.id, %failure, "tile load cancelled");
    } else {
        warn!(tile = %ctx.id, url = ctx.request.url(), %failure, "tile load failed");
    }
    ctx.host.notify_tile_done_loading(&ctx.id);
    ctx.shared.state.store(LoadState::Failed);
}

/// Completion callback for the content request. Runs on the I/O context.
pub(crate) fn content_response_received(ctx: LoadContext) {
    let state = ctx.shared.state.load();
    if state == LoadState::Destroying {
        fail(&ctx, LoadFailure::CancelledByDestroy);
        return;
    }
    if state > LoadState::ContentLoading {
        // A duplicate or late completion; the load already finished.
        debug!(tile = %ctx.id, ?state, "ignoring duplicate content response");
        return;
    }

    let url;
    let content_type;
    let payload;
    match ctx.request.response() {
        None => {
            fail(&ctx, LoadFailure::NetworkAbsent);
            return;
        }
        Some(response) => {
            let status = response.status_code();
            if !(200..300).contains(&status) {
                fail(&ctx, LoadFailure::NetworkStatus(status));
                return;
            }
            url = ctx.request.url().to_string();
            content_type = response.content_type().to_string();
            payload = Bytes::copy_from_slice(response.data());
        }
    }

    let task_processor = Arc::clone(&ctx.host.externals().task_processor);
    task_processor.start_task(Box::new(move || {
        decode_task(ctx, url, content_type, payload);
    }));
}

/// Decode, texture coordinate generation, and load-thread renderer prep.
/// Runs on the worker pool.
fn decode_task(ctx: LoadContext, url: String, content_type: String, payload: Bytes) {
    if ctx.shared.state.load() == LoadState::Destroying {
        fail(&ctx, LoadFailure::CancelledByDestroy);
        return;
    }

    let factory = Arc::clone(&ctx.host.externals().content_factory);
    let content = factory.create_content(TileContentInput {
        id: ctx.id.clone(),
        bounding_volume: ctx.bounding_volume,
        geometric_error: ctx.geometric_error,
        transform: ctx.transform,
        content_bounding_volume: ctx.content_bounding_volume,
        refine: ctx.refine,
        url,
        content_type,
        data: payload,
    });
    if content.is_none() {
        debug!(tile = %ctx.id, note = %LoadFailure::DecodeEmpty, "treating tile as blank");
    }
    ctx.shared.lock_slot().content = content;

    if ctx.shared.state.load() == LoadState::Destroying {
        fail(&ctx, LoadFailure::CancelledByDestroy);
        return;
    }

    {
        let mut slot = ctx.shared.lock_slot();
        generate_texture_coordinates(&ctx, &mut slot);

        // Renderer prep only runs for content with an actual model; blank
        // and external-tileset tiles never own renderer resources.
        let resources = match (
            slot.content.as_ref(),
            ctx.host.externals().prepare_renderer_resources.as_ref(),
        ) {
            (Some(content), Some(prepare)) if content.model.is_some() => {
                let view = TileLoadView {
                    id: &ctx.id,
                    bounding_volume: &ctx.bounding_volume,
                    content_bounding_volume: ctx.content_bounding_volume.as_ref(),
                    geometric_error: ctx.geometric_error,
                    refine: ctx.refine,
                    transform: &ctx.transform,
                    content,
                    raster_mappings: &slot.raster_mappings,
                };
                prepare.prepare_in_load_thread(&view)
            }
            _ => None,
        };
        slot.renderer_resources = resources;
    }

    ctx.host.notify_tile_done_loading(&ctx.id);
    ctx.shared.state.store(LoadState::ContentLoaded);
    debug!(tile = %ctx.id, "tile content loaded");
}

/// Assigns texture coordinate IDs and generates one coordinate set per
/// distinct overlay projection.
///
/// IDs are dense, start at 0, and preserve first-encounter order, so equal
/// projections share a set within a single load.
fn generate_texture_coordinates(ctx: &LoadContext, slot: &mut LoadSlot) {
    let LoadSlot {
        content,
        raster_mappings,
        ..
    } = slot;

    let Some(content) = content.as_mut() else {
        return;
    };
    let Some(model) = content.model.as_mut() else {
        return;
    };
    if raster_mappings.is_empty() {
        return;
    }
    let Some(rectangle) = ctx.bounding_volume.globe_rectangle() else {
        return;
    };

    let mut projections: Vec<Projection> = Vec::new();
    for mapping in raster_mappings.iter_mut() {
        let projection = mapping.raster_tile().projection();

        match projections.iter().position(|known| *known == projection) {
            Some(existing) => {
                mapping.set_texture_coordinate_id(existing as u32);
            }
            None => {
                let projection_id = projections.len() as u32;
                let projected = projection.project_rectangle(rectangle);
                model.generate_overlay_texture_coordinates(
                    projection_id,
                    &projection,
                    &projected,
                );
                projections.push(projection);
                mapping.set_texture_coordinate_id(projection_id);
            }
        }
    }
}
