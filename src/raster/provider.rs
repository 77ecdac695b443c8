//! Overlay provider contract.

use super::mapping::RasterMapping;
use crate::geodetic::{GlobeRectangle, Projection};

/// Source of raster overlay tiles for one imagery layer.
///
/// The provider owns its imagery pipeline; the tile lifecycle only asks it
/// to map overlay tiles onto a geometry tile's footprint.
pub trait RasterOverlayTileProvider: Send + Sync {
    /// The projection this provider's imagery is delivered in.
    fn projection(&self) -> Projection;

    /// Appends mappings covering `rectangle` to `output`.
    ///
    /// Called on the main thread during `load_content`. The provider picks
    /// overlay tiles whose detail matches `geometric_error` and may append
    /// zero or more mappings; the overlay tiles it hands out may still be
    /// loading.
    fn map_raster_tiles_to_geometry_tile(
        &self,
        rectangle: &GlobeRectangle,
        geometric_error: f64,
        output: &mut Vec<RasterMapping>,
    );

    /// Provider name for logging.
    fn name(&self) -> &str {
        "raster-overlay"
    }
}
