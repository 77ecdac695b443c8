//! Map projections.
//!
//! A projection maps geodetic longitude/latitude onto a 2D plane. Raster
//! overlay imagery is delivered in a particular projection, and texture
//! coordinates for draping it over geometry must be generated in that same
//! projection. Projections are compared by value: two overlay providers
//! using Web Mercator share one set of texture coordinates.

use super::rectangle::{GlobeRectangle, Rectangle};

/// WGS84 ellipsoid semi-major axis, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Latitude bound of the Web Mercator projection, in radians (~85.051129°).
///
/// Latitudes beyond this are clamped before projecting; Web Mercator is
/// singular at the poles.
pub const MAX_MERCATOR_LATITUDE: f64 = 1.484_422_229_745_332_4;

/// A map projection, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Equirectangular lon/lat projection (EPSG:4326 layout).
    Geographic,
    /// Spherical Web Mercator (EPSG:3857).
    WebMercator,
}

impl Projection {
    /// Projects a longitude/latitude pair (radians) to plane coordinates
    /// in meters.
    pub fn project_position(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (
                longitude * EARTH_RADIUS_METERS,
                latitude * EARTH_RADIUS_METERS,
            ),
            Projection::WebMercator => {
                let clamped = latitude.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
                (
                    longitude * EARTH_RADIUS_METERS,
                    clamped.tan().asinh() * EARTH_RADIUS_METERS,
                )
            }
        }
    }

    /// Projects a globe rectangle to a planar rectangle.
    ///
    /// Both supported projections are monotonic in longitude and latitude,
    /// so projecting the southwest and northeast corners is sufficient.
    pub fn project_rectangle(&self, rectangle: &GlobeRectangle) -> Rectangle {
        let (minimum_x, minimum_y) = self.project_position(rectangle.west, rectangle.south);
        let (maximum_x, maximum_y) = self.project_position(rectangle.east, rectangle.north);
        Rectangle::new(minimum_x, minimum_y, maximum_x, maximum_y)
    }

    /// Returns the projection name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Geographic => "geographic",
            Projection::WebMercator => "web-mercator",
        }
    }
}
