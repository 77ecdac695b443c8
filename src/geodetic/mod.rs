//! Geodetic and spatial math primitives.
//!
//! Provides the rectangle, projection, and bounding volume types that the
//! tile lifecycle works in terms of. Longitude and latitude are always
//! expressed in radians unless a function name says otherwise.

mod projection;
mod rectangle;
mod volume;

pub use projection::{Projection, EARTH_RADIUS_METERS, MAX_MERCATOR_LATITUDE};
pub use rectangle::{GlobeRectangle, Rectangle};
pub use volume::{
    BoundingRegion, BoundingRegionWithLooseHeights, BoundingSphere, BoundingVolume,
    OrientedBoundingBox,
};
