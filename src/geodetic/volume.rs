//! Bounding volume variants.
//!
//! A tile's spatial extent is one of several volume shapes. Region-based
//! volumes carry a [`GlobeRectangle`] that raster overlay mapping needs;
//! boxes and spheres do not, and overlay mapping is skipped for them until
//! real geometry is available to project.

use super::rectangle::GlobeRectangle;
use glam::{DMat3, DVec3};

/// A box of arbitrary orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    /// Center of the box.
    pub center: DVec3,
    /// Columns are the box half-axes: direction and half-extent combined.
    pub half_axes: DMat3,
}

impl OrientedBoundingBox {
    pub fn new(center: DVec3, half_axes: DMat3) -> Self {
        Self { center, half_axes }
    }
}

impl Default for OrientedBoundingBox {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            half_axes: DMat3::ZERO,
        }
    }
}

/// A sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// A longitude/latitude rectangle with a height range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    rectangle: GlobeRectangle,
    minimum_height: f64,
    maximum_height: f64,
}

impl BoundingRegion {
    pub fn new(rectangle: GlobeRectangle, minimum_height: f64, maximum_height: f64) -> Self {
        Self {
            rectangle,
            minimum_height,
            maximum_height,
        }
    }

    pub fn rectangle(&self) -> &GlobeRectangle {
        &self.rectangle
    }

    pub fn minimum_height(&self) -> f64 {
        self.minimum_height
    }

    pub fn maximum_height(&self) -> f64 {
        self.maximum_height
    }
}

/// A bounding region whose heights are an estimate rather than a tight fit.
///
/// Tileset metadata sometimes announces a region before the geometry is
/// decoded; the heights are then loose and may be replaced by a refined
/// volume once the content is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegionWithLooseHeights {
    region: BoundingRegion,
}

impl BoundingRegionWithLooseHeights {
    pub fn new(region: BoundingRegion) -> Self {
        Self { region }
    }

    pub fn bounding_region(&self) -> &BoundingRegion {
        &self.region
    }
}

/// The bounding volume of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingVolume {
    OrientedBox(OrientedBoundingBox),
    Region(BoundingRegion),
    LooseRegion(BoundingRegionWithLooseHeights),
    Sphere(BoundingSphere),
}

impl BoundingVolume {
    /// Returns the globe rectangle for region-based volumes.
    ///
    /// Boxes and spheres return `None`: their footprint on the globe is not
    /// known until geometry exists, so raster overlay mapping does not run
    /// for them.
    pub fn globe_rectangle(&self) -> Option<&GlobeRectangle> {
        match self {
            BoundingVolume::Region(region) => Some(region.rectangle()),
            BoundingVolume::LooseRegion(loose) => Some(loose.bounding_region().rectangle()),
            BoundingVolume::OrientedBox(_) | BoundingVolume::Sphere(_) => None,
        }
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        BoundingVolume::OrientedBox(OrientedBoundingBox::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_exposes_rectangle() {
        let rect = GlobeRectangle::from_degrees(-1.0, -1.0, 1.0, 1.0);
        let volume = BoundingVolume::Region(BoundingRegion::new(rect, 0.0, 100.0));
        assert_eq!(volume.globe_rectangle(), Some(&rect));
    }

    #[test]
    fn test_loose_region_exposes_rectangle() {
        let rect = GlobeRectangle::from_degrees(5.0, 5.0, 6.0, 6.0);
        let region = BoundingRegion::new(rect, -10.0, 9000.0);
        let volume =
            BoundingVolume::LooseRegion(BoundingRegionWithLooseHeights::new(region));
        assert_eq!(volume.globe_rectangle(), Some(&rect));
    }

    #[test]
    fn test_box_and_sphere_have_no_rectangle() {
        let boxed = BoundingVolume::OrientedBox(OrientedBoundingBox::default());
        let sphere = BoundingVolume::Sphere(BoundingSphere::new(DVec3::ZERO, 1.0));
        assert!(boxed.globe_rectangle().is_none());
        assert!(sphere.globe_rectangle().is_none());
    }

    #[test]
    fn test_default_is_degenerate_box() {
        match BoundingVolume::default() {
            BoundingVolume::OrientedBox(b) => {
                assert_eq!(b.center, DVec3::ZERO);
                assert_eq!(b.half_axes, DMat3::ZERO);
            }
            other => panic!("unexpected default volume: {:?}", other),
        }
    }

    #[test]
    fn test_region_heights() {
        let rect = GlobeRectangle::from_degrees(0.0, 0.0, 1.0, 1.0);
        let region = BoundingRegion::new(rect, -432.0, 8848.0);
        assert_eq!(region.minimum_height(), -432.0);
        assert_eq!(region.maximum_height(), 8848.0);
    }
}
