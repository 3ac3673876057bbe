//! Point-in-region tests.

use geo::{Intersects as _, Point};

use crate::catalog::{Region, RegionShape};

/// A region whose shape cannot be tested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("region '{region}' has no usable geometry: {reason}")]
pub struct GeometryError {
    /// Region name.
    pub region: String,
    /// Why the shape was rejected at load time.
    pub reason: String,
}

/// Decides whether a point lies inside a region.
pub trait ContainmentTest {
    /// Returns whether `point` (x = longitude, y = latitude) lies inside
    /// `region`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the region's shape cannot be tested.
    fn contains(&self, region: &Region, point: &Point<f64>) -> Result<bool, GeometryError>;
}

/// [`ContainmentTest`] backed by `geo`. Points on a polygon boundary count
/// as contained.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoContainment;

impl ContainmentTest for GeoContainment {
    fn contains(&self, region: &Region, point: &Point<f64>) -> Result<bool, GeometryError> {
        match &region.shape {
            RegionShape::Polygons { polygons, .. } => Ok(polygons.intersects(point)),
            RegionShape::Invalid { reason } => Err(GeometryError {
                region: region.name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}
