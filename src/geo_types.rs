//! Conversions between this crate's point types and [`geo_types`].
//!
//! Geographic coordinates map `lambda` to `x` and `phi` to `y`, in radians.
//!
//!```rust
//! # use approx::assert_relative_eq;
//! use geo_types::Point;
//! use projwrapper::Proj;
//!
//! let merc = Proj::new("+proj=merc +ellps=WGS84").unwrap();
//! let projected: Point = merc.project(Point::new(0.0f64, 0.0)).into();
//! assert_relative_eq!(projected, Point::new(0.0, 0.0));
//! ```
use crate::types::{Geo, Xy};

impl From<Xy> for geo_types::Coord<f64> {
    fn from(xy: Xy) -> Self {
        Self { x: xy.x, y: xy.y }
    }
}

impl From<geo_types::Coord<f64>> for Xy {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Xy::new(coord.x, coord.y)
    }
}

impl From<Xy> for geo_types::Point<f64> {
    fn from(xy: Xy) -> Self {
        Self::new(xy.x, xy.y)
    }
}

impl From<geo_types::Point<f64>> for Xy {
    fn from(point: geo_types::Point<f64>) -> Self {
        Xy::new(point.x(), point.y())
    }
}

impl From<Geo> for geo_types::Coord<f64> {
    fn from(geo: Geo) -> Self {
        Self {
            x: geo.lambda,
            y: geo.phi,
        }
    }
}

impl From<geo_types::Coord<f64>> for Geo {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Geo::new(coord.x, coord.y)
    }
}

impl From<Geo> for geo_types::Point<f64> {
    fn from(geo: Geo) -> Self {
        Self::new(geo.lambda, geo.phi)
    }
}

impl From<geo_types::Point<f64>> for Geo {
    fn from(point: geo_types::Point<f64>) -> Self {
        Geo::new(point.x(), point.y())
    }
}
