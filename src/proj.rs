use crate::ellipsoid::Ellipsoid;
use crate::pj::{Pj, ProjCreateError};
use crate::source::ProjSource;
use crate::types::{Geo, Xy};
use proj_sys::{PJ_COORD, PJ_DIRECTION_PJ_FWD, PJ_DIRECTION_PJ_INV};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised by calls on an existing [`Proj`] or [`ProjSource`], such as [`Proj::inverse`].
/// The handle stays usable after any of them, except [`ProjError::InvalidSource`].
#[derive(Error, Debug)]
pub enum ProjError {
    #[error("An error state was already set before the inverse projection")]
    StaleErrorState,
    #[error("The inverse projection failed: {message} (error code {code})")]
    Engine { code: i32, message: String },
    #[error("The projection source is no longer usable")]
    InvalidSource,
    #[error("A string returned by PROJ is not valid UTF8")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A projection handle for use on a single thread.
///
/// Each `Proj` holds its own clone of the canonical transform of a shared [`ProjSource`], in
/// its own PROJ context. A `Proj` can be moved to another thread but not shared between
/// threads; give every thread its own handle via [`Proj::try_clone`] or [`ProjSource::proj`].
///
/// Forward projections take geographic coordinates in radians (or [`GeoDegrees`], which are
/// converted) and inverse projections return radians.
///
/// [`GeoDegrees`]: crate::GeoDegrees
pub struct Proj {
    source: Arc<ProjSource>,
    workhorse: Pj,
}

impl Proj {
    /// Try to instantiate a new projection from a PROJ definition string.
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use projwrapper::{GeoDegrees, Proj};
    ///
    /// let merc = Proj::new("+proj=merc +ellps=WGS84").unwrap();
    /// let xy = merc.project(GeoDegrees::new(10.0, 0.0));
    /// assert_relative_eq!(xy.x, 1113194.9079327357, epsilon = 1e-6);
    /// assert_relative_eq!(xy.y, 0.0, epsilon = 1e-6);
    /// ```
    pub fn new(definition: &str) -> Result<Self, ProjCreateError> {
        ProjSource::new(definition)?.proj()
    }

    pub(crate) fn from_source(source: Arc<ProjSource>) -> Result<Self, ProjCreateError> {
        let workhorse = source.clone_canonical()?;
        Ok(Proj { source, workhorse })
    }

    /// Create an independent handle to the same projection.
    ///
    /// The new handle shares the [`ProjSource`] but clones the transform into a context of its
    /// own, so the two handles may be used on different threads.
    pub fn try_clone(&self) -> Result<Self, ProjCreateError> {
        let proj = Proj::from_source(Arc::clone(&self.source))?;
        debug!(definition = self.source.definition(), "cloned projection handle");
        Ok(proj)
    }

    pub fn source(&self) -> &Arc<ProjSource> {
        &self.source
    }

    /// Project a geographic point into projected coordinates.
    ///
    /// Failures are not reported here: PROJ returns `HUGE_VAL` coordinates and leaves its error
    /// code set, which the next call to [`Proj::inverse`] reports as
    /// [`ProjError::StaleErrorState`].
    pub fn project<P: Into<Geo>>(&self, point: P) -> Xy {
        let point = point.into();
        self.project_lp(point.lambda, point.phi)
    }

    /// Project longitude `lam` and latitude `phi`, both in radians.
    pub fn project_lp(&self, lam: f64, phi: f64) -> Xy {
        let coord = self.workhorse.trans(PJ_DIRECTION_PJ_FWD, coord(lam, phi));
        let xy = unsafe { coord.xy };
        Xy::new(xy.x, xy.y)
    }

    pub fn project_many(&self, points: &[Geo]) -> Vec<Xy> {
        points.iter().map(|&point| self.project(point)).collect()
    }

    /// Project a point back to geographic coordinates in radians.
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use projwrapper::{Geo, Proj};
    ///
    /// let merc = Proj::new("+proj=merc +ellps=WGS84").unwrap();
    /// let point = Geo::new(0.2, 0.7);
    /// let back = merc.inverse(merc.project(point)).unwrap();
    /// assert_relative_eq!(back.lambda, point.lambda, epsilon = 1e-12);
    /// assert_relative_eq!(back.phi, point.phi, epsilon = 1e-12);
    /// ```
    pub fn inverse(&self, xy: Xy) -> Result<Geo, ProjError> {
        if self.workhorse.errno().is_set() {
            self.workhorse.errno_reset();
            return Err(ProjError::StaleErrorState);
        }
        let coord = self.workhorse.trans(PJ_DIRECTION_PJ_INV, coord(xy.x, xy.y));
        let err = self.workhorse.errno();
        if err.is_set() {
            self.workhorse.errno_reset();
            let message = err.message(self.workhorse.context())?;
            return Err(ProjError::Engine {
                code: err.0,
                message,
            });
        }
        let lp = unsafe { coord.lp };
        Ok(Geo::new(lp.lam, lp.phi))
    }

    /// Inverse of projected coordinates `x` and `y`.
    pub fn inverse_xy(&self, x: f64, y: f64) -> Result<Geo, ProjError> {
        self.inverse(Xy::new(x, y))
    }

    /// Inverse-project all `points`, stopping at the first failure.
    pub fn inverse_many(&self, points: &[Xy]) -> Result<Vec<Geo>, ProjError> {
        points.iter().map(|&xy| self.inverse(xy)).collect()
    }

    pub fn has_inverse(&self) -> bool {
        self.source.has_inverse()
    }

    /// Semi-major axis of the ellipsoid in metres.
    pub fn a(&self) -> f64 {
        self.source.a()
    }

    /// Flattening of the ellipsoid.
    pub fn f(&self) -> f64 {
        self.source.f()
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.source.ellipsoid()
    }
}

impl fmt::Debug for Proj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj").field("source", &self.source).finish()
    }
}

fn coord(x: f64, y: f64) -> PJ_COORD {
    PJ_COORD {
        v: [x, y, 0.0, 0.0],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{GeoDegrees, deg2rad};
    use approx::assert_relative_eq;
    use std::thread;

    const ORTHO: &str = "+proj=ortho +lat_0=0 +lon_0=0 +R=6370997";

    #[test]
    fn test_new_projection() {
        let proj = Proj::new("+proj=merc +ellps=WGS84").unwrap();
        assert!(proj.has_inverse());
        assert_relative_eq!(proj.a(), 6378137.0);
        assert_relative_eq!(proj.f(), 1.0 / 298.257, epsilon = 1e-8);
        assert_eq!(proj.ellipsoid().a, proj.a());
    }

    #[test]
    fn test_invalid_projection() {
        assert!(matches!(
            Proj::new("+proj=this_is_no_projection"),
            Err(ProjCreateError::InvalidDefinition(_))
        ));
        assert!(matches!(
            Proj::new("+proj=merc\0"),
            Err(ProjCreateError::ArgumentNul(_))
        ));
    }

    #[test]
    fn test_project_utm() {
        let utm = Proj::new("+proj=utm +zone=32 +ellps=WGS84").unwrap();
        // On the central meridian of zone 32, at the equator.
        let xy = utm.project(GeoDegrees::new(9.0, 0.0));
        assert_relative_eq!(xy.x, 500000.0, epsilon = 1e-6);
        assert_relative_eq!(xy.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degrees_and_radians_agree() {
        let proj = Proj::new("+proj=merc +ellps=WGS84").unwrap();
        let degrees = GeoDegrees::new(13.4, 52.5);
        let radians = Geo::new(deg2rad(13.4), deg2rad(52.5));
        assert_eq!(proj.project(degrees), proj.project(radians));
        assert_eq!(
            proj.project(radians),
            proj.project_lp(radians.lambda, radians.phi)
        );
    }

    #[test]
    fn test_round_trip() {
        let proj = Proj::new(
            "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy",
        )
        .unwrap();
        let points: Vec<Geo> = [(-0.13, 51.5), (-3.2, 55.95), (1.3, 52.6)]
            .iter()
            .map(|&(lon, lat)| GeoDegrees::new(lon, lat).to_radians())
            .collect();
        let projected = proj.project_many(&points);
        let back = proj.inverse_many(&projected).unwrap();
        for (point, back) in points.iter().zip(&back) {
            assert_relative_eq!(point.lambda, back.lambda, epsilon = 1e-10);
            assert_relative_eq!(point.phi, back.phi, epsilon = 1e-10);
        }
        let single = proj.inverse_xy(projected[0].x, projected[0].y).unwrap();
        assert_eq!(single, back[0]);
    }

    #[test]
    fn test_clone_is_independent() {
        let proj = Proj::new("+proj=merc +ellps=WGS84").unwrap();
        let clone = proj.try_clone().unwrap();
        assert!(Arc::ptr_eq(proj.source(), clone.source()));

        let point = Geo::new(0.3, -0.4);
        let xy = proj.project(point);
        assert_eq!(clone.project(point), xy);
        assert_eq!(clone.inverse(xy).unwrap(), proj.inverse(xy).unwrap());

        drop(proj);
        assert_eq!(clone.project(point), xy);
        assert!(clone.inverse(xy).is_ok());
    }

    #[test]
    fn test_clone_error_state_is_private() {
        let proj = Proj::new(ORTHO).unwrap();
        let clone = proj.try_clone().unwrap();
        // Far side of the globe.
        proj.project(Geo::new(3.0, 0.0));
        assert!(clone.inverse(Xy::new(0.0, 0.0)).is_ok());
        assert!(matches!(
            proj.inverse(Xy::new(0.0, 0.0)),
            Err(ProjError::StaleErrorState)
        ));
    }

    #[test]
    fn test_stale_error_state() {
        let proj = Proj::new(ORTHO).unwrap();
        let xy = proj.project(Geo::new(3.0, 0.0));
        assert!(!xy.x.is_finite() || xy.x.abs() > 1e30);

        assert!(matches!(
            proj.inverse(Xy::new(0.0, 0.0)),
            Err(ProjError::StaleErrorState)
        ));
        // The stale error state was cleared by the failed call.
        let geo = proj.inverse(Xy::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(geo.lambda, 0.0, epsilon = 1e-12);
        assert_relative_eq!(geo.phi, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_engine_error() {
        let proj = Proj::new(ORTHO).unwrap();
        match proj.inverse(Xy::new(1e8, 1e8)) {
            Err(ProjError::Engine { code, message }) => {
                assert_ne!(code, 0);
                assert!(!message.is_empty());
            }
            other => panic!("expected an engine error, got {other:?}"),
        }
        // The error state was reset, so the handle keeps working.
        assert!(proj.inverse(Xy::new(0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_inverse_many_stops_at_failure() {
        let proj = Proj::new(ORTHO).unwrap();
        let points = [Xy::new(0.0, 0.0), Xy::new(1e8, 0.0), Xy::new(1.0, 1.0)];
        assert!(matches!(
            proj.inverse_many(&points),
            Err(ProjError::Engine { .. })
        ));
    }

    #[test]
    fn test_send_to_thread() {
        let proj = Proj::new("+proj=merc +ellps=WGS84").unwrap();
        let point = Geo::new(0.1, 0.2);
        let expected = proj.project(point);

        let clone = proj.try_clone().unwrap();
        let result = thread::spawn(move || clone.project(point)).join().unwrap();
        assert_eq!(result, expected);
    }
}
