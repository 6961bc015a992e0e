use crate::context::ThreadContext;
use crate::ellipsoid::{Ellipsoid, EllipsoidOrigin};
use crate::pj::{Pj, ProjCreateError};
use crate::proj::{Proj, ProjError};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The canonical transform created from a definition string, together with the properties
/// derived from it once at construction.
///
/// A `ProjSource` does not transform coordinates itself. It hands out [`Proj`] handles, each
/// holding a private clone of the canonical transform in a context of its own, and stays alive
/// for as long as any of them does.
///
/// ```
/// use projwrapper::{GeoDegrees, ProjSource};
///
/// let source = ProjSource::new("+proj=merc +ellps=WGS84").unwrap();
/// let a = source.proj().unwrap();
/// let b = source.proj().unwrap();
///
/// let point = GeoDegrees::new(10.0, 50.0);
/// assert_eq!(a.project(point), b.project(point));
/// assert_eq!(a.a(), source.a());
/// ```
pub struct ProjSource {
    definition: String,
    canonical: Mutex<Pj>,
    ellipsoid: Ellipsoid,
    origin: EllipsoidOrigin,
    has_inverse: bool,
}

impl ProjSource {
    /// Create the canonical transform for `definition` and resolve its ellipsoid.
    pub fn new(definition: &str) -> Result<Arc<Self>, ProjCreateError> {
        let ctx = ThreadContext::new()?;
        let pj = Pj::from_definition(ctx, definition).inspect_err(|err| {
            debug!(definition, error = %err, "failed to create projection source");
        })?;
        let has_inverse = pj.has_inverse();
        let (ellipsoid, origin) = Ellipsoid::resolve(&pj, definition)?;
        // A missing source CRS may leave an error code behind in the canonical context.
        pj.errno_reset();

        debug!(
            definition,
            a = ellipsoid.a,
            f = ellipsoid.f,
            ?origin,
            has_inverse,
            "created projection source"
        );
        Ok(Arc::new(ProjSource {
            definition: definition.to_owned(),
            canonical: Mutex::new(pj),
            ellipsoid,
            origin,
            has_inverse,
        }))
    }

    /// Create a new [`Proj`] handle backed by a private clone of the canonical transform.
    pub fn proj(self: &Arc<Self>) -> Result<Proj, ProjCreateError> {
        Proj::from_source(Arc::clone(self))
    }

    /// Clone the canonical transform into a freshly created context.
    pub(crate) fn clone_canonical(&self) -> Result<Pj, ProjCreateError> {
        let canonical = self
            .canonical
            .lock()
            .map_err(|_| ProjCreateError::InvalidSource)?;
        let ctx = ThreadContext::new()?;
        canonical.clone_into(ctx)
    }

    /// The definition string this source was created from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// The definition as normalized by PROJ, or `None` if PROJ reports none.
    pub fn engine_definition(&self) -> Result<Option<String>, ProjError> {
        let canonical = self
            .canonical
            .lock()
            .map_err(|_| ProjError::InvalidSource)?;
        Ok(canonical.definition()?)
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    pub fn ellipsoid_origin(&self) -> EllipsoidOrigin {
        self.origin
    }

    /// Semi-major axis of the ellipsoid in metres.
    pub fn a(&self) -> f64 {
        self.ellipsoid.a
    }

    /// Flattening of the ellipsoid.
    pub fn f(&self) -> f64 {
        self.ellipsoid.f
    }

    pub fn has_inverse(&self) -> bool {
        self.has_inverse
    }
}

impl fmt::Debug for ProjSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjSource")
            .field("definition", &self.definition)
            .field("ellipsoid", &self.ellipsoid)
            .field("origin", &self.origin)
            .field("has_inverse", &self.has_inverse)
            .finish()
    }
}
