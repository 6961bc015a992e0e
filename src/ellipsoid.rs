//! Ellipsoid parameters of a projection.
//!
//! PROJ exposes the ellipsoid of a transform through its source CRS. A transform created from a
//! bare PROJ string such as `+proj=merc +a=6371000 +f=0.003` has no source CRS, although PROJ
//! consumed `a` and `f`; for those, the parameters are recovered from the definition string
//! itself, falling back to GRS80.
use crate::pj::{Pj, ProjCreateError, ScopedPj};
use std::ptr;
use tracing::trace;

/// Semi-major axis of the GRS80 ellipsoid in metres, PROJ's default.
pub const DEFAULT_SEMI_MAJOR_AXIS: f64 = 6378137.0;

/// Flattening of the GRS80 ellipsoid, PROJ's default.
pub const DEFAULT_FLATTENING: f64 = 1.0 / 298.257222101;

/// Number of leading bytes of a definition string that are scanned for parameters.
pub const SCAN_LIMIT: usize = 10_000;

/// A reference ellipsoid given by semi-major axis `a` (metres) and flattening `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

/// Where the parameters of an [`Ellipsoid`] were obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EllipsoidOrigin {
    /// Queried from the ellipsoid of the transform's source CRS.
    Crs,
    /// Defaults, possibly overridden by `a=` / `f=` in the definition string.
    Definition,
}

impl Ellipsoid {
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: DEFAULT_SEMI_MAJOR_AXIS,
        f: DEFAULT_FLATTENING,
    };

    pub const fn new(a: f64, f: f64) -> Self {
        Ellipsoid { a, f }
    }

    /// Semi-minor axis `b = a (1 - f)`.
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// GRS80, with `a` and `f` replaced by any positive values found in `definition`.
    ///
    /// ```
    /// use projwrapper::Ellipsoid;
    ///
    /// let ellps = Ellipsoid::from_definition("+proj=merc +a=6371000 +f=0.003");
    /// assert_eq!(ellps, Ellipsoid::new(6371000.0, 0.003));
    ///
    /// let ellps = Ellipsoid::from_definition("+proj=merc +a=-1");
    /// assert_eq!(ellps, Ellipsoid::GRS80);
    /// ```
    pub fn from_definition(definition: &str) -> Self {
        let mut ellipsoid = Ellipsoid::GRS80;
        if let Some(a) = scan_definition(definition, "a") {
            ellipsoid.a = a;
        }
        if let Some(f) = scan_definition(definition, "f") {
            ellipsoid.f = f;
        }
        ellipsoid
    }

    /// Resolve the ellipsoid of `pj`, preferring its source CRS over the definition string.
    pub(crate) fn resolve(
        pj: &Pj,
        definition: &str,
    ) -> Result<(Self, EllipsoidOrigin), ProjCreateError> {
        let ctx = pj.context();
        let crs = unsafe { proj_sys::proj_get_source_crs(ctx.as_ptr(), pj.as_ptr()) };
        let Some(crs) = ScopedPj::new(ctx, crs) else {
            return Ok((
                Ellipsoid::from_definition(definition),
                EllipsoidOrigin::Definition,
            ));
        };

        let ellps = unsafe { proj_sys::proj_get_ellipsoid(ctx.as_ptr(), crs.as_ptr()) };
        let ellps = ScopedPj::new(ctx, ellps).ok_or(ProjCreateError::EllipsoidLookup)?;

        let mut a = 0.0;
        let mut inv_flattening = 0.0;
        let rc = unsafe {
            proj_sys::proj_ellipsoid_get_parameters(
                ctx.as_ptr(),
                ellps.as_ptr(),
                &mut a,
                ptr::null_mut(),
                ptr::null_mut(),
                &mut inv_flattening,
            )
        };
        if rc == 0 {
            return Err(ProjCreateError::EllipsoidParameters);
        }

        // PROJ reports an inverse flattening of zero for spheres.
        let f = if inv_flattening == 0.0 {
            0.0
        } else {
            1.0 / inv_flattening
        };
        Ok((Ellipsoid { a, f }, EllipsoidOrigin::Crs))
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::GRS80
    }
}

/// Look up the value of `key=` in a PROJ definition string.
///
/// The key must sit at the very start of the string or directly after a `+` or a space. Only the
/// first occurrence is considered and the value runs up to the next space. Of that value, the
/// longest leading decimal number is read and anything after it is ignored, so `+a=6371000+f=0`
/// yields `6371000`. Only the first [`SCAN_LIMIT`] bytes are examined. Returns `None` unless the
/// number is finite and strictly positive.
///
/// ```
/// use projwrapper::scan_definition;
///
/// assert_eq!(scan_definition("+proj=merc +a=6371000", "a"), Some(6371000.0));
/// assert_eq!(scan_definition("+proj=merc+a=6371000+f=0.003", "a"), Some(6371000.0));
/// assert_eq!(scan_definition("+proj=merc +rf=298.25", "f"), None);
/// ```
pub fn scan_definition(definition: &str, key: &str) -> Option<f64> {
    let bytes = definition.as_bytes();
    let bytes = &bytes[..bytes.len().min(SCAN_LIMIT)];
    let key = key.as_bytes();
    if key.is_empty() {
        return None;
    }

    let matches_at = |start: usize| {
        bytes.get(start..start + key.len()) == Some(key)
            && bytes.get(start + key.len()) == Some(&b'=')
    };
    let value_start = if matches_at(0) {
        key.len() + 1
    } else {
        bytes
            .iter()
            .enumerate()
            .find(|&(i, &c)| (c == b'+' || c == b' ') && matches_at(i + 1))
            .map(|(i, _)| i + key.len() + 2)?
    };

    let rest = &bytes[value_start..];
    let value_end = rest.iter().position(|&c| c == b' ').unwrap_or(rest.len());
    let raw = &rest[..value_end];
    match leading_number(raw) {
        Some(value) if value.is_finite() && value > 0.0 => {
            trace!(
                key = %String::from_utf8_lossy(key),
                value,
                "ellipsoid parameter read from definition"
            );
            Some(value)
        }
        _ => {
            trace!(
                key = %String::from_utf8_lossy(key),
                raw = %String::from_utf8_lossy(raw),
                "ignoring ellipsoid parameter"
            );
            None
        }
    }
}

/// Parse the longest decimal number at the start of `raw`, after leading whitespace.
fn leading_number(raw: &[u8]) -> Option<f64> {
    let start = raw
        .iter()
        .position(|c| !c.is_ascii_whitespace())
        .unwrap_or(raw.len());
    let raw = &raw[start..];
    let digits_from = |i: usize| {
        raw[i.min(raw.len())..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(raw.first(), Some(b'+' | b'-')));
    let integer = digits_from(end);
    end += integer;
    let mut fraction = 0;
    if raw.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer + fraction == 0 {
        return None;
    }
    if matches!(raw.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(raw.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    std::str::from_utf8(&raw[..end]).ok()?.parse().ok()
}
