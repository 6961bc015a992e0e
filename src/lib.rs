//! `projwrapper` provides cloneable, thread-confined projection handles on top of
//! [PROJ](https://proj.org), together with the ellipsoid of each projection.
//!
//! A PROJ transform is not safe to use from several threads at once, and its error state lives in
//! the context it was created in. This crate therefore splits a projection into two parts:
//!
//! - a [`ProjSource`], created once per definition string. It owns the canonical PROJ transform
//!   and determines, once, whether the projection has an inverse and which ellipsoid it uses;
//! - any number of [`Proj`] handles. Each holds a private clone of the canonical transform in a
//!   context of its own and performs forward ([`Proj::project`]) and inverse
//!   ([`Proj::inverse`]) projections. Handles share the source through an [`Arc`](std::sync::Arc).
//!
//! # Ellipsoid
//!
//! The semi-major axis [`Proj::a`] and flattening [`Proj::f`] come from the ellipsoid of the
//! transform's source CRS where PROJ provides one. Bare PROJ strings such as
//! `+proj=merc +a=6371000 +f=0.003` have no source CRS; for those, `a=` and `f=` are read from
//! the definition string with [`scan_definition`], falling back to GRS80.
//!
//! # Logging
//!
//! Creation of sources and cloning of handles are reported through [`tracing`] at `debug` level;
//! install a subscriber to see them.
//!
//! # Requirements
//!
//! By default, this requires `libproj` to be present on your system, as located by the
//! [`proj-sys`](https://crates.io/crates/proj-sys) crate. The `bundled_proj` feature builds
//! `libproj` from source instead. The `geo-types` feature (enabled by default) provides
//! conversions from and to [`geo-types`](https://docs.rs/geo-types) points.
//!
//! # Example
//!
//! ```
//! use approx::assert_relative_eq;
//! use projwrapper::{GeoDegrees, Proj};
//!
//! let utm = Proj::new("+proj=utm +zone=32 +ellps=WGS84").unwrap();
//! let xy = utm.project(GeoDegrees::new(9.0, 0.0));
//! assert_relative_eq!(xy.x, 500000.0, epsilon = 1e-6);
//!
//! // Another handle for another thread.
//! let worker = utm.try_clone().unwrap();
//! let back = std::thread::spawn(move || worker.inverse(xy).unwrap())
//!     .join()
//!     .unwrap();
//! assert_relative_eq!(back.to_degrees().lon, 9.0, epsilon = 1e-9);
//! assert_relative_eq!(utm.a(), 6378137.0);
//! ```

mod context;
mod ellipsoid;
mod errno;
#[cfg(feature = "geo-types")]
mod geo_types;
mod pj;
mod proj;
mod source;
mod types;

pub use crate::ellipsoid::{
    DEFAULT_FLATTENING, DEFAULT_SEMI_MAJOR_AXIS, Ellipsoid, EllipsoidOrigin, SCAN_LIMIT,
    scan_definition,
};
pub use crate::pj::ProjCreateError;
pub use crate::proj::{Proj, ProjError};
pub use crate::source::ProjSource;
pub use crate::types::{Geo, GeoDegrees, Xy, deg2rad, modulo, rad2deg};

use std::ffi::CStr;
use std::str;

/// Copy a string owned by PROJ. A null pointer yields an empty string.
///
/// # Safety
///
/// `raw_ptr` must be null or point to a nul-terminated string that stays valid for the call.
pub(crate) unsafe fn _string(raw_ptr: *const libc::c_char) -> Result<String, str::Utf8Error> {
    if raw_ptr.is_null() {
        return Ok(String::new());
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    Ok(str::from_utf8(c_str.to_bytes())?.to_string())
}
