use crate::context::ThreadContext;
use crate::errno::Errno;
use std::marker::PhantomData;
use std::{ffi, ptr, str};
use thiserror::Error;

/// A safe wrapper around `proj_sys::PJ`, owning the thread context it was created in.
///
/// The transform is destroyed before its context.
pub(crate) struct Pj {
    pj: ptr::NonNull<proj_sys::PJ>,
    ctx: ThreadContext,
}

// Safety: a `Pj` owns both the transform and the context it lives in, and neither pointer is
// handed out beyond the lifetime of a borrow. Moving it to another thread is therefore fine;
// sharing it is not, which is why there is no `Sync` impl.
unsafe impl Send for Pj {}

impl Pj {
    pub fn from_definition(ctx: ThreadContext, definition: &str) -> Result<Self, ProjCreateError> {
        let definition = ffi::CString::new(definition).map_err(ProjCreateError::ArgumentNul)?;
        let pj_ptr = unsafe { proj_sys::proj_create(ctx.as_ptr(), definition.as_ptr()) };
        Pj::from_pj_ptr(ctx, pj_ptr, ProjCreateError::InvalidDefinition)
    }

    /// Clone this transform into `ctx`. The clone shares no state with `self`.
    pub fn clone_into(&self, ctx: ThreadContext) -> Result<Self, ProjCreateError> {
        let pj_ptr = unsafe { proj_sys::proj_clone(ctx.as_ptr(), self.as_ptr()) };
        Pj::from_pj_ptr(ctx, pj_ptr, ProjCreateError::Clone)
    }

    /// Takes ownership of `pj_ptr`. A null pointer is turned into an error carrying PROJ's
    /// message for the failure, built with `on_error`.
    fn from_pj_ptr(
        ctx: ThreadContext,
        pj_ptr: *mut proj_sys::PJconsts,
        on_error: fn(String) -> ProjCreateError,
    ) -> Result<Self, ProjCreateError> {
        match ptr::NonNull::new(pj_ptr) {
            Some(pj) => Ok(Pj { pj, ctx }),
            None => {
                let errno = Errno(unsafe { proj_sys::proj_context_errno(ctx.as_ptr()) });
                Err(errno
                    .message(&ctx)
                    .map(on_error)
                    .unwrap_or_else(ProjCreateError::ErrorMessageUtf8))
            }
        }
    }

    pub fn as_ptr(&self) -> *mut proj_sys::PJ {
        self.pj.as_ptr()
    }

    pub fn context(&self) -> &ThreadContext {
        &self.ctx
    }

    pub fn errno_reset(&self) -> Errno {
        Errno(unsafe { proj_sys::proj_errno_reset(self.as_ptr()) })
    }

    pub fn errno(&self) -> Errno {
        Errno(unsafe { proj_sys::proj_errno(self.as_ptr()) })
    }

    pub fn has_inverse(&self) -> bool {
        let info = unsafe { proj_sys::proj_pj_info(self.as_ptr()) };
        info.has_inverse != 0
    }

    /// The definition string as normalized by PROJ, if it reports one.
    pub fn definition(&self) -> Result<Option<String>, str::Utf8Error> {
        let info = unsafe { proj_sys::proj_pj_info(self.as_ptr()) };
        if info.definition.is_null() {
            return Ok(None);
        }
        unsafe { crate::_string(info.definition) }.map(Some)
    }

    pub fn trans(
        &self,
        direction: proj_sys::PJ_DIRECTION,
        coord: proj_sys::PJ_COORD,
    ) -> proj_sys::PJ_COORD {
        unsafe { proj_sys::proj_trans(self.as_ptr(), direction, coord) }
    }
}

impl Drop for Pj {
    fn drop(&mut self) {
        unsafe {
            proj_sys::proj_destroy(self.as_ptr());
        }
    }
}

/// A PROJ object obtained by querying another one (a CRS, an ellipsoid), released when it
/// goes out of scope. It borrows the context it was looked up in.
pub(crate) struct ScopedPj<'ctx> {
    pj: ptr::NonNull<proj_sys::PJ>,
    _ctx: PhantomData<&'ctx ThreadContext>,
}

impl<'ctx> ScopedPj<'ctx> {
    /// Takes ownership of `pj_ptr`, or returns `None` if the lookup produced nothing.
    pub fn new(_ctx: &'ctx ThreadContext, pj_ptr: *mut proj_sys::PJ) -> Option<Self> {
        ptr::NonNull::new(pj_ptr).map(|pj| ScopedPj {
            pj,
            _ctx: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *mut proj_sys::PJ {
        self.pj.as_ptr()
    }
}

impl Drop for ScopedPj<'_> {
    fn drop(&mut self) {
        unsafe {
            proj_sys::proj_destroy(self.as_ptr());
        }
    }
}

/// Errors raised while building a [`ProjSource`](crate::ProjSource) or a
/// [`Proj`](crate::Proj). Construction is all-or-nothing: no partially built value is returned.
#[derive(Error, Debug)]
pub enum ProjCreateError {
    #[error("Could not create a PROJ thread context")]
    ContextCreation,
    #[error("A nul byte was found in the PROJ string definition: {0}")]
    ArgumentNul(ffi::NulError),
    #[error("PROJ could not create a transform from the definition: {0}")]
    InvalidDefinition(String),
    #[error("PROJ could not clone the transform: {0}")]
    Clone(String),
    #[error("Could not obtain the ellipsoid of the source CRS")]
    EllipsoidLookup,
    #[error("Could not obtain the ellipsoid parameters")]
    EllipsoidParameters,
    #[error("The projection source is no longer usable")]
    InvalidSource,
    #[error("A UTF8 error occurred when constructing a PROJ error message")]
    ErrorMessageUtf8(#[source] str::Utf8Error),
}
