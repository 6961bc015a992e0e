use crate::pj::ProjCreateError;
use std::ptr;

/// PROJ thread context
///
/// Every context isolates its own error state. A context is never shared: the canonical
/// transform of a [`ProjSource`](crate::ProjSource) and every [`Proj`](crate::Proj) each
/// own one.
pub(crate) struct ThreadContext(ptr::NonNull<proj_sys::PJ_CONTEXT>);

// Safety: a `ThreadContext` is exclusively owned, so moving it to another thread moves the
// only handle to the underlying context with it.
unsafe impl Send for ThreadContext {}

impl ThreadContext {
    pub fn new() -> Result<Self, ProjCreateError> {
        let ctx_ptr = unsafe { proj_sys::proj_context_create() };
        ptr::NonNull::new(ctx_ptr)
            .map(ThreadContext)
            .ok_or(ProjCreateError::ContextCreation)
    }

    pub fn as_ptr(&self) -> *mut proj_sys::PJ_CONTEXT {
        self.0.as_ptr()
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        // Safety: The pointer being provided to `proj_context_destroy` will always be a valid
        // thread context, so long as the same `ThreadContext` doesn't get dropped twice.
        unsafe { proj_sys::proj_context_destroy(self.0.as_ptr()) };
    }
}
