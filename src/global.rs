//! Process-wide allocator surface with an init-before-use lifecycle.
//!
//! Some embedders want a single allocator shared by the whole process
//! and configured once at startup from a policy token, rather than an
//! engine value threaded through the code. This module wraps one static
//! [`FitAllocator`] accordingly: call [`initialise`] first, everything
//! else delegates to the installed engine.
//!
//! ```rust
//! let region: &'static mut [u8] = Box::leak(vec![0u8; 4096].into_boxed_slice());
//! fitalloc::global::initialise(region, Some("FirstFit"));
//!
//! let payload = fitalloc::global::allocate(128).unwrap();
//! unsafe { fitalloc::global::deallocate(payload.as_mut_ptr()) };
//! fitalloc::global::validate();
//! ```

use spin::RwLock;

use crate::fit_alloc::{AllocError, FitAllocator, FitPolicy};

static ENGINE: RwLock<Option<FitAllocator<'static>>> = RwLock::new(None);

/// Install the process-wide allocator over `region`.
///
/// `algorithm` is one of the literal tokens `"FirstFit"`, `"NextFit"`,
/// `"BestFit"` or `"WorstFit"`; leaving it unset selects first-fit.
/// Calling `initialise` again replaces the previous engine; outstanding
/// allocations from it are abandoned.
///
/// # Panics
/// Panics on an unknown policy token or an undersized region.
pub fn initialise(region: &'static mut [u8], algorithm: Option<&str>) {
    let policy = match algorithm {
        Some(token) => token.parse().expect("unknown placement policy token"),
        None => FitPolicy::default(),
    };

    *ENGINE.write() = Some(FitAllocator::new(region, policy));
}

/// Allocate `bytes` from the process-wide allocator.
///
/// # Panics
/// Panics if called before [`initialise`], or if `bytes` is zero.
pub fn allocate(bytes: usize) -> Result<&'static mut [u8], AllocError> {
    ENGINE
        .read()
        .as_ref()
        .expect("allocate called before initialise")
        .allocate(bytes)
}

/// Release an allocation obtained from [`allocate`]. Null is ignored.
///
/// # Panics
/// Panics if called before [`initialise`].
///
/// # Safety
/// Same contract as [`FitAllocator::deallocate`].
pub unsafe fn deallocate(data_ptr: *mut u8) {
    ENGINE
        .read()
        .as_ref()
        .expect("deallocate called before initialise")
        .deallocate(data_ptr)
}

/// Check the structural invariants of the process-wide allocator.
///
/// # Panics
/// Panics if called before [`initialise`], or on any violation.
pub fn validate() {
    ENGINE
        .read()
        .as_ref()
        .expect("validate called before initialise")
        .validate()
}

/// Log the current block list at debug level, one line per block.
///
/// # Panics
/// Panics if called before [`initialise`].
pub fn print_all_nodes() {
    log::debug!(
        "{:?}",
        ENGINE
            .read()
            .as_ref()
            .expect("print_all_nodes called before initialise")
    );
}
