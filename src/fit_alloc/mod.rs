//! Implementation of the fit-policy block-list allocator.
//!
//! The main type is the [`FitAllocator`] which owns a caller-supplied
//! byte region and serves allocations from it according to a
//! [`FitPolicy`] chosen at construction time.
//!
//! ## Wordings
//!
//! In the implementation, some words are used with specific meaning:
//! - **Region**:
//!     The contiguous byte range handed to the allocator at construction.
//!     Everything the allocator manages, including its own bookkeeping,
//!     lives inside it.
//! - **Block**:
//!     A sub-range of the region consisting of a header followed by a
//!     payload. Blocks tile the region without gaps.
//! - **Header**:
//!     The metadata record at the start of every block: neighbor links,
//!     a free flag and the payload size. Headers are never visible to
//!     callers.
//! - **Payload**:
//!     The bytes after a header. This is what allocation hands out.
//! - **Cursor**:
//!     The block the next-fit policy resumes its scan from.
//!
//! # Memory layout
//!
//! The whole region is covered by a doubly-linked list of blocks kept in
//! address order. Initially one free block spans everything:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ header(free, 4064) │ 4064 payload bytes      │
//! └──────────────────────────────────────────────┘
//!  ^                                            ^
//!  └──────────── 4096 bytes total ──────────────┘
//! ```
//!
//! An allocation selects a free block via the configured policy and, if
//! the leftover would still make a useful block, splits it in two:
//!
//! ```text
//! ┌───────────────────────────┬──────────────────┐
//! │ header(used, 128) │ 128 B │ header(free, …)  │
//! └───────────────────────────┴──────────────────┘
//! ```
//!
//! Releasing a block marks it free and immediately fuses it with any
//! free neighbor, so the list never contains two adjacent free blocks.
//!
//! # Example
//!
//! ```rust
//! use fitalloc::{FitAllocator, FitPolicy};
//!
//! let mut region = [0u8; 2048];
//! let heap = FitAllocator::new(&mut region, FitPolicy::default());
//!
//! let a = heap.allocate(64).unwrap();
//! let b = heap.allocate(64).unwrap();
//! unsafe {
//!     heap.deallocate(a.as_mut_ptr());
//!     heap.deallocate(b.as_mut_ptr());
//! }
//! heap.validate();
//! ```
mod allocator;
mod blocks;
mod policy;


pub use allocator::{AllocError, FitAllocator, MIN_REGION_SIZE};
pub use policy::{FitPolicy, ParsePolicyError};
