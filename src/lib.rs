//! A dynamic memory allocator that manages a fixed, caller-supplied byte
//! region instead of asking the operating system for memory.
//!
//! The region is carved into blocks on demand and recycled on release,
//! with adjacent free blocks coalesced immediately. Which free block
//! serves a request is decided by a selectable placement policy
//! ([`FitPolicy`]): first-fit, next-fit, best-fit or worst-fit. All
//! bookkeeping lives inside the managed region itself; the allocator
//! performs no hidden allocations of its own.
//!
//! The main type is [`FitAllocator`], you can follow the codebase from
//! there. A process-wide init-before-use surface is available in
//! [`global`].
//!
//! # Example
//!
//! ```rust
//! use fitalloc::{FitAllocator, FitPolicy};
//!
//! let mut region = [0u8; 4096];
//! let heap = FitAllocator::new(&mut region, FitPolicy::BestFit);
//!
//! let payload = heap.allocate(128).unwrap();
//! assert!(payload.iter().all(|&b| b == 0));
//!
//! unsafe { heap.deallocate(payload.as_mut_ptr()) };
//! heap.validate();
//! ```
#![no_std]

mod fit_alloc;
pub mod global;

pub use fit_alloc::{AllocError, FitAllocator, FitPolicy, ParsePolicyError, MIN_REGION_SIZE};
