use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::slice;

use spin::Mutex;
use thiserror_no_std::Error;

use crate::fit_alloc::blocks::{
    align_up, allocate_block, merge_into_prev, merge_with_next, BlockHeader, Link, HEADER_ALIGN,
    HEADER_SIZE,
};
use crate::fit_alloc::policy::FitPolicy;

/// Floor on the usable region size. A region this small is almost
/// certainly a caller bug, so construction rejects it outright.
pub const MIN_REGION_SIZE: usize = 1024;

/// The error returned when an allocation fails.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AllocError {
    #[error("no free block in the region is large enough for the request")]
    InsufficientMemory,
}

/// The internal state of the allocator: the block list anchored at the
/// region base, plus the next-fit resume point.
///
/// Every block header lives inside the managed region; this struct only
/// holds entry points into that memory. It is exclusively accessed
/// through the engine's lock.
pub(super) struct RegionState<'mem> {
    /// First block in address order; its header sits at the (aligned)
    /// region base and never moves.
    pub head: NonNull<BlockHeader>,
    /// Block the next-fit scan resumes from. Unset until the first
    /// next-fit allocation succeeds, and never left pointing at a block
    /// that was absorbed by a merge.
    pub cursor: Link,
    /// Usable region length, captured at construction for validation.
    pub region_bytes: usize,
    pub policy: FitPolicy,
    /// Lifetime brand for the borrowed region.
    _region: PhantomData<&'mem mut [u8]>,
}

// Safety: the raw block pointers all target the exclusively borrowed
// region, and the state is only ever touched under the engine's lock.
unsafe impl Send for RegionState<'_> {}

/// A dynamic allocator over a fixed, caller-supplied byte region.
///
/// One region-wide lock guards every operation, so a shared
/// `FitAllocator` can be used from parallel threads. Payloads handed out
/// are aligned to the header alignment (one machine word group, 8 bytes
/// on 64-bit targets) and are zeroed before being returned.
pub struct FitAllocator<'mem> {
    pub(super) state: Mutex<RegionState<'mem>>,
}

impl<'mem> FitAllocator<'mem> {
    /// Create an allocator that serves allocations from `region` using
    /// the given placement `policy`.
    ///
    /// Unaligned leading bytes of `region` are discarded so that every
    /// block header stays naturally aligned.
    ///
    /// # Panics
    /// Panics if the usable part of `region` is not larger than
    /// [`MIN_REGION_SIZE`].
    pub fn new(region: &'mem mut [u8], policy: FitPolicy) -> Self {
        let start = region.as_mut_ptr() as usize;
        let base = align_up(start, HEADER_ALIGN);
        let usable = region.len().saturating_sub(base - start);
        assert!(
            usable > MIN_REGION_SIZE,
            "backing region is too small to manage"
        );

        // Safety: `base` is in-bounds, aligned, and exclusively ours
        // through the `region` borrow.
        let head = unsafe { BlockHeader::create(NonNull::new_unchecked(base as *mut u8), usable) };

        Self {
            state: Mutex::new(RegionState {
                head,
                cursor: None,
                region_bytes: usable,
                policy,
                _region: PhantomData,
            }),
        }
    }

    /// The placement policy this allocator was constructed with.
    pub fn policy(&self) -> FitPolicy {
        self.state.lock().policy
    }

    /// Allocate `bytes` bytes from the region.
    ///
    /// On success the returned slice has exactly the requested length
    /// and reads all-zero. The block backing it stays reserved until the
    /// slice's pointer is passed to [`deallocate`](Self::deallocate).
    ///
    /// Returns [`AllocError::InsufficientMemory`] when no free block can
    /// hold the request under the configured policy.
    ///
    /// # Panics
    /// Panics if `bytes` is zero.
    pub fn allocate(&self, bytes: usize) -> Result<&'mem mut [u8], AllocError> {
        assert!(bytes > 0, "must allocate at least 1 byte");

        // Keep every header aligned by rounding the carved payload up.
        let rounded = align_up(bytes, HEADER_ALIGN);

        let mut state = self.state.lock();
        let chosen = state
            .find_free_block(rounded)
            .ok_or(AllocError::InsufficientMemory)?;

        unsafe {
            allocate_block(chosen, rounded);

            // Resume the next scan past the block just handed out.
            if state.policy == FitPolicy::NextFit {
                state.cursor = chosen.as_ref().next;
            }

            // Safety: lifting the lifetime to 'mem is okay because the
            // block is now marked used, so no aliasing slice can be
            // produced until this payload is deallocated.
            Ok(slice::from_raw_parts_mut(
                BlockHeader::payload(chosen).as_ptr(),
                bytes,
            ))
        }
    }

    /// Release the allocation starting at `data_ptr`, merging it with
    /// any free neighbor.
    ///
    /// A null pointer is accepted and ignored. Releasing a block that is
    /// already free logs an error and leaves the region untouched.
    ///
    /// # Panics
    /// Panics if `data_ptr` is non-null and does not lie inside the
    /// managed region.
    ///
    /// # Safety
    /// A non-null `data_ptr` must have been returned by
    /// [`allocate`](Self::allocate) on this allocator, and the caller
    /// must not touch the payload afterwards.
    pub unsafe fn deallocate(&self, data_ptr: *mut u8) {
        let mut state = self.state.lock();

        if data_ptr.is_null() {
            return;
        }

        let base = state.head.as_ptr() as usize;
        let addr = data_ptr as usize;
        assert!(
            addr >= base + HEADER_SIZE && addr < base + state.region_bytes,
            "deallocate called with a pointer outside the managed region"
        );

        let mut node = BlockHeader::from_payload(data_ptr);

        if node.as_ref().free {
            log::error!("double release of allocation at {:p}", data_ptr);
            return;
        }

        node.as_mut().free = true;

        if let Some(prev) = node.as_ref().prev {
            if prev.as_ref().free {
                // The merge destroys `node`; don't strand the cursor on it.
                if state.cursor == Some(node) {
                    state.cursor = node.as_ref().next;
                }
                node = merge_into_prev(prev, node);
            }
        }

        if let Some(next) = node.as_ref().next {
            if next.as_ref().free {
                if state.cursor == Some(next) {
                    state.cursor = next.as_ref().next;
                }
                merge_with_next(node, next);
            }
        }
    }

    /// Walk the block list and assert every structural invariant.
    ///
    /// Intended for tests and debug builds; a failure means the engine
    /// itself (or a caller writing out of bounds) corrupted the region.
    pub fn validate(&self) {
        let state = self.state.lock();

        let mut total = 0usize;
        let mut cursor_seen = state.cursor.is_none();
        let mut expected_prev: Link = None;
        let mut current = Some(state.head);

        while let Some(node) = current {
            let block = unsafe { node.as_ref() };

            assert!(block.size > 0, "block has an empty payload");
            assert_eq!(
                block.prev, expected_prev,
                "previous link does not match walk order"
            );

            if let Some(next) = block.next {
                let next_block = unsafe { next.as_ref() };
                assert_eq!(
                    next_block.prev,
                    Some(node),
                    "next block does not link back"
                );
                assert_eq!(
                    node.as_ptr() as usize + HEADER_SIZE + block.size,
                    next.as_ptr() as usize,
                    "blocks do not tile the region"
                );
                assert!(
                    !(block.free && next_block.free),
                    "adjacent free blocks were left uncoalesced"
                );
            }

            if state.cursor == Some(node) {
                cursor_seen = true;
            }

            total += HEADER_SIZE + block.size;
            expected_prev = current;
            current = block.next;
        }

        assert_eq!(
            total, state.region_bytes,
            "blocks do not sum to the region size"
        );
        assert!(cursor_seen, "cursor points at a block not on the list");
    }
}

impl<'mem> RegionState<'mem> {
    fn find_free_block(&self, bytes: usize) -> Option<NonNull<BlockHeader>> {
        match self.policy {
            FitPolicy::FirstFit => self.find_first_fit(bytes),
            FitPolicy::NextFit => self.find_next_fit(bytes),
            FitPolicy::BestFit => self.find_best_fit(bytes),
            FitPolicy::WorstFit => self.find_worst_fit(bytes),
        }
    }

    fn find_first_fit(&self, bytes: usize) -> Option<NonNull<BlockHeader>> {
        let mut current = Some(self.head);

        while let Some(node) = current {
            let block = unsafe { node.as_ref() };
            if block.free && block.size >= bytes {
                return Some(node);
            }
            current = block.next;
        }

        None
    }

    /// First-fit starting from the cursor, wrapping at the end of the
    /// region and stopping once the scan is back where it started.
    fn find_next_fit(&self, bytes: usize) -> Option<NonNull<BlockHeader>> {
        let start = self.cursor.unwrap_or(self.head);
        let mut node = start;

        loop {
            let block = unsafe { node.as_ref() };
            if block.free && block.size >= bytes {
                return Some(node);
            }

            node = match block.next {
                Some(next) => next,
                None => self.head,
            };
            if node == start {
                return None;
            }
        }
    }

    fn find_best_fit(&self, bytes: usize) -> Option<NonNull<BlockHeader>> {
        let mut best: Option<NonNull<BlockHeader>> = None;
        let mut best_size = usize::MAX;
        let mut current = Some(self.head);

        while let Some(node) = current {
            let block = unsafe { node.as_ref() };
            // Strict `<` keeps the earliest block on ties.
            if block.free && block.size >= bytes && block.size < best_size {
                best = Some(node);
                best_size = block.size;
            }
            current = block.next;
        }

        best
    }

    fn find_worst_fit(&self, bytes: usize) -> Option<NonNull<BlockHeader>> {
        let mut worst: Option<NonNull<BlockHeader>> = None;
        let mut worst_size = 0usize;
        let mut current = Some(self.head);

        while let Some(node) = current {
            let block = unsafe { node.as_ref() };
            // Strict `>` keeps the earliest block on ties.
            if block.free && block.size >= bytes && block.size > worst_size {
                worst = Some(node);
                worst_size = block.size;
            }
            current = block.next;
        }

        worst
    }
}

impl fmt::Debug for FitAllocator<'_> {
    /// Renders one line per block, in address order, marking the
    /// next-fit cursor with `<-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();

        writeln!(
            f,
            "FitAllocator {{ policy: {}, region_bytes: {} }}",
            state.policy, state.region_bytes
        )?;

        let mut current = Some(state.head);
        let mut index = 0usize;
        while let Some(node) = current {
            let block = unsafe { node.as_ref() };
            writeln!(
                f,
                "block[{:5}] | address[{:p}] | size[{:9}] | free[{}]{}",
                index,
                node.as_ptr(),
                block.size,
                block.free as u8,
                if state.cursor == Some(node) { " <-" } else { "" }
            )?;
            index += 1;
            current = block.next;
        }

        Ok(())
    }
}
