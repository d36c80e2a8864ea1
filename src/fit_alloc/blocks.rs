use core::mem;
use core::ptr::{self, NonNull};

/// Optional link to a neighboring block header.
pub(super) type Link = Option<NonNull<BlockHeader>>;

/// Bookkeeping overhead at the start of every block.
pub(super) const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Alignment of the header record. Payloads are handed out at this
/// alignment, and request sizes are rounded up to multiples of it so
/// that every header in the region stays aligned.
pub(super) const HEADER_ALIGN: usize = mem::align_of::<BlockHeader>();

/// Smallest payload a split may leave behind. Remainders below this are
/// absorbed into the allocation instead of becoming sliver blocks that
/// can never satisfy a request.
pub(super) const MIN_FREE_BLOCK: usize = 32;

/// The metadata record co-located with every block. The payload sits
/// immediately after it; callers only ever see the payload.
///
/// `prev` and `next` link the blocks in address order, which is also
/// list order: the chain tiles the region without gaps.
#[repr(C)]
pub(super) struct BlockHeader {
    pub prev: Link,
    pub next: Link,
    pub free: bool,
    /// Payload bytes after the header, not counting the header itself.
    pub size: usize,
}

impl BlockHeader {
    /// Write a fresh, unlinked free header at `addr` governing a block
    /// of `total` bytes (header included).
    ///
    /// # Safety
    /// `addr` must be aligned to [`HEADER_ALIGN`] and point at `total`
    /// writable bytes owned by the allocator.
    pub unsafe fn create(addr: NonNull<u8>, total: usize) -> NonNull<BlockHeader> {
        debug_assert!(total > HEADER_SIZE);

        let node = addr.cast::<BlockHeader>();
        node.as_ptr().write(BlockHeader {
            prev: None,
            next: None,
            free: true,
            size: total - HEADER_SIZE,
        });
        node
    }

    /// First payload byte of the block at `node`.
    pub fn payload(node: NonNull<BlockHeader>) -> NonNull<u8> {
        // Safety: the payload starts right after the header, which is
        // always inside the region.
        unsafe { NonNull::new_unchecked(node.as_ptr().cast::<u8>().add(HEADER_SIZE)) }
    }

    /// Recover the header governing `payload`.
    ///
    /// # Safety
    /// `payload` must have been produced by [`BlockHeader::payload`] for
    /// a block that still exists.
    pub unsafe fn from_payload(payload: *mut u8) -> NonNull<BlockHeader> {
        NonNull::new_unchecked(payload.sub(HEADER_SIZE).cast::<BlockHeader>())
    }
}

/// Round `value` up to the next multiple of `align` (a power of two).
pub(super) fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Turn the free block at `node` into an allocation of `bytes` payload
/// bytes and zero its payload.
///
/// If the leftover can hold a header plus [`MIN_FREE_BLOCK`] payload
/// bytes, the block is split and the remainder is linked in as a new
/// free block after `node`; otherwise the whole block is consumed.
///
/// # Safety
/// `node` must be a free block on the list with `size >= bytes`, and
/// `bytes` must be a multiple of [`HEADER_ALIGN`].
pub(super) unsafe fn allocate_block(mut node: NonNull<BlockHeader>, bytes: usize) {
    debug_assert!(node.as_ref().free);
    debug_assert!(node.as_ref().size >= bytes);

    let remaining = node.as_ref().size - bytes;

    if remaining >= HEADER_SIZE + MIN_FREE_BLOCK {
        let tail_addr = NonNull::new_unchecked(BlockHeader::payload(node).as_ptr().add(bytes));
        let mut tail = BlockHeader::create(tail_addr, remaining);

        tail.as_mut().next = node.as_ref().next;
        tail.as_mut().prev = Some(node);
        if let Some(mut after) = node.as_ref().next {
            after.as_mut().prev = Some(tail);
        }

        node.as_mut().next = Some(tail);
        node.as_mut().size = bytes;
    }

    node.as_mut().free = false;
    ptr::write_bytes(BlockHeader::payload(node).as_ptr(), 0, node.as_ref().size);
}

/// Absorb `node` into its free predecessor `prev` and return the merged
/// block. `node` ceases to exist.
///
/// # Safety
/// `prev` must be `node.prev` and free; both must be on the list.
pub(super) unsafe fn merge_into_prev(
    mut prev: NonNull<BlockHeader>,
    node: NonNull<BlockHeader>,
) -> NonNull<BlockHeader> {
    debug_assert!(prev.as_ref().free);
    debug_assert_eq!(node.as_ref().prev, Some(prev));

    prev.as_mut().next = node.as_ref().next;
    prev.as_mut().size += HEADER_SIZE + node.as_ref().size;

    if let Some(mut after) = node.as_ref().next {
        after.as_mut().prev = Some(prev);
    }

    prev
}

/// Absorb the free successor `next` into `node`. `next` ceases to exist.
///
/// # Safety
/// `next` must be `node.next` and free; both must be on the list.
pub(super) unsafe fn merge_with_next(mut node: NonNull<BlockHeader>, next: NonNull<BlockHeader>) {
    debug_assert!(next.as_ref().free);
    debug_assert_eq!(node.as_ref().next, Some(next));

    node.as_mut().size += HEADER_SIZE + next.as_ref().size;
    node.as_mut().next = next.as_ref().next;

    if let Some(mut after) = node.as_ref().next {
        after.as_mut().prev = Some(node);
    }
}
