//! Heap allocation (`ns_malloc` / `ns_free`)
//!
//! Forwards to the global allocator: the host allocator under `std`, or
//! whatever `#[global_allocator]` the target binary installs. A block is an
//! owning handle, so freeing consumes it and a second free cannot be written.
//!
//! Blocks are zero-filled so their contents can be handed out as safe slices.
//! Zero-sized requests never reach the allocator; they yield an empty block
//! with a dangling, well-aligned pointer.

#![allow(unsafe_code)]

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::fmt;
use core::ptr::NonNull;
use core::slice;

use crate::config::HEAP_ALIGN;

/// Owned heap block returned by [`allocate`]
pub struct HeapBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The block exclusively owns its memory, like a `Box<[u8]>`.
unsafe impl Send for HeapBlock {}
unsafe impl Sync for HeapBlock {}

impl HeapBlock {
    /// Size of the block in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.layout.size()
    }

    /// Check if the block is zero-sized
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// Alignment of the block
    #[must_use]
    pub const fn align(&self) -> usize {
        self.layout.align()
    }

    /// Raw pointer to the start of the block
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Mutable raw pointer to the start of the block
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// View the block as bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for len initialized bytes (zero-filled, or len == 0
        // with a dangling aligned pointer).
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    /// View the block as mutable bytes
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: non-empty blocks were allocated with exactly this layout.
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

impl fmt::Debug for HeapBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBlock")
            .field("ptr", &self.ptr)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for HeapBlock {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "HeapBlock({} bytes)", self.len());
    }
}

/// Allocate `size` bytes from the global allocator
///
/// Returns `None` when the allocator is exhausted or the size cannot be
/// represented as a layout.
#[must_use]
pub fn allocate(size: usize) -> Option<HeapBlock> {
    let layout = Layout::from_size_align(size, HEAP_ALIGN).ok()?;

    if size == 0 {
        let ptr = NonNull::<u128>::dangling().cast::<u8>();
        return Some(HeapBlock { ptr, layout });
    }

    // SAFETY: layout has a non-zero size.
    let raw = unsafe { alloc_zeroed(layout) };
    match NonNull::new(raw) {
        Some(ptr) => Some(HeapBlock { ptr, layout }),
        None => {
            warn!("heap: allocation of {} bytes failed", size);
            None
        }
    }
}

/// Return a block to the global allocator
pub fn free(block: HeapBlock) {
    drop(block);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_block_is_aligned() {
        let block = allocate(0).unwrap();
        assert!(block.is_empty());
        assert_eq!(block.as_ptr() as usize % HEAP_ALIGN, 0);
        free(block);
    }

    #[test]
    fn oversized_request_fails() {
        assert!(allocate(usize::MAX).is_none());
        assert!(allocate(isize::MAX as usize).is_none());
    }
}
