use {
    crate::{polyfill::layout_for_slots, AllocError},
    alloc::alloc::{alloc, dealloc},
    core::{fmt, marker::PhantomData, mem, ptr::NonNull},
};

/// An owned raw allocation with room for `capacity` values of `T`.
///
/// This is the raw (uninit payload) layer underneath [`DynamicArray`]. The
/// block only allocates and frees bytes: it never constructs, reads, or drops
/// a `T`. Whoever writes values into the slots is responsible for dropping
/// them before the block goes away.
///
/// A capacity of zero never allocates, nor does any capacity for a zero-sized
/// `T`. Blocks cannot be cloned; moving one transfers the allocation.
///
/// [`DynamicArray`]: crate::DynamicArray
pub struct MemoryBlock<T> {
    buffer: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: the block uniquely owns its slots, like a `Box<[T]>`
unsafe impl<T: Send> Send for MemoryBlock<T> {}
unsafe impl<T: Sync> Sync for MemoryBlock<T> {}

impl<T> MemoryBlock<T> {
    /// Create the empty block. Does not allocate.
    pub const fn new() -> Self {
        Self {
            buffer: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate an uninitialized block with room for exactly `capacity`
    /// values.
    pub fn allocate(capacity: usize) -> Result<Self, AllocError> {
        let layout = layout_for_slots::<T>(capacity)?;
        if layout.size() == 0 {
            return Ok(Self {
                capacity,
                ..Self::new()
            });
        }

        // SAFETY: layout has nonzero size
        let buffer = NonNull::new(unsafe { alloc(layout) })
            .ok_or(AllocError::Allocator { layout })?
            .cast();
        log::trace!(
            "allocated block of {capacity} slots ({} bytes)",
            layout.size()
        );

        Ok(Self {
            buffer,
            capacity,
            _owns: PhantomData,
        })
    }

    /// Free the allocation now, leaving the empty block behind.
    ///
    /// Any values still living in the slots are leaked, not dropped. Calling
    /// this on the empty block does nothing.
    pub fn deallocate(&mut self) {
        match layout_for_slots::<T>(self.capacity) {
            Ok(layout) if layout.size() != 0 => {
                // SAFETY: we allocated buffer with exactly this layout
                unsafe { dealloc(self.buffer.as_ptr().cast(), layout) };
                log::trace!("released block of {} slots", self.capacity);
            }
            _ => {}
        }
        self.buffer = NonNull::dangling();
        self.capacity = 0;
    }

    /// Number of slots in the block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the address of the slot at `offset`.
    ///
    /// `offset == capacity` is allowed and yields the one-past-the-end
    /// address, which must not be read or written.
    ///
    /// # Safety
    ///
    /// - `offset <= self.capacity()`. This is only checked in debug builds.
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "slot offset {offset} out of bounds for block of {} slots",
            self.capacity,
        );
        unsafe { self.buffer.as_ptr().add(offset) }
    }

    /// Get a pointer valid *for reads only* to the first slot.
    ///
    /// The pointer is dangling (but aligned) for the empty block.
    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    /// Get a pointer valid for reads and writes to the first slot.
    ///
    /// The pointer is dangling (but aligned) for the empty block.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_ptr()
    }

    /// Exchange allocations with `other`. Slot contents are not touched.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other)
    }

    /// Move the allocation out, leaving the empty block behind.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }
}

impl<T> Default for MemoryBlock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MemoryBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("buffer", &self.buffer)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Drop for MemoryBlock<T> {
    fn drop(&mut self) {
        self.deallocate()
    }
}
