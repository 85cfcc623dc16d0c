use {
    crate::MemoryBlock,
    core::{fmt, iter::FusedIterator, ptr, slice},
};

/// An owning iterator over the values of a [`DynamicArray`].
///
/// Values not yet yielded are dropped along with the iterator.
///
/// [`DynamicArray`]: crate::DynamicArray
pub struct IntoIter<T> {
    block: MemoryBlock<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// # Safety
    ///
    /// - Slots `[0, len)` of `block` must hold live values, and nothing else
    ///   may drop them.
    pub(crate) unsafe fn new(block: MemoryBlock<T>, len: usize) -> Self {
        Self {
            block,
            start: 0,
            end: len,
        }
    }

    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [start, end) are live
        unsafe { slice::from_raw_parts(self.block.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: start is live; bumping it forgets the slot
        let value = unsafe { self.block.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the old end - 1 is live and now forgotten
        Some(unsafe { self.block.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: [start, end) are live; the block frees itself afterwards
        unsafe {
            let rest =
                ptr::slice_from_raw_parts_mut(self.block.slot(self.start), self.end - self.start);
            self.start = self.end;
            ptr::drop_in_place(rest);
        }
    }
}
