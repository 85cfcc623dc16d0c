use {
    crate::{
        error::OrHandle,
        polyfill::grown_capacity,
        AllocError, IntoIter, MemoryBlock,
    },
    core::{
        fmt,
        hash::{Hash, Hasher},
        mem,
        ops::{Deref, DerefMut},
        ptr, slice,
    },
};

/// A growable array built on exactly one [`MemoryBlock`].
///
/// Slots `[0, len)` of the block hold live values; slots `[len, capacity)`
/// are uninitialized. Values are only constructed when the length is about to
/// grow, and dropped whenever it shrinks or the array goes away.
///
/// Growth never resizes the block in place. When more room is needed a new
/// block is allocated, the live values are moved across, and the old block is
/// released. Every fallible step (the allocation, and for [`emplace`] the
/// caller's constructor) happens before the first value is moved, so a
/// failure leaves the array as it was.
///
/// Reallocating operations invalidate all outstanding pointers into the
/// array.
///
/// [`emplace`]: DynamicArray::emplace
pub struct DynamicArray<T> {
    block: MemoryBlock<T>,
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Create an empty array. Does not allocate.
    pub const fn new() -> Self {
        Self {
            block: MemoryBlock::new(),
            len: 0,
        }
    }

    /// Create an array of `len` default values, with capacity exactly `len`.
    pub fn with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let mut array = Self {
            block: MemoryBlock::allocate(len)?,
            len: 0,
        };
        array.fill_with(len, |_| T::default());
        Ok(array)
    }

    /// Create an array holding `len` clones of `value`.
    ///
    /// Used by `dynamic_array![value; len]`; diverges on allocation failure.
    pub fn from_elem(value: T, len: usize) -> Self
    where
        T: Clone,
    {
        let mut array = Self {
            block: MemoryBlock::allocate(len).or_handle(),
            len: 0,
        };
        array.fill_with(len, |_| value.clone());
        array
    }

    /// Copy-construct a new array. Its capacity is exactly `self.len()`.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut copy = Self {
            block: MemoryBlock::allocate(self.len)?,
            len: 0,
        };
        copy.fill_with(self.len, |i| self[i].clone());
        Ok(copy)
    }

    /// Copy-assign `source` into this array.
    ///
    /// If `source` does not fit in the current capacity, a full copy is built
    /// first and then swapped in, so any failure leaves `self` untouched.
    /// Otherwise the existing storage is reused: the common prefix is updated
    /// with [`Clone::clone_from`], then excess values are dropped or missing
    /// ones cloned in.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError>
    where
        T: Clone,
    {
        if source.len > self.capacity() {
            let mut copy = source.try_clone()?;
            self.swap(&mut copy);
            return Ok(());
        }

        let common = self.len.min(source.len);
        for (dst, src) in self[..common].iter_mut().zip(&source[..common]) {
            dst.clone_from(src);
        }
        if self.len > source.len {
            self.truncate(source.len);
        } else {
            let start = self.len;
            self.fill_with(source.len - start, |i| source[start + i].clone());
        }
        Ok(())
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the owned block.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        self
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Get a pointer valid *for reads only* to the first value.
    ///
    /// The pointer is invalidated when the array reallocates.
    pub fn as_ptr(&self) -> *const T {
        self.block.as_ptr()
    }

    /// Get a pointer valid for reads and writes to the first value.
    ///
    /// The pointer is invalidated when the array reallocates.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.block.as_mut_ptr()
    }

    /// Ensure room for at least `new_capacity` values.
    ///
    /// Does nothing if the capacity is already large enough. Otherwise
    /// allocates a block of exactly `new_capacity` slots and moves every live
    /// value into it. Does not do amortization.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        let mut new_block: MemoryBlock<T> = MemoryBlock::allocate(new_capacity)?;
        // SAFETY: new_block has room for len values and does not overlap ours
        unsafe { ptr::copy_nonoverlapping(self.block.as_ptr(), new_block.as_mut_ptr(), self.len) };
        log::trace!(
            "relocated {} values from {} to {} slots",
            self.len,
            self.capacity(),
            new_capacity,
        );
        // the old block now holds only moved-out slots and is freed as is
        self.block.swap(&mut new_block);
        Ok(())
    }

    /// Change the length to `new_len`, dropping values off the end or
    /// appending default values as needed.
    ///
    /// Growing reserves exactly `new_len` slots.
    pub fn resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        if new_len <= self.len {
            self.truncate(new_len);
        } else {
            self.reserve(new_len)?;
            self.fill_with(new_len - self.len, |_| T::default());
        }
        Ok(())
    }

    /// Drop every value from `new_len` onward. Never reallocates.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        // SAFETY: [new_len, len) are live, and we forget them before dropping
        // so a panicking destructor cannot lead to a double drop
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.block.slot(new_len), self.len - new_len);
            self.len = new_len;
            ptr::drop_in_place(tail);
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0)
    }

    /// Append `value`, returning a reference to it in its new home.
    pub fn push_back(&mut self, value: T) -> Result<&mut T, AllocError> {
        self.emplace(self.len, || value)
    }

    /// Append the value produced by `make`, returning a reference to it.
    ///
    /// `make` is called after any needed allocation has succeeded.
    pub fn emplace_back(&mut self, make: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        self.emplace(self.len, make)
    }

    /// Insert `value` at `index`, shifting everything after it one slot
    /// toward the end.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, AllocError> {
        self.emplace(index, || value)
    }

    /// Insert the value produced by `make` at `index`, shifting everything
    /// after it one slot toward the end.
    ///
    /// If the array is full, a block of twice the length (or one slot, if
    /// empty) is allocated, the new value is constructed directly in its slot
    /// there, and the old values are moved around it. Otherwise the new value
    /// is constructed first and then the tail is shifted in place.
    ///
    /// If `make` panics, the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace(
        &mut self,
        index: usize,
        make: impl FnOnce() -> T,
    ) -> Result<&mut T, AllocError> {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len,
        );

        if self.len == self.capacity() {
            self.emplace_with_relocation(index, make)?;
        } else {
            self.emplace_in_place(index, make);
        }
        // SAFETY: index < len and the slot was just written
        Ok(unsafe { &mut *self.block.slot(index) })
    }

    fn emplace_with_relocation(
        &mut self,
        index: usize,
        make: impl FnOnce() -> T,
    ) -> Result<(), AllocError> {
        let mut new_block: MemoryBlock<T> = MemoryBlock::allocate(grown_capacity(self.len)?)?;
        // SAFETY: new_block has len + 1 slots, so index and the shifted
        // suffix fit; old and new blocks never overlap
        unsafe {
            new_block.slot(index).write(make());
            let old = self.block.as_ptr();
            ptr::copy_nonoverlapping(old, new_block.as_mut_ptr(), index);
            ptr::copy_nonoverlapping(
                old.add(index),
                new_block.slot(index + 1),
                self.len - index,
            );
        }
        log::trace!(
            "relocated {} values from {} to {} slots",
            self.len,
            self.capacity(),
            new_block.capacity(),
        );
        self.block.swap(&mut new_block);
        self.len += 1;
        Ok(())
    }

    fn emplace_in_place(&mut self, index: usize, make: impl FnOnce() -> T) {
        let value = make();
        // SAFETY: len < capacity, so the tail has a free slot to shift into
        unsafe {
            let slot = self.block.slot(index);
            if index < self.len {
                ptr::copy(slot, slot.add(1), self.len - index);
            }
            slot.write(value);
        }
        self.len += 1;
    }

    /// Remove the value at `index`, dropping it, and shift the tail one slot
    /// toward the front.
    ///
    /// Returns the index of the value that now occupies the erased slot,
    /// which is `len()` if the last value was erased.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Remove and return the value at `index`, shifting the tail one slot
    /// toward the front.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {})",
            self.len,
        );
        // SAFETY: index is live; after the shift [0, len - 1) are live
        unsafe {
            let slot = self.block.slot(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Remove the last value, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: the slot at the old len - 1 is live and now forgotten
            Some(unsafe { self.block.slot(self.len).read() })
        }
    }

    /// Exchange contents with `other`. No value is moved or dropped.
    pub fn swap(&mut self, other: &mut Self) {
        self.block.swap(&mut other.block);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Append `values` cloned, reserving exactly the room needed.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let needed = self
            .len
            .checked_add(values.len())
            .ok_or(AllocError::CapacityOverflow)?;
        self.reserve(needed)?;
        self.fill_with(values.len(), |i| values[i].clone());
        Ok(())
    }

    pub(crate) fn into_raw_parts(mut self) -> (MemoryBlock<T>, usize) {
        let len = mem::replace(&mut self.len, 0);
        (self.block.take(), len)
    }

    /// Construct `count` values at the end with `make(i)`.
    ///
    /// The room must already be reserved. If `make` panics, the values built
    /// so far are dropped and `len` is left as it was.
    fn fill_with(&mut self, count: usize, mut make: impl FnMut(usize) -> T) {
        debug_assert!(count <= self.capacity() - self.len);

        struct Fill<'a, T> {
            base: *mut T,
            len: &'a mut usize,
            filled: usize,
        }

        impl<T> Drop for Fill<'_, T> {
            fn drop(&mut self) {
                // SAFETY: exactly `filled` values were written from base
                unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.filled)) }
            }
        }

        let mut fill = Fill {
            // SAFETY: len <= capacity
            base: unsafe { self.block.slot(self.len) },
            len: &mut self.len,
            filled: 0,
        };
        while fill.filled < count {
            let value = make(fill.filled);
            // SAFETY: filled < count, and count slots past len are reserved
            unsafe { fill.base.add(fill.filled).write(value) };
            fill.filled += 1;
        }
        *fill.len += count;
        mem::forget(fill);
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: [0, len) are live; the block frees itself afterwards
        unsafe {
            let live = ptr::slice_from_raw_parts_mut(self.block.as_mut_ptr(), self.len);
            ptr::drop_in_place(live);
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        self.try_clone().or_handle()
    }

    fn clone_from(&mut self, source: &Self) {
        self.try_clone_from(source).or_handle()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: [0, len) are live and the pointer is aligned and non-null
        unsafe { slice::from_raw_parts(self.block.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as above, and we hold the only borrow
        unsafe { slice::from_raw_parts_mut(self.block.as_mut_ptr(), self.len) }
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq<U>, U> PartialEq<DynamicArray<U>> for DynamicArray<T> {
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self[..] == other[..]
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for DynamicArray<T> {
    fn eq(&self, other: &[U]) -> bool {
        self[..] == *other
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self[..] == other[..]
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self[..].hash(state)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self {
            block: MemoryBlock::allocate(N).or_handle(),
            len: 0,
        };
        for value in values {
            // SAFETY: exactly N slots were allocated
            unsafe { array.block.slot(array.len).write(value) };
            array.len += 1;
        }
        array
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > self.capacity() - self.len {
            let needed = self.len.checked_add(lower).ok_or(AllocError::CapacityOverflow);
            needed.and_then(|needed| self.reserve(needed)).or_handle();
        }
        for value in iter {
            self.push_back(value).or_handle();
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (block, len) = self.into_raw_parts();
        // SAFETY: exactly [0, len) of block are live
        unsafe { IntoIter::new(block, len) }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Create a [`DynamicArray`] from a list of values, or from a value and a
/// count, like `vec!`.
///
/// Diverges on allocation failure.
#[macro_export]
macro_rules! dynamic_array {
    () => {
        $crate::DynamicArray::new()
    };
    ($value:expr; $len:expr) => {
        $crate::DynamicArray::from_elem($value, $len)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($value),+])
    };
}
