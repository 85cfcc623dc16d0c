use {crate::AllocError, core::alloc::Layout};

// `Layout::array` already rejects sizes past `isize::MAX`; we only need to
// fold its error into ours.
pub(crate) fn layout_for_slots<T>(capacity: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)
}

/// Capacity used by the relocating emplace: double, starting from one slot.
pub(crate) fn grown_capacity(len: usize) -> Result<usize, AllocError> {
    if len == 0 {
        Ok(1)
    } else {
        len.checked_mul(2).ok_or(AllocError::CapacityOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_starts_at_one_and_doubles() {
        assert_eq!(grown_capacity(0), Ok(1));
        assert_eq!(grown_capacity(1), Ok(2));
        assert_eq!(grown_capacity(6), Ok(12));
    }

    #[test]
    fn growth_overflow_is_an_error() {
        assert_eq!(grown_capacity(usize::MAX / 2), Ok(usize::MAX - 1));
        assert_eq!(
            grown_capacity(usize::MAX / 2 + 1),
            Err(AllocError::CapacityOverflow)
        );
    }

    #[test]
    fn slot_layout_overflow_is_an_error() {
        assert_eq!(
            layout_for_slots::<u64>(usize::MAX),
            Err(AllocError::CapacityOverflow)
        );
        assert_eq!(layout_for_slots::<u64>(3).map(|it| it.size()), Ok(24));
    }
}
