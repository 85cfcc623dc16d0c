use core::{alloc::Layout, fmt};

/// Failure to obtain raw storage for a [`MemoryBlock`].
///
/// Element types report their own failures by panicking; this is the only
/// error the container itself produces.
///
/// [`MemoryBlock`]: crate::MemoryBlock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested slot count does not fit in a valid [`Layout`], or a
    /// growth computation overflowed `usize`.
    CapacityOverflow,
    /// The global allocator returned null.
    Allocator {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}

impl AllocError {
    /// Diverge on an allocation failure, the way infallible std collections
    /// do. Used by the trait impls that have no way to return a `Result`.
    #[cold]
    pub fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::Allocator { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::Allocator { layout } => write!(
                f,
                "memory allocation of {} bytes (align {}) failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl core::error::Error for AllocError {}

pub(crate) trait OrHandle<T> {
    fn or_handle(self) -> T;
}

impl<T> OrHandle<T> for Result<T, AllocError> {
    #[inline]
    fn or_handle(self) -> T {
        match self {
            Ok(it) => it,
            Err(err) => err.handle(),
        }
    }
}
