//! A growable array that keeps raw storage and value lifetimes apart.
//!
//! Two layers:
//!
//! - [`MemoryBlock`]: one owned, uninitialized allocation of `capacity`
//!   slots. It allocates and frees bytes, and nothing else.
//! - [`DynamicArray`]: owns exactly one block plus a count of live values,
//!   and does all constructing, moving, and dropping of values itself.
//!
//! Allocation failure is reported as [`AllocError`] by every operation that
//! may allocate; the trait impls that cannot return a `Result` (`Clone`,
//! `Extend`, `FromIterator`, [`dynamic_array!`]) diverge instead.
//!
//! ```
//! use storage_vec::{dynamic_array, DynamicArray};
//!
//! let mut array: DynamicArray<i32> = dynamic_array![1, 2, 3];
//! array.insert(1, 99)?;
//! assert_eq!(array, [1, 99, 2, 3]);
//! array.erase(0);
//! array.pop_back();
//! assert_eq!(array, [99, 2]);
//! # Ok::<(), storage_vec::AllocError>(())
//! ```

#![no_std]

extern crate alloc;

mod dynamic_array;
mod error;
mod into_iter;
mod memory_block;
mod polyfill;

#[doc(inline)]
pub use crate::{
    dynamic_array::DynamicArray, error::AllocError, into_iter::IntoIter,
    memory_block::MemoryBlock,
};
