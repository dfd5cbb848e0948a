//! Memory-allocation capability.
//!
//! `Allocator` hands out raw byte buffers through out-pointer slots. Every
//! call carries a [`CallTrace`] tag naming the call site, so an instrumented
//! implementation can attribute traffic without any global state.

use std::alloc::{self, Layout};

use crate::proc::{implement, interface};

/// Outcome of an allocator operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocStatus {
    Success,
    Failure,
}

/// Call-site tag threaded through every allocator call.
pub type CallTrace = &'static str;

/// Hands out and reclaims raw byte buffers.
#[interface(internal, properties(name: &'static str = ""))]
pub trait Allocator {
    /// Allocate `size` bytes and store the buffer pointer through `slot`.
    fn allocate(&mut self, slot: *mut *mut u8, size: usize, trace: CallTrace) -> AllocStatus;
    /// Reclaim a buffer previously produced by `allocate`; nulls `slot`.
    fn free(&mut self, slot: *mut *mut u8, trace: CallTrace) -> AllocStatus;
}

/// Buffer size is stashed in a prefix word so `free` can rebuild the layout.
const PREFIX: usize = size_of::<usize>();

/// [`Allocator`] backed by the global allocator.
#[repr(C)]
pub struct SystemAllocator {
    pub header_allocator: Allocator,
}

#[implement(Allocator, internal)]
impl SystemAllocator {
    fn allocate(&mut self, slot: *mut *mut u8, size: usize, _trace: CallTrace) -> AllocStatus {
        if slot.is_null() || size == 0 {
            return AllocStatus::Failure;
        }
        let Some(total) = size.checked_add(PREFIX) else {
            return AllocStatus::Failure;
        };
        let Ok(layout) = Layout::from_size_align(total, align_of::<usize>()) else {
            return AllocStatus::Failure;
        };
        unsafe {
            let base = alloc::alloc(layout);
            if base.is_null() {
                *slot = ::core::ptr::null_mut();
                return AllocStatus::Failure;
            }
            (base as *mut usize).write(size);
            *slot = base.add(PREFIX);
        }
        AllocStatus::Success
    }

    fn free(&mut self, slot: *mut *mut u8, _trace: CallTrace) -> AllocStatus {
        unsafe {
            if slot.is_null() || (*slot).is_null() {
                return AllocStatus::Failure;
            }
            let base = (*slot).sub(PREFIX);
            let size = (base as *const usize).read();
            let Ok(layout) = Layout::from_size_align(PREFIX + size, align_of::<usize>()) else {
                return AllocStatus::Failure;
            };
            alloc::dealloc(base, layout);
            *slot = ::core::ptr::null_mut();
        }
        AllocStatus::Success
    }
}

impl SystemAllocator {
    pub fn new() -> Self {
        let mut header = Allocator::new_as::<SystemAllocator>();
        header.name = "system";
        SystemAllocator {
            header_allocator: header,
        }
    }
}

impl Default for SystemAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Implements;

    #[test]
    fn allocate_write_free() {
        let mut allocator = SystemAllocator::new();
        assert_eq!(allocator.header_allocator.name, "system");

        let mut slot: *mut u8 = ::core::ptr::null_mut();
        unsafe {
            let view = allocator.as_interface_mut();
            assert_eq!(
                view.allocate(&raw mut slot, 64, "allocate_write_free"),
                AllocStatus::Success,
            );
            assert!(!slot.is_null());

            slot.write_bytes(0xAB, 64);
            assert_eq!(slot.read(), 0xAB);

            let view = allocator.as_interface_mut();
            assert_eq!(
                view.free(&raw mut slot, "allocate_write_free"),
                AllocStatus::Success,
            );
            assert!(slot.is_null());
        }
    }

    #[test]
    fn zero_size_is_a_failure() {
        let mut allocator = SystemAllocator::new();
        let mut slot: *mut u8 = ::core::ptr::null_mut();
        unsafe {
            let view = allocator.as_interface_mut();
            assert_eq!(
                view.allocate(&raw mut slot, 0, "zero_size"),
                AllocStatus::Failure,
            );
        }
        assert!(slot.is_null());
    }

    #[test]
    fn null_slots_are_failures() {
        let mut allocator = SystemAllocator::new();
        unsafe {
            let view = allocator.as_interface_mut();
            assert_eq!(
                view.allocate(::core::ptr::null_mut(), 16, "null_slot"),
                AllocStatus::Failure,
            );

            let mut empty: *mut u8 = ::core::ptr::null_mut();
            let view = allocator.as_interface_mut();
            assert_eq!(view.free(&raw mut empty, "null_slot"), AllocStatus::Failure);
        }
    }
}
