//! Mutual-exclusion capability.
//!
//! `Mutex` is the lock itself; `MutexFactory` creates and removes locks and
//! stamps each lock's `factory` property with its own header so a lock can be
//! returned to the factory that made it.

use crate::proc::{implement, interface};

/// Outcome of a mutex operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutexStatus {
    Success,
    Failure,
}

/// A mutual-exclusion lock.
#[interface(internal, properties(factory: *mut MutexFactory = ::core::ptr::null_mut()))]
pub trait Mutex {
    /// Block until the lock is held.
    fn acquire(&mut self) -> MutexStatus;
    /// Release a held lock.
    fn release(&mut self) -> MutexStatus;
}

/// Creates and removes [`Mutex`] instances.
#[interface(internal, properties(name: &'static str = ""))]
pub trait MutexFactory {
    /// Create a lock and store its header pointer through `slot`.
    fn create(&mut self, slot: *mut *mut Mutex) -> MutexStatus;
    /// Remove a lock previously created by this factory; nulls `slot`.
    fn remove(&mut self, slot: *mut *mut Mutex) -> MutexStatus;
}

/// Lock for single-threaded builds: every operation succeeds and guards
/// nothing.
#[repr(C)]
pub struct NullLock {
    pub header_mutex: Mutex,
}

#[implement(Mutex, internal)]
impl NullLock {
    fn acquire(&mut self) -> MutexStatus {
        MutexStatus::Success
    }

    fn release(&mut self) -> MutexStatus {
        MutexStatus::Success
    }
}

impl NullLock {
    pub fn new() -> Self {
        NullLock {
            header_mutex: Mutex::new_as::<NullLock>(),
        }
    }
}

impl Default for NullLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory producing [`NullLock`]s on the heap.
#[repr(C)]
pub struct NullLockFactory {
    pub header_mutex_factory: MutexFactory,
}

#[implement(MutexFactory, internal)]
impl NullLockFactory {
    fn create(&mut self, slot: *mut *mut Mutex) -> MutexStatus {
        if slot.is_null() {
            return MutexStatus::Failure;
        }
        let mut lock = Box::new(NullLock::new());
        lock.header_mutex.factory = &raw mut self.header_mutex_factory;
        unsafe {
            *slot = &raw mut Box::leak(lock).header_mutex;
        }
        MutexStatus::Success
    }

    fn remove(&mut self, slot: *mut *mut Mutex) -> MutexStatus {
        unsafe {
            if slot.is_null() || (*slot).is_null() {
                return MutexStatus::Failure;
            }
            let header = &mut **slot;
            let Some(lock) = crate::downcast_mut::<Mutex, NullLock>(header) else {
                return MutexStatus::Failure;
            };
            drop(Box::from_raw(lock as *mut NullLock));
            *slot = ::core::ptr::null_mut();
        }
        MutexStatus::Success
    }
}

impl NullLockFactory {
    pub fn new() -> Self {
        let mut header = MutexFactory::new_as::<NullLockFactory>();
        header.name = "null-lock";
        NullLockFactory {
            header_mutex_factory: header,
        }
    }
}

impl Default for NullLockFactory {
    fn default() -> Self {
        Self::new()
    }
}
