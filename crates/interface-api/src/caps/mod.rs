//! Standard capability interfaces, defined through the protocol itself.
//!
//! Programs written against these descriptors pick a concrete implementation
//! per build (or per call site) without touching the call sites: a
//! single-threaded build wires [`mutex::NullLockFactory`], a hosted build
//! wires [`alloc::SystemAllocator`], and so on. Both report binary status
//! only - richer error payloads are the caller's business.

pub mod alloc;
pub mod mutex;
