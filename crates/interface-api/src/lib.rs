//! A compile-time object protocol for Rust
//!
//! Interfaces are descriptors: a named method set plus a typed property set.
//! Each implementation of an interface gets one static, immutable dispatch
//! table; instances carry a header (table reference + properties) embedded as
//! a leading member of the concrete object. Everything is resolved at build
//! time - no registry, no reflection, no by-name lookup.
//!
//! This crate provides two approaches for defining interfaces:
//!
//! ## Declarative macros (`decl` module)
//! ```ignore
//! use interface_api::{define_class, define_interface};
//!
//! define_interface! {
//!     interface Animal {
//!         properties {
//!             mass: f64 = 0.0,
//!         }
//!         fn speak(&self) -> &'static str;
//!     }
//! }
//!
//! define_class! {
//!     pub class Cat : Animal {
//!         pub food_eaten_today: u64,
//!     }
//! }
//! ```
//!
//! ## Proc-macros (`proc` module)
//! ```ignore
//! use interface_api::proc::{implement, interface};
//!
//! #[interface(properties(mass: f64 = 0.0))]
//! pub trait Animal {
//!     fn speak(&self) -> &'static str;
//! }
//!
//! #[repr(C)]
//! pub struct Cat {
//!     header_animal: Animal,
//!     food_eaten_today: u64,
//! }
//!
//! #[implement(Animal)]
//! impl Cat {
//!     fn speak(&self) -> &'static str { "Mrow!?!?!?!?!" }
//! }
//! ```
//!
//! Casting lives in the [`cast`] module: up-casts borrow the embedded header,
//! down-casts subtract the header offset back off, and implementation
//! identity is dispatch-table address equality ([`is_instance`]).
//!
//! The [`caps`] module defines the standard capability interfaces (mutexes,
//! allocators) through the protocol itself.

pub mod caps;
pub mod cast;
pub mod decl;

/// Proc-macro approach - re-exports from interface-api-macro crate
pub mod proc {
    pub use interface_api_macro::{implement, interface};
}

pub use cast::{
    Implements, Interface, downcast_mut, downcast_mut_unchecked, downcast_ref,
    downcast_ref_unchecked, is_instance,
};

// Re-export paste for use by declarative macros
#[doc(hidden)]
pub use paste::paste;
