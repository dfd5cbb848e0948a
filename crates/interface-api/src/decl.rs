//! Declarative macros for the object protocol.
//!
//! These macros provide a more concise syntax that delegates to the
//! proc-macros for actual code generation. This ensures a single
//! implementation while offering a nicer API for common cases.
//!
//! # Features
//! - `define_interface!` - interface descriptors (delegates to `#[interface]`)
//! - `define_class!` - concrete objects with embedded headers and cast helpers
//!
//! # Example
//! ```ignore
//! define_interface! {
//!     interface Animal {
//!         properties {
//!             mass: f64 = 0.0,
//!         }
//!         fn speak(&self) -> &'static str;
//!         fn fiscal_burden(&self) -> u64;
//!     }
//! }
//!
//! define_class! {
//!     pub class Cat : Animal {
//!         pub food_eaten_today: u64,
//!     }
//! }
//! ```

/// Define an interface: a method set plus an optional property set.
///
/// This macro expands to `#[interface] pub trait ...` and lets the proc-macro
/// handle all code generation.
///
/// # Syntax
/// ```ignore
/// define_interface! {
///     interface Counter {
///         properties {
///             counter: u64 = 0,
///         }
///         fn increment(&mut self) -> u64;
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_interface {
    // Entry point - parse multiple interfaces
    (
        $(
            $(#[$meta:meta])*
            interface $name:ident {
                $($body:tt)*
            }
        )*
    ) => {
        $(
            $crate::define_interface!(@single
                $(#[$meta])*
                interface $name { $($body)* }
            );
        )*
    };

    // Single interface with a leading properties block
    (@single
        $(#[$meta:meta])*
        interface $name:ident {
            properties {
                $($props:tt)*
            }
            $($body:tt)*
        }
    ) => {
        $crate::define_interface!(@collect $name, [$(#[$meta])*], [$($props)*], { $($body)* }, []);
    };

    // Single interface without properties
    (@single
        $(#[$meta:meta])*
        interface $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::define_interface!(@collect $name, [$(#[$meta])*], [], { $($body)* }, []);
    };

    // Collect: &self method
    (@collect $name:ident, [$($meta:tt)*], [$($props:tt)*], {
        $(#[$method_meta:meta])*
        fn $method:ident (&self $(, $pname:ident : $pty:ty)*) $(-> $ret:ty)?;
        $($rest:tt)*
    }, [$($collected:tt)*]) => {
        $crate::define_interface!(@collect $name, [$($meta)*], [$($props)*], { $($rest)* }, [
            $($collected)*
            { $(#[$method_meta])* fn $method(&self $(, $pname: $pty)*) $(-> $ret)?; }
        ]);
    };

    // Collect: &mut self method
    (@collect $name:ident, [$($meta:tt)*], [$($props:tt)*], {
        $(#[$method_meta:meta])*
        fn $method:ident (&mut self $(, $pname:ident : $pty:ty)*) $(-> $ret:ty)?;
        $($rest:tt)*
    }, [$($collected:tt)*]) => {
        $crate::define_interface!(@collect $name, [$($meta)*], [$($props)*], { $($rest)* }, [
            $($collected)*
            { $(#[$method_meta])* fn $method(&mut self $(, $pname: $pty)*) $(-> $ret)?; }
        ]);
    };

    // Terminal: emit the trait (with properties)
    (@collect $name:ident, [$($meta:tt)*], [$($props:tt)+], {}, [$({ $($method:tt)* })*]) => {
        $($meta)*
        #[$crate::proc::interface(properties($($props)+))]
        pub trait $name {
            $($($method)*)*
        }
    };

    // Terminal: emit the trait (no properties)
    (@collect $name:ident, [$($meta:tt)*], [], {}, [$({ $($method:tt)* })*]) => {
        $($meta)*
        #[$crate::proc::interface]
        pub trait $name {
            $($($method)*)*
        }
    };
}

/// Define a concrete object type embedding interface headers.
///
/// Generates the `#[repr(C)]` struct with the headers as leading members
/// (under the conventional `header_{interface}` names) plus safe up-cast
/// helpers. Use `#[implement(Interface)]` separately to bind the method
/// bodies.
///
/// # Single interface
/// ```ignore
/// define_class! {
///     pub class Cat : Animal {
///         pub food_eaten_today: u64,
///     }
/// }
///
/// #[implement(Animal)]
/// impl Cat {
///     fn speak(&self) -> &'static str { "Mrow!?!?!?!?!" }
///     fn fiscal_burden(&self) -> u64 { 0 }
/// }
/// ```
///
/// # Multiple interfaces
/// ```ignore
/// define_class! {
///     pub class Duck : Swimmer, Flyer {
///         pub name: &'static str,
///     }
/// }
///
/// #[implement(Swimmer)]
/// impl Duck {
///     fn swim(&self) { }
/// }
///
/// #[implement(Flyer)]
/// impl Duck {
///     fn fly(&self) { }
/// }
/// ```
#[macro_export]
macro_rules! define_class {
    // Single interface
    (
        $(#[$meta:meta])*
        $vis:vis class $name:ident : $base:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $crate::paste! {
            $(#[$meta])*
            #[repr(C)]
            $vis struct $name {
                /// Embedded instance header, first member
                pub [<header_ $base:snake>]: $base,
                $(
                    $(#[$field_meta])*
                    $field_vis $field_name: $field_ty,
                )*
            }

            impl $name {
                /// Up-cast: borrow the embedded header
                #[inline]
                pub fn [<as_ $base:snake>](&self) -> &$base {
                    &self.[<header_ $base:snake>]
                }

                /// Up-cast (mutable)
                #[inline]
                pub fn [<as_ $base:snake _mut>](&mut self) -> &mut $base {
                    &mut self.[<header_ $base:snake>]
                }
            }
        }
    };

    // Two interfaces
    (
        $(#[$meta:meta])*
        $vis:vis class $name:ident : $base1:ident, $base2:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $crate::paste! {
            $(#[$meta])*
            #[repr(C)]
            $vis struct $name {
                /// Embedded instance header, first member
                pub [<header_ $base1:snake>]: $base1,
                /// Embedded instance header, second member
                pub [<header_ $base2:snake>]: $base2,
                $(
                    $(#[$field_meta])*
                    $field_vis $field_name: $field_ty,
                )*
            }

            impl $name {
                /// Up-cast: borrow the first embedded header
                #[inline]
                pub fn [<as_ $base1:snake>](&self) -> &$base1 {
                    &self.[<header_ $base1:snake>]
                }

                /// Up-cast (mutable)
                #[inline]
                pub fn [<as_ $base1:snake _mut>](&mut self) -> &mut $base1 {
                    &mut self.[<header_ $base1:snake>]
                }

                /// Up-cast: borrow the second embedded header
                #[inline]
                pub fn [<as_ $base2:snake>](&self) -> &$base2 {
                    &self.[<header_ $base2:snake>]
                }

                /// Up-cast (mutable)
                #[inline]
                pub fn [<as_ $base2:snake _mut>](&mut self) -> &mut $base2 {
                    &mut self.[<header_ $base2:snake>]
                }
            }
        }
    };

    // Three interfaces
    (
        $(#[$meta:meta])*
        $vis:vis class $name:ident : $base1:ident, $base2:ident, $base3:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $crate::paste! {
            $(#[$meta])*
            #[repr(C)]
            $vis struct $name {
                pub [<header_ $base1:snake>]: $base1,
                pub [<header_ $base2:snake>]: $base2,
                pub [<header_ $base3:snake>]: $base3,
                $(
                    $(#[$field_meta])*
                    $field_vis $field_name: $field_ty,
                )*
            }

            impl $name {
                #[inline]
                pub fn [<as_ $base1:snake>](&self) -> &$base1 {
                    &self.[<header_ $base1:snake>]
                }

                #[inline]
                pub fn [<as_ $base1:snake _mut>](&mut self) -> &mut $base1 {
                    &mut self.[<header_ $base1:snake>]
                }

                #[inline]
                pub fn [<as_ $base2:snake>](&self) -> &$base2 {
                    &self.[<header_ $base2:snake>]
                }

                #[inline]
                pub fn [<as_ $base2:snake _mut>](&mut self) -> &mut $base2 {
                    &mut self.[<header_ $base2:snake>]
                }

                #[inline]
                pub fn [<as_ $base3:snake>](&self) -> &$base3 {
                    &self.[<header_ $base3:snake>]
                }

                #[inline]
                pub fn [<as_ $base3:snake _mut>](&mut self) -> &mut $base3 {
                    &mut self.[<header_ $base3:snake>]
                }
            }
        }
    };
}
