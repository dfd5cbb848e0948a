//! Instance composition and casting.
//!
//! A concrete object embeds one instance header per interface it implements,
//! headers first, extra fields after (`#[repr(C)]` throughout). Up-casting is
//! taking the address of the embedded header; down-casting is subtracting the
//! header's offset back off. Both directions round-trip to the same address.
//!
//! Down-casts come in two flavors:
//! - [`downcast_ref`] / [`downcast_mut`] check implementation identity first
//!   (dispatch-table address equality) and return `Option`
//! - [`downcast_ref_unchecked`] / [`downcast_mut_unchecked`] skip the check
//!   for callers with independent knowledge of the concrete type

/// An instance-header type generated by `#[interface]`.
///
/// # Safety
///
/// Implemented only by macro-generated headers: `#[repr(C)]`, dispatch-table
/// reference as the first field, `vtable_ptr` returning it.
pub unsafe trait Interface: Sized {
    /// The dispatch-table struct for this interface.
    type VTable: 'static;

    /// Number of fn-pointer slots in the dispatch table.
    const METHOD_COUNT: usize;

    /// Address of the dispatch table this view is currently stamped with.
    fn vtable_ptr(&self) -> *const Self::VTable;
}

/// A concrete type bound to interface `I` by `#[implement]`.
///
/// # Safety
///
/// Implemented only by macro-generated bindings: the type is `#[repr(C)]`,
/// embeds an `I` header at byte offset `HEADER_OFFSET`, and `VTABLE` is the
/// type's one static dispatch table for `I`.
pub unsafe trait Implements<I: Interface>: Sized {
    /// The implementation's single, immutable dispatch table.
    const VTABLE: &'static I::VTable;

    /// Byte offset of the embedded `I` header within `Self`.
    const HEADER_OFFSET: usize;

    /// Up-cast: borrow the embedded interface header.
    #[inline]
    fn as_interface(&self) -> &I {
        unsafe {
            let ptr = (self as *const Self as *const u8).add(Self::HEADER_OFFSET);
            &*(ptr as *const I)
        }
    }

    /// Up-cast (mutable).
    #[inline]
    fn as_interface_mut(&mut self) -> &mut I {
        unsafe {
            let ptr = (self as *mut Self as *mut u8).add(Self::HEADER_OFFSET);
            &mut *(ptr as *mut I)
        }
    }
}

/// Whether the object behind `view` is currently stamped as implementation
/// `K`.
///
/// Each implementation owns exactly one dispatch table per interface, with
/// static lifetime, so table-address equality is both necessary and
/// sufficient.
#[inline]
#[must_use]
pub fn is_instance<I, K>(view: &I) -> bool
where
    I: Interface,
    K: Implements<I>,
{
    core::ptr::eq(view.vtable_ptr(), K::VTABLE)
}

/// Down-cast an interface view to its concrete implementation, checked.
///
/// Returns `None` when the view is stamped as some other implementation.
/// The stamp is trusted: a header only carries `K`'s table after `new_as`
/// or after an `unsafe` re-stamp whose caller vouched for `K`'s layout
/// around the header.
#[inline]
#[must_use]
pub fn downcast_ref<I, K>(view: &I) -> Option<&K>
where
    I: Interface,
    K: Implements<I>,
{
    if is_instance::<I, K>(view) {
        Some(unsafe { downcast_ref_unchecked(view) })
    } else {
        None
    }
}

/// Down-cast an interface view to its concrete implementation, checked
/// (mutable). Trusts the stamp the same way [`downcast_ref`] does.
#[inline]
#[must_use]
pub fn downcast_mut<I, K>(view: &mut I) -> Option<&mut K>
where
    I: Interface,
    K: Implements<I>,
{
    if is_instance::<I, K>(view) {
        Some(unsafe { downcast_mut_unchecked(view) })
    } else {
        None
    }
}

/// Down-cast without the identity check.
///
/// # Safety
///
/// `view` must borrow the `I` header embedded in a live `K`.
#[inline]
#[must_use]
pub unsafe fn downcast_ref_unchecked<I, K>(view: &I) -> &K
where
    I: Interface,
    K: Implements<I>,
{
    unsafe {
        let ptr = (view as *const I as *const u8).sub(K::HEADER_OFFSET);
        &*(ptr as *const K)
    }
}

/// Down-cast without the identity check (mutable).
///
/// # Safety
///
/// `view` must borrow the `I` header embedded in a live `K`.
#[inline]
#[must_use]
pub unsafe fn downcast_mut_unchecked<I, K>(view: &mut I) -> &mut K
where
    I: Interface,
    K: Implements<I>,
{
    unsafe {
        let ptr = (view as *mut I as *mut u8).sub(K::HEADER_OFFSET);
        &mut *(ptr as *mut K)
    }
}
