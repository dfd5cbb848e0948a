//! Tests for slot aliasing: two implementations borrowing one shared body.

use interface_api::Implements;
use interface_api::proc::{implement, interface};

#[interface(properties(volume: u32 = 0))]
pub trait Siren {
    fn wail(&self) -> &'static str;
    fn horn(&self) -> &'static str;
}

/// Shared `wail` body with the slot's exact signature. Both vehicle types
/// bind their `wail` slot to this one function.
unsafe fn standard_wail(this: *const Siren) -> &'static str {
    let siren = unsafe { &*this };
    if siren.volume > 5 {
        "WEE-OO WEE-OO"
    } else {
        "wee-oo"
    }
}

#[repr(C)]
pub struct FireTruck {
    header_siren: Siren,
}

#[implement(Siren, alias(wail = standard_wail))]
impl FireTruck {
    fn horn(&self) -> &'static str {
        "HONK"
    }
}

#[repr(C)]
pub struct Ambulance {
    header_siren: Siren,
}

#[implement(Siren, alias(wail = standard_wail))]
impl Ambulance {
    fn horn(&self) -> &'static str {
        "beep"
    }
}

impl FireTruck {
    pub fn new(volume: u32) -> Self {
        let mut header = Siren::new_as::<FireTruck>();
        header.volume = volume;
        FireTruck {
            header_siren: header,
        }
    }
}

impl Ambulance {
    pub fn new(volume: u32) -> Self {
        let mut header = Siren::new_as::<Ambulance>();
        header.volume = volume;
        Ambulance {
            header_siren: header,
        }
    }
}

#[test]
fn test_shared_slot_same_behavior() {
    let truck = FireTruck::new(7);
    let ambulance = Ambulance::new(7);

    unsafe {
        assert_eq!(truck.as_interface().wail(), "WEE-OO WEE-OO");
        assert_eq!(ambulance.as_interface().wail(), "WEE-OO WEE-OO");
    }
}

#[test]
fn test_shared_body_reads_per_instance_state() {
    let loud = FireTruck::new(9);
    let quiet = Ambulance::new(1);

    unsafe {
        assert_eq!(loud.as_interface().wail(), "WEE-OO WEE-OO");
        assert_eq!(quiet.as_interface().wail(), "wee-oo");
    }
}

#[test]
fn test_aliasing_leaves_other_slots_independent() {
    let truck = FireTruck::new(0);
    let ambulance = Ambulance::new(0);

    unsafe {
        assert_eq!(truck.as_interface().horn(), "HONK");
        assert_eq!(ambulance.as_interface().horn(), "beep");
    }
}

#[test]
fn test_aliased_tables_remain_distinct() {
    // Sharing a slot body does not merge the tables: identity is still
    // per-implementation.
    assert!(!std::ptr::eq(
        FireTruck::VTABLE_SIREN,
        Ambulance::VTABLE_SIREN,
    ));

    let truck = FireTruck::new(0);
    let view = truck.as_interface();
    assert!(view.is_instance::<FireTruck>());
    assert!(!view.is_instance::<Ambulance>());

    // Same slot value in both tables.
    assert_eq!(
        FireTruck::VTABLE_SIREN.wail as usize,
        Ambulance::VTABLE_SIREN.wail as usize,
    );
}
