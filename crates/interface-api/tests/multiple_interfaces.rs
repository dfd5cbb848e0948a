//! Tests for objects implementing several interfaces: one embedded header
//! per interface, independent casts in both directions.

use interface_api::proc::implement;
use interface_api::{define_class, define_interface, downcast_ref, is_instance};

define_interface! {
    interface Swimmer {
        fn swim(&self) -> &'static str;
    }

    interface Flyer {
        fn fly(&self) -> &'static str;
        fn ceiling(&self) -> u32;
    }
}

define_class! {
    pub class Duck : Swimmer, Flyer {
        pub name: &'static str,
        pub altitude: u32,
    }
}

#[implement(Swimmer)]
impl Duck {
    fn swim(&self) -> &'static str {
        "paddle"
    }
}

#[implement(Flyer)]
impl Duck {
    fn fly(&self) -> &'static str {
        "flap"
    }

    fn ceiling(&self) -> u32 {
        self.altitude * 2
    }
}

impl Duck {
    pub fn new(name: &'static str, altitude: u32) -> Self {
        Duck {
            header_swimmer: Swimmer::new_as::<Duck>(),
            header_flyer: Flyer::new_as::<Duck>(),
            name,
            altitude,
        }
    }
}

#[test]
fn test_headers_are_leading_members() {
    assert_eq!(std::mem::offset_of!(Duck, header_swimmer), 0);
    #[cfg(target_pointer_width = "64")]
    {
        assert_eq!(std::mem::offset_of!(Duck, header_flyer), 8);
        assert_eq!(std::mem::offset_of!(Duck, name), 16);
    }
}

#[test]
fn test_dispatch_through_each_header() {
    let duck = Duck::new("Ferdinand", 50);

    unsafe {
        assert_eq!(duck.as_swimmer().swim(), "paddle");
        assert_eq!(duck.as_flyer().fly(), "flap");
        assert_eq!(duck.as_flyer().ceiling(), 100);
    }
}

#[test]
fn test_secondary_header_wrappers_recover_the_object() {
    // The Flyer header sits past the start of the object, so its wrappers
    // subtract a non-zero offset to reach the Duck.
    let duck = Duck::new("Ferdinand", 7);
    let view = duck.as_flyer();

    unsafe {
        assert_eq!(view.ceiling(), 14);
    }
}

#[test]
fn test_independent_identity_per_interface() {
    let duck = Duck::new("Ferdinand", 0);

    assert!(is_instance::<Swimmer, Duck>(duck.as_swimmer()));
    assert!(is_instance::<Flyer, Duck>(duck.as_flyer()));
}

#[test]
fn test_downcast_from_either_header() {
    let duck = Duck::new("Ferdinand", 0);

    let from_swimmer: &Duck = downcast_ref(duck.as_swimmer()).unwrap();
    let from_flyer: &Duck = downcast_ref(duck.as_flyer()).unwrap();

    assert!(std::ptr::eq(from_swimmer, &duck));
    assert!(std::ptr::eq(from_flyer, &duck));
    assert_eq!(from_flyer.name, "Ferdinand");
}
