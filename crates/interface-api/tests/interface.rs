//! Tests for interface descriptors: properties with defaults, multiple
//! coexisting implementations, and the non-virtual companion path.

use interface_api::proc::{implement, interface};
use interface_api::{Implements, Interface};

#[interface(properties(
    mass: f64 = 0.0,
    volume: f64 = 1.0,
    surface_area: f64 = 0.0,
    name: &'static str = "",
))]
pub trait Animal {
    fn speak(&self) -> &'static str;
    fn fiscal_burden(&self) -> u64;
}

// Non-virtual companion methods: interface-namespaced, resolved at build
// time, absent from the dispatch table.
impl Animal {
    pub fn compactness(&self) -> f64 {
        self.surface_area / self.volume
    }
}

#[repr(C)]
pub struct Cat {
    header_animal: Animal,
    food_eaten_today: u64,
    vet_visits_today: u64,
}

#[implement(Animal)]
impl Cat {
    fn speak(&self) -> &'static str {
        if self.fiscal_burden() > 10_000 {
            "Mew:) Purrrrrrr...."
        } else {
            "Mrow!?!?!?!?!"
        }
    }

    fn fiscal_burden(&self) -> u64 {
        self.food_eaten_today + self.vet_visits_today * 10_000
    }
}

impl Cat {
    pub fn new(food_eaten_today: u64, vet_visits_today: u64) -> Self {
        Cat {
            header_animal: Animal::new_as::<Cat>(),
            food_eaten_today,
            vet_visits_today,
        }
    }
}

#[repr(C)]
pub struct Dog {
    header_animal: Animal,
    walks_today: u64,
}

#[implement(Animal)]
impl Dog {
    fn speak(&self) -> &'static str {
        "Woof!"
    }

    fn fiscal_burden(&self) -> u64 {
        self.walks_today * 50
    }
}

impl Dog {
    pub fn new(walks_today: u64) -> Self {
        Dog {
            header_animal: Animal::new_as::<Dog>(),
            walks_today,
        }
    }
}

#[test]
fn test_property_defaults() {
    let cat = Cat::new(0, 0);
    assert_eq!(cat.header_animal.mass, 0.0);
    assert_eq!(cat.header_animal.volume, 1.0);
    assert_eq!(cat.header_animal.name, "");
}

#[test]
fn test_vtable_layout() {
    // 2 methods = 2 fn-pointer slots, declaration order
    assert_eq!(<Animal as Interface>::METHOD_COUNT, 2);
    assert_eq!(
        std::mem::size_of::<AnimalVTable>(),
        <Animal as Interface>::METHOD_COUNT * std::mem::size_of::<*const ()>(),
    );
}

#[test]
fn test_fiscal_burden_virtual() {
    let cat = Cat::new(100, 2);
    let view = cat.as_interface();
    unsafe {
        assert_eq!(view.fiscal_burden(), 20_100);
    }
}

#[test]
fn test_speak_branches_on_burden() {
    let pampered = Cat::new(100, 2);
    let frugal = Cat::new(100, 0);

    unsafe {
        assert_eq!(pampered.as_interface().speak(), "Mew:) Purrrrrrr....");
        assert_eq!(frugal.as_interface().speak(), "Mrow!?!?!?!?!");
    }
}

#[test]
fn test_implementations_do_not_cross_dispatch() {
    let cat = Cat::new(100, 2);
    let dog = Dog::new(3);

    unsafe {
        assert_eq!(cat.as_interface().speak(), "Mew:) Purrrrrrr....");
        assert_eq!(dog.as_interface().speak(), "Woof!");
        assert_eq!(dog.as_interface().fiscal_burden(), 150);
    }
    assert!(!std::ptr::eq(Cat::VTABLE_ANIMAL, Dog::VTABLE_ANIMAL));
}

#[test]
fn test_concrete_method_bypasses_table() {
    let mut cat = Cat::new(0, 0);
    cat.header_animal.surface_area = 6.0;
    cat.header_animal.volume = 2.0;

    // Safe call: no dispatch, no table slot.
    assert_eq!(cat.header_animal.compactness(), 3.0);

    let dog = Dog::new(0);
    assert_eq!(dog.header_animal.compactness(), 0.0);
}
