//! Worked example of the object protocol, end to end
//!
//! This demonstrates two approaches:
//! 1. Declarative macros: `define_interface!` and `define_class!`
//! 2. Proc-macros: `#[interface]` and `#[implement]`
//!
//! The Animal/Cat/Dog scenario exercises the whole surface: properties with
//! defaults, virtual dispatch, the non-virtual companion path, re-stamping,
//! identity checks, and down-casts.

#![allow(dead_code)]

// Declarative macros are #[macro_export] so they're at crate root
use interface_api::{Implements, define_class, define_interface, downcast_ref};

// =============================================================================
// APPROACH 1: Declarative macros (define_interface! / define_class!)
// =============================================================================

define_interface! {
    interface Animal {
        properties {
            mass: f64 = 0.0,
            volume: f64 = 1.0,
            surface_area: f64 = 0.0,
            name: &'static str = "",
        }
        fn speak(&self) -> &'static str;
        fn fiscal_burden(&self) -> u64;
    }
}

// Non-virtual companions: resolved at build time, no table slot.
impl Animal {
    pub fn compactness(&self) -> f64 {
        self.surface_area / self.volume
    }
}

define_class! {
    pub class Cat : Animal {
        pub food_eaten_today: u64,
        pub vet_visits_today: u64,
    }
}

#[interface_api::proc::implement(Animal)]
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
    pub fn new(name: &'static str, food_eaten_today: u64, vet_visits_today: u64) -> Self {
        let mut header = Animal::new_as::<Cat>();
        header.name = name;
        Cat {
            header_animal: header,
            food_eaten_today,
            vet_visits_today,
        }
    }
}

// =============================================================================
// APPROACH 2: Proc-macros (#[interface] / #[implement])
// =============================================================================

use interface_api::proc::{implement, interface};

#[interface(properties(walks_today: u64 = 0, name: &'static str = ""))]
pub trait Walker {
    fn stride(&self) -> &'static str;
}

#[repr(C)]
pub struct Dog {
    header_animal: Animal,
    header_walker: Walker,
}

#[implement(Animal)]
impl Dog {
    fn speak(&self) -> &'static str {
        "Woof!"
    }

    fn fiscal_burden(&self) -> u64 {
        self.header_walker.walks_today * 50
    }
}

#[implement(Walker)]
impl Dog {
    fn stride(&self) -> &'static str {
        "trot"
    }
}

impl Dog {
    pub fn new(name: &'static str, walks_today: u64) -> Self {
        let mut animal = Animal::new_as::<Dog>();
        animal.name = name;
        let mut walker = Walker::new_as::<Dog>();
        walker.name = name;
        walker.walks_today = walks_today;
        Dog {
            header_animal: animal,
            header_walker: walker,
        }
    }
}

fn main() {
    println!("=== Object protocol walkthrough ===\n");

    let mut cat = Cat::new("Georgie", 100, 2);
    cat.header_animal.surface_area = 6.0;
    cat.header_animal.volume = 2.0;

    let dog = Dog::new("Buddy", 3);

    // Virtual dispatch through the Animal headers.
    println!("--- Virtual calls ---");
    for view in [cat.as_animal(), dog.as_interface()] {
        unsafe {
            println!(
                "{} says {:?} (costs {} per day)",
                view.name,
                view.speak(),
                view.fiscal_burden(),
            );
        }
    }

    // Non-virtual companion call: no table slot involved.
    println!("\n--- Non-virtual call ---");
    println!("cat compactness: {}", cat.as_animal().compactness());

    // A Dog is two headers deep; the secondary interface works the same way.
    println!("\n--- Second interface ---");
    let walker: &Walker = dog.as_interface();
    unsafe {
        println!("{} moves at a {}", walker.name, walker.stride());
    }

    // Identity and down-casting.
    println!("\n--- Identity ---");
    let view = cat.as_animal();
    println!("cat is Cat: {}", view.is_instance::<Cat>());
    println!("cat is Dog: {}", view.is_instance::<Dog>());
    let back: &Cat = downcast_ref(view).expect("stamped as Cat");
    println!("recovered food_eaten_today: {}", back.food_eaten_today);

    // Layout, for the curious.
    println!("\n=== Struct sizes ===");
    println!("  Animal header: {} bytes", std::mem::size_of::<Animal>());
    println!("  AnimalVTable: {} bytes", std::mem::size_of::<AnimalVTable>());
    println!("  Cat: {} bytes", std::mem::size_of::<Cat>());
    println!("  Dog: {} bytes", std::mem::size_of::<Dog>());
}
