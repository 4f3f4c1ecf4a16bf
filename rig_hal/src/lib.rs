//! Rig hardware backends.
//!
//! This crate contains the rig driver implementations:
//!
//! - [`sim`] - Software simulation backend for development and testing
//! - [`registry`] - Driver factory registry
//!
//! # Adding New Backends
//!
//! 1. Create a new module implementing the `RigDriver` trait from
//!    `rig_common::driver`
//! 2. Register its factory in [`builtin_registry`]

pub mod registry;
pub mod sim;

use registry::DriverRegistry;

/// Registry pre-populated with all built-in drivers.
pub fn builtin_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register("simulation", sim::create_driver);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_simulation() {
        let registry = builtin_registry();
        let driver = registry.create_driver("simulation").unwrap();
        assert_eq!(driver.name(), "simulation");
    }
}
