//! Driver registry for rig backends.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving rig
//! driver factories. Constructor-injected rather than global state, so it
//! is testable in isolation.

use std::collections::HashMap;

use rig_common::driver::{DriverFactory, RigDriver};
use rig_common::error::RigError;

/// Registry of available rig drivers.
///
/// Constructed at startup, populated via `register()`, and handed to the
/// binary by value.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Create a driver instance by name.
    ///
    /// # Errors
    /// Returns `RigError::DriverNotFound` if no driver with the given name
    /// is registered.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn RigDriver>, RigError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| RigError::DriverNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_common::config::RigConfig;
    use rig_common::driver::{RigEnd, ToolGroup};

    struct TestDriver;

    impl RigDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, _config: &RigConfig) -> Result<(), RigError> {
            Ok(())
        }

        fn set_tools_enabled(&mut self, _group: ToolGroup, _on: bool) {}

        fn piston_positions(&self) -> Vec<f32> {
            Vec::new()
        }

        fn set_piston_velocity(&mut self, _index: usize, _velocity: f32) {}

        fn set_rotor_velocity(&mut self, _velocity: f32) -> Result<(), RigError> {
            Ok(())
        }

        fn connect(&mut self, _end: RigEnd) -> Result<(), RigError> {
            Ok(())
        }

        fn disconnect(&mut self, _end: RigEnd) -> Result<(), RigError> {
            Ok(())
        }

        fn set_merge_enabled(&mut self, _end: RigEnd, _on: bool) -> Result<(), RigError> {
            Ok(())
        }

        fn merge_docked(&self, _end: RigEnd) -> Result<bool, RigError> {
            Ok(false)
        }

        fn write_status(&mut self, _text: &str) {}
    }

    fn create_test_driver() -> Box<dyn RigDriver> {
        Box::new(TestDriver)
    }

    #[test]
    fn registry_register_and_create() {
        let mut registry = DriverRegistry::new();
        registry.register("test_driver", create_test_driver);

        let driver = registry.create_driver("test_driver").expect("should create");
        assert_eq!(driver.name(), "test");
    }

    #[test]
    fn registry_driver_not_found() {
        let registry = DriverRegistry::new();
        let result = registry.create_driver("nonexistent");
        assert!(matches!(result, Err(RigError::DriverNotFound(_))));
    }

    #[test]
    fn registry_list_drivers() {
        let mut registry = DriverRegistry::new();
        registry.register("alpha", create_test_driver);
        registry.register("beta", create_test_driver);

        let mut names = registry.list_drivers();
        names.sort();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut registry = DriverRegistry::new();
        registry.register("dup", create_test_driver);
        registry.register("dup", create_test_driver);
    }
}
