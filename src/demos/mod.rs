//! Demo registry.
//!
//! Demos are loaded from two places, later sources overriding earlier ones by
//! key:
//! 1. Built-in demos embedded in the binary
//! 2. User demos: `*.json` files in the configured demos directory

pub mod loader;
pub mod schema;

pub use schema::{DemoDefinition, DemoError, DemoSource, ResultMetric};

use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Ordered collection of playable demos
#[derive(Debug, Clone, Default)]
pub struct DemoRegistry {
    demos: Vec<DemoDefinition>,
}

impl DemoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in demos
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for demo in loader::load_builtins() {
            registry.register(demo);
        }
        registry
    }

    /// Built-ins plus any user demos found in `demos_path`
    pub fn load_all(demos_path: &Path) -> Result<Self> {
        let mut registry = Self::builtin();

        let mut user: Vec<DemoDefinition> =
            loader::load_user_demos(demos_path)?.into_values().collect();
        user.sort_by(|a, b| a.key.cmp(&b.key));
        for demo in user {
            registry.register(demo);
        }

        info!(count = registry.len(), "Demos loaded");
        Ok(registry)
    }

    /// Add a demo, replacing any existing demo with the same key in place.
    /// Keys compare case-insensitively, matching `get`.
    pub fn register(&mut self, demo: DemoDefinition) {
        match self
            .demos
            .iter_mut()
            .find(|d| d.key.eq_ignore_ascii_case(&demo.key))
        {
            Some(existing) => *existing = demo,
            None => self.demos.push(demo),
        }
    }

    pub fn get(&self, key: &str) -> Result<&DemoDefinition, DemoError> {
        self.demos
            .iter()
            .find(|d| d.key.eq_ignore_ascii_case(key))
            .ok_or_else(|| DemoError::Unknown(key.to_string()))
    }

    pub fn all(&self) -> impl Iterator<Item = &DemoDefinition> {
        self.demos.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.demos.iter().map(|d| d.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.demos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_registry_has_takeoff() {
        let registry = DemoRegistry::builtin();
        assert!(!registry.is_empty());
        assert_eq!(registry.get("takeoff").unwrap().steps.len(), 4);
        assert_eq!(registry.keys()[0], "takeoff");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = DemoRegistry::builtin();
        assert!(registry.get("TAKEOFF").is_ok());
    }

    #[test]
    fn test_unknown_demo() {
        let registry = DemoRegistry::builtin();
        let err = registry.get("roofing").unwrap_err();
        assert_eq!(err.to_string(), "unknown demo 'roofing'");
    }

    #[test]
    fn test_user_demo_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("takeoff.json"),
            r#"{
                "key": "takeoff",
                "name": "Custom Takeoff",
                "steps": [{ "title": "Only step", "duration_secs": 1 }]
            }"#,
        )
        .unwrap();

        let builtin_count = DemoRegistry::builtin().len();
        let registry = DemoRegistry::load_all(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), builtin_count);

        let takeoff = registry.get("takeoff").unwrap();
        assert_eq!(takeoff.name, "Custom Takeoff");
        assert_eq!(takeoff.source, DemoSource::User);
        assert_eq!(registry.keys()[0], "takeoff");
    }

    #[test]
    fn test_override_matches_key_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("takeoff.json"),
            r#"{
                "key": "Takeoff",
                "name": "Shouty Takeoff",
                "steps": [{ "title": "Only step", "duration_secs": 1 }]
            }"#,
        )
        .unwrap();

        let registry = DemoRegistry::load_all(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), DemoRegistry::builtin().len());
        assert_eq!(registry.get("takeoff").unwrap().name, "Shouty Takeoff");
        assert_eq!(registry.keys()[0], "Takeoff");
    }
}
