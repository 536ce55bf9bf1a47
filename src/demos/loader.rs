//! Loading demo definitions from the binary and the filesystem

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::schema::{DemoDefinition, DemoError, DemoSource};

/// Embedded demo definitions, in display order
const BUILTIN_DEMOS: &[(&str, &str)] = &[
    ("takeoff", include_str!("builtin/takeoff.json")),
    ("bid-review", include_str!("builtin/bid_review.json")),
    ("schedule", include_str!("builtin/schedule.json")),
    ("safety", include_str!("builtin/safety.json")),
];

/// Load all built-in demos. Built-ins that fail to parse are skipped.
pub fn load_builtins() -> Vec<DemoDefinition> {
    let mut demos = Vec::with_capacity(BUILTIN_DEMOS.len());

    for (name, json) in BUILTIN_DEMOS {
        match DemoDefinition::from_json(json) {
            Ok(mut demo) => {
                demo.source = DemoSource::Builtin;
                debug!("Loaded builtin demo: {}", demo.key);
                demos.push(demo);
            }
            Err(e) => warn!("Failed to parse builtin demo {}: {}", name, e),
        }
    }

    demos
}

/// Load and validate a single demo file
pub fn load_demo_file(path: &Path) -> Result<DemoDefinition, DemoError> {
    let content = fs::read_to_string(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut demo = DemoDefinition::from_json(&content).map_err(|source| DemoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    demo.validate()?;
    demo.source = DemoSource::User;
    Ok(demo)
}

/// List `*.json` files in a demos directory, sorted by name.
/// A missing directory yields an empty list.
pub fn demo_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        debug!("Demos directory does not exist: {}", path.display());
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read demos directory: {}", path.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let file_path = entry?.path();
        if file_path.is_dir() || file_path.extension().is_none_or(|e| e != "json") {
            continue;
        }
        files.push(file_path);
    }
    files.sort();

    Ok(files)
}

/// Load user demos from a directory, keyed by demo key.
///
/// Invalid files are logged as warnings and skipped.
pub fn load_user_demos(path: &Path) -> Result<HashMap<String, DemoDefinition>> {
    let mut demos = HashMap::new();

    for file_path in demo_files(path)? {
        match load_demo_file(&file_path) {
            Ok(demo) => {
                debug!(
                    "Loaded user demo: {} from {}",
                    demo.key,
                    file_path.display()
                );
                demos.insert(demo.key.clone(), demo);
            }
            Err(e) => warn!("Skipping demo file {}: {}", file_path.display(), e),
        }
    }

    Ok(demos)
}

/// Validate every demo file in a directory, returning one result per file
pub fn check_dir(path: &Path) -> Result<Vec<(PathBuf, Result<DemoDefinition, DemoError>)>> {
    Ok(demo_files(path)?
        .into_iter()
        .map(|file| {
            let result = load_demo_file(&file);
            (file, result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"{
        "key": "punch",
        "name": "Punch List",
        "steps": [{ "title": "Walk the site", "duration_secs": 2 }]
    }"#;

    #[test]
    fn test_all_builtins_parse_and_validate() {
        let demos = load_builtins();
        assert_eq!(demos.len(), BUILTIN_DEMOS.len());
        for demo in &demos {
            assert!(demo.validate().is_ok(), "builtin {} invalid", demo.key);
            assert_eq!(demo.source, DemoSource::Builtin);
        }
    }

    #[test]
    fn test_builtin_keys_match_table() {
        let demos = load_builtins();
        for ((key, _), demo) in BUILTIN_DEMOS.iter().zip(&demos) {
            assert_eq!(*key, demo.key);
        }
    }

    #[test]
    fn test_takeoff_durations() {
        let takeoff = load_builtins()
            .into_iter()
            .find(|d| d.key == "takeoff")
            .unwrap();
        let durations: Vec<f64> = takeoff.steps.iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![3.0, 4.0, 5.0, 3.0]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let demos = load_user_demos(&temp_dir.path().join("nope")).unwrap();
        assert!(demos.is_empty());
    }

    #[test]
    fn test_load_user_demos_skips_invalid_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("punch.json"), VALID).unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(
            temp_dir.path().join("empty.json"),
            r#"{ "key": "empty", "name": "Empty", "steps": [] }"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let demos = load_user_demos(temp_dir.path()).unwrap();
        assert_eq!(demos.len(), 1);
        assert_eq!(demos["punch"].source, DemoSource::User);
    }

    #[test]
    fn test_check_dir_reports_each_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), VALID).unwrap();
        fs::write(temp_dir.path().join("b.json"), "[]").unwrap();

        let results = check_dir(temp_dir.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(DemoError::Parse { .. })));
    }
}
