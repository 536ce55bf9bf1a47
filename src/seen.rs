//! "Seen" flags, e.g. whether the keyboard intro for a demo was shown.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Key-value store of one-time flags
pub trait SeenStore {
    fn has_seen(&self, key: &str) -> bool;
    fn mark_seen(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, for tests and for running without a state directory
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    keys: HashSet<String>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for MemorySeenStore {
    fn has_seen(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn mark_seen(&mut self, key: &str) -> Result<()> {
        self.keys.insert(key.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeenFile {
    #[serde(default)]
    seen: BTreeMap<String, DateTime<Utc>>,
}

/// Store persisted as `seen.json` in the state directory
#[derive(Debug)]
pub struct FileSeenStore {
    path: PathBuf,
    data: SeenFile,
}

impl FileSeenStore {
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_from(&config.state_path())
    }

    pub fn load_from(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir).context("Failed to create state directory")?;
        let path = state_dir.join("seen.json");

        let data = if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read seen flags")?;
            serde_json::from_str(&contents).context("Failed to parse seen flags")?
        } else {
            SeenFile::default()
        };

        Ok(Self { path, data })
    }

    /// When `key` was first marked, if ever
    pub fn seen_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.data.seen.get(key).copied()
    }

    fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, contents).context("Failed to write seen flags")?;
        Ok(())
    }
}

impl SeenStore for FileSeenStore {
    fn has_seen(&self, key: &str) -> bool {
        self.data.seen.contains_key(key)
    }

    fn mark_seen(&mut self, key: &str) -> Result<()> {
        if self.has_seen(key) {
            return Ok(());
        }
        self.data.seen.insert(key.to_string(), Utc::now());
        self.save()
    }
}

/// Key for the intro overlay of a demo
pub fn intro_key(demo_key: &str) -> String {
    format!("intro:{}", demo_key)
}
