use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timing of demo playback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between progress ticks (default: 100)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Pause between activation and the first tick (default: 300)
    #[serde(default = "default_settling_delay")]
    pub settling_delay_ms: u64,
    /// Start playing as soon as a demo is shown
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

fn default_tick_interval() -> u64 {
    100
}

fn default_settling_delay() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            settling_delay_ms: default_settling_delay(),
            auto_start: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Redraw interval for the terminal player (default: 50)
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
    /// Demo opened when no demo is named on the command line
    #[serde(default = "default_demo")]
    pub default_demo: String,
}

fn default_refresh_rate() -> u64 {
    50
}

fn default_demo() -> String {
    "takeoff".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
            default_demo: default_demo(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for user demo definitions
    #[serde(default = "default_demos_path")]
    pub demos: String,
    /// Directory for logs and seen flags
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_demos_path() -> String {
    ".sitedemo/demos".to_string()
}

fn default_state_path() -> String {
    ".sitedemo".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            demos: default_demos_path(),
            state: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_true")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_true(),
        }
    }
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".sitedemo/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so sitedemo works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/sitedemo/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sitedemo").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with SITEDEMO_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("SITEDEMO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config as TOML to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Save config to .sitedemo/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::local_config_path())
    }

    fn absolute(path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to the user demos directory
    pub fn demos_path(&self) -> PathBuf {
        Self::absolute(&self.paths.demos)
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        Self::absolute(&self.paths.state)
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.playback.tick_interval_ms, 100);
        assert_eq!(config.playback.settling_delay_ms, 300);
        assert!(config.playback.auto_start);
        assert_eq!(config.ui.default_demo, "takeoff");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [playback]
            settling_delay_ms = 800
            "#,
        )
        .unwrap();
        assert_eq!(config.playback.settling_delay_ms, 800);
        assert_eq!(config.playback.tick_interval_ms, 100);
        assert_eq!(config.paths.demos, ".sitedemo/demos");
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
            [ui]
            default_demo = "safety"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.ui.default_demo, "safety");
        assert_eq!(config.ui.refresh_rate_ms, 50);
    }

    #[test]
    fn test_save_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.playback.tick_interval_ms = 40;
        config.save_to(&path).unwrap();

        let loaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.playback.tick_interval_ms, 40);
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs = config.logs_path();
        assert!(logs.ends_with("logs"));
        assert!(logs.starts_with(temp_dir.path()));
    }
}
