//! Registry of environment variables understood by sitedemo.
//!
//! All variables use the `SITEDEMO_` prefix with `__` separating the config
//! section from the key (e.g., `SITEDEMO_PLAYBACK__TICK_INTERVAL_MS`).
//! `RUST_LOG` is honored as well and overrides the configured log level.

/// An environment variable definition
#[derive(Debug, Clone)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub category: EnvVarCategory,
    pub default: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVarCategory {
    Playback,
    Ui,
    Paths,
    Logging,
}

impl EnvVarCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EnvVarCategory::Playback => "Playback",
            EnvVarCategory::Ui => "UI",
            EnvVarCategory::Paths => "Paths",
            EnvVarCategory::Logging => "Logging",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [EnvVarCategory] {
        &[
            EnvVarCategory::Playback,
            EnvVarCategory::Ui,
            EnvVarCategory::Paths,
            EnvVarCategory::Logging,
        ]
    }
}

pub static ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "SITEDEMO_PLAYBACK__TICK_INTERVAL_MS",
        description: "Milliseconds between progress ticks",
        category: EnvVarCategory::Playback,
        default: Some("100"),
    },
    EnvVar {
        name: "SITEDEMO_PLAYBACK__SETTLING_DELAY_MS",
        description: "Pause after a demo is shown before playback starts",
        category: EnvVarCategory::Playback,
        default: Some("300"),
    },
    EnvVar {
        name: "SITEDEMO_PLAYBACK__AUTO_START",
        description: "Start playback automatically when a demo is shown",
        category: EnvVarCategory::Playback,
        default: Some("true"),
    },
    EnvVar {
        name: "SITEDEMO_UI__REFRESH_RATE_MS",
        description: "Redraw interval of the terminal player",
        category: EnvVarCategory::Ui,
        default: Some("50"),
    },
    EnvVar {
        name: "SITEDEMO_UI__DEFAULT_DEMO",
        description: "Demo opened when none is named on the command line",
        category: EnvVarCategory::Ui,
        default: Some("takeoff"),
    },
    EnvVar {
        name: "SITEDEMO_PATHS__DEMOS",
        description: "Directory scanned for user demo definitions (*.json)",
        category: EnvVarCategory::Paths,
        default: Some(".sitedemo/demos"),
    },
    EnvVar {
        name: "SITEDEMO_PATHS__STATE",
        description: "Directory for logs and seen flags",
        category: EnvVarCategory::Paths,
        default: Some(".sitedemo"),
    },
    EnvVar {
        name: "SITEDEMO_LOGGING__LEVEL",
        description: "Log level filter (trace, debug, info, warn, error)",
        category: EnvVarCategory::Logging,
        default: Some("info"),
    },
    EnvVar {
        name: "SITEDEMO_LOGGING__TO_FILE",
        description: "Write player logs to a file instead of stderr",
        category: EnvVarCategory::Logging,
        default: Some("true"),
    },
    EnvVar {
        name: "RUST_LOG",
        description: "Tracing filter directive; overrides the configured level",
        category: EnvVarCategory::Logging,
        default: None,
    },
];

pub fn env_vars_for_category(category: EnvVarCategory) -> impl Iterator<Item = &'static EnvVar> {
    ENV_VARS.iter().filter(move |v| v.category == category)
}

/// Plain-text listing grouped by category, for `sitedemo env`
pub fn render_listing() -> String {
    let mut out = String::new();
    for category in EnvVarCategory::all() {
        out.push_str(category.display_name());
        out.push('\n');
        for var in env_vars_for_category(*category) {
            let default = var.default.map(|d| format!(" (default: {})", d));
            out.push_str(&format!(
                "  {:<40} {}{}\n",
                var.name,
                var.description,
                default.unwrap_or_default()
            ));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_vars_have_prefix() {
        for var in ENV_VARS.iter().filter(|v| v.name != "RUST_LOG") {
            assert!(
                var.name.starts_with("SITEDEMO_"),
                "EnvVar {} does not have SITEDEMO_ prefix",
                var.name
            );
        }
    }

    #[test]
    fn test_every_category_has_vars() {
        for category in EnvVarCategory::all() {
            assert!(env_vars_for_category(*category).next().is_some());
        }
    }

    #[test]
    fn test_listing_contains_all_names() {
        let listing = render_listing();
        for var in ENV_VARS {
            assert!(listing.contains(var.name));
        }
    }
}
