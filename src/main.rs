use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitedemo::app::App;
use sitedemo::config::Config;
use sitedemo::demos::{loader, DemoRegistry};
use sitedemo::format::format_elapsed;
use sitedemo::seen::FileSeenStore;
use sitedemo::{env_vars, headless, logging, ui};

#[derive(Parser)]
#[command(name = "sitedemo")]
#[command(about = "Simulated AI demo player for construction product pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a demo in the terminal
    Play {
        /// Demo key (see `sitedemo list`)
        demo: Option<String>,

        /// Print step events as lines instead of drawing the player
        #[arg(long)]
        headless: bool,
    },

    /// List available demos
    List,

    /// Validate demo definition files
    Check {
        /// Directory to check (default: configured demos directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show supported environment variables
    Env,

    /// Write the effective configuration to .sitedemo/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Only the interactive player owns the terminal
    let is_tui_mode = match &cli.command {
        None => true,
        Some(Commands::Play { headless, .. }) => !headless,
        Some(_) => false,
    };

    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Play { demo, headless }) => {
            cmd_play(&config, demo, headless, logging_handle.log_file_path).await?;
        }
        Some(Commands::List) => {
            cmd_list(&config)?;
        }
        Some(Commands::Check { dir }) => {
            cmd_check(&config, dir)?;
        }
        Some(Commands::Env) => {
            print!("{}", env_vars::render_listing());
        }
        Some(Commands::Init { force }) => {
            cmd_init(&config, force)?;
        }
        None => {
            cmd_play(&config, None, false, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn cmd_play(
    config: &Config,
    demo_key: Option<String>,
    headless: bool,
    log_file_path: Option<PathBuf>,
) -> Result<()> {
    let registry = DemoRegistry::load_all(&config.demos_path())?;
    let key = demo_key.unwrap_or_else(|| config.ui.default_demo.clone());
    let demo = match registry.get(&key) {
        Ok(demo) => demo.clone(),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Available demos: {}", registry.keys().join(", "));
            std::process::exit(1);
        }
    };

    if let Err(e) = demo.validate() {
        tracing::error!(demo = %demo.key, "Demo not playable: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if headless {
        let mut stdout = std::io::stdout();
        return headless::run_headless(config, &demo, &mut stdout).await;
    }

    ui::install_panic_hook();
    let seen = FileSeenStore::load(config).context("Failed to load seen flags")?;
    let mut app = App::new(config.clone(), demo, Box::new(seen))?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_list(config: &Config) -> Result<()> {
    let registry = DemoRegistry::load_all(&config.demos_path())?;

    println!("Demos ({})", registry.len());
    println!("{}", "─".repeat(60));

    for demo in registry.all() {
        println!(
            "{:<12} {:<28} {} steps, {}",
            demo.key,
            demo.name,
            demo.steps.len(),
            format_elapsed(demo.nominal_total())
        );
    }

    Ok(())
}

fn cmd_init(config: &Config, force: bool) -> Result<()> {
    let path = Config::local_config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    config.save()?;
    std::fs::create_dir_all(config.demos_path()).context("Failed to create demos directory")?;
    tracing::info!(path = %path.display(), "Config written");
    println!("Wrote {}", path.display());
    println!("Add demo files to {}", config.demos_path().display());
    Ok(())
}

fn cmd_check(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.demos_path());
    let results = loader::check_dir(&dir)?;

    if results.is_empty() {
        println!("No demo files in {}", dir.display());
        return Ok(());
    }

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(demo) => println!("ok    {} ({})", path.display(), demo.key),
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} demo files invalid", failures, results.len());
    }
    Ok(())
}
