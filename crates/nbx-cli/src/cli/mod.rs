//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nbx_core::config::{self, Config};
use nbx_core::interrupt;
use nbx_core::logging::{self, LogTarget, WorkerGuard};

mod commands;

#[derive(Parser)]
#[command(name = "nbx")]
#[command(version)]
#[command(about = "Browse a linked dataset graph as an animated notebook")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON dataset graph to browse (default: config `notebook.datasets_file`, else built-in)
    #[arg(long, value_name = "FILE", global = true, env = "NBX_DATASETS")]
    datasets: Option<PathBuf>,

    #[command(flatten)]
    notebook: NotebookArgs,
}

/// Flags for the interactive notebook.
#[derive(clap::Args, Debug, Clone, Default)]
struct NotebookArgs {
    /// Show cells fully typed, without animation
    #[arg(long = "no-animation")]
    no_animation: bool,

    /// Delay between typed characters in milliseconds
    #[arg(long, value_name = "MS")]
    speed: Option<u64>,

    /// Show the frame rate and animation counters
    #[arg(long = "debug-status")]
    debug_status: bool,
}

impl NotebookArgs {
    fn apply(&self, config: &mut Config) {
        if self.no_animation {
            config.animation.enabled = false;
        }
        if let Some(speed) = self.speed {
            config.animation.typing_speed_ms = speed;
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Runs actions headlessly and prints every resulting cell
    Exec {
        /// Action to run, e.g. `load:skills_data` or `explore:skills_data/programming`
        #[arg(short, long = "action", value_name = "ACTION")]
        actions: Vec<String>,
    },

    /// Inspect the dataset graph
    Datasets {
        #[command(subcommand)]
        command: DatasetCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum DatasetCommands {
    /// Lists dataset keys with their descriptions
    List,
    /// Shows a dataset as a table
    Show {
        /// Dataset key, e.g. `skills_data`
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        datasets,
        notebook,
    } = cli;

    // default to the interactive notebook
    let Some(command) = command else {
        let config = load_config(&notebook)?;
        let _guard = init_file_logging(&config)?;
        let datasets = commands::load_datasets(datasets.as_deref(), &config)?;
        return commands::notebook::run(datasets, &config, notebook.debug_status).await;
    };

    match command {
        Commands::Exec { actions } => {
            let config = load_config(&notebook)?;
            let _guard = init_file_logging(&config)?;
            let datasets = commands::load_datasets(datasets.as_deref(), &config)?;
            commands::exec::run(&datasets, &config, &actions)
        }

        Commands::Datasets { command } => {
            let config = load_config(&notebook)?;
            let _guard = logging::init(&config.log, LogTarget::Stderr)?;
            let datasets = commands::load_datasets(datasets.as_deref(), &config)?;
            match command {
                DatasetCommands::List => {
                    commands::datasets::list(&datasets);
                    Ok(())
                }
                DatasetCommands::Show { key } => commands::datasets::show(&datasets, &key),
            }
        }

        // Works without loading the config, so a broken file can be inspected.
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

fn load_config(args: &NotebookArgs) -> Result<Config> {
    let mut config = Config::load().context("load config")?;
    args.apply(&mut config);
    Ok(config)
}

fn init_file_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let dir = config::paths::logs_dir()?;
    logging::init(&config.log, LogTarget::File(&dir))
}
