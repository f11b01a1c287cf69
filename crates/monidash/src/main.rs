//! Monidash - CLI entry point
//!
//! Connects to a build status server and shows its builds as a grid of
//! coloured boxes until the user quits.

use clap::{Parser, Subcommand};
use monidash::config::{default, xdg, Config, ConfigLoader};
use monidash::dashboard::{Dashboard, DashboardConfig, ExitReason};
use monidash::fetcher::{BuildFetcher, FetcherConfig};
use monidash::logging;
use monidash::terminal::{spawn_event_poller, TerminalGuard, EVENT_CHANNEL_CAPACITY};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::mpsc;

/// Terminal dashboard for CI build status
#[derive(Parser)]
#[command(name = "monidash")]
#[command(version, about = "Terminal dashboard for CI build status")]
struct Cli {
    /// Build server address
    #[arg(short, long, env = "MONIDASH_ADDR", value_name = "HOST:PORT")]
    address: Option<String>,

    /// Configuration file [default: $XDG_CONFIG_HOME/monidash/config.toml]
    #[arg(short, long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands. Without one, the dashboard runs.
#[derive(Subcommand)]
enum Commands {
    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return run_config_command(action, cli.config_path.as_deref());
    }

    let config = match ConfigLoader::load(cli.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(address) = resolve_address(cli.address.as_deref(), &config) else {
        eprintln!("Error: no server address given (use --address or MONIDASH_ADDR)");
        return ExitCode::FAILURE;
    };

    let fetcher_config = match config.validate().and_then(|()| config.fetcher_config()) {
        Ok(fetcher_config) => fetcher_config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_file = (!config.log.file.is_empty()).then(|| xdg::expand_tilde(&config.log.file));
    if let Err(e) = logging::init(config.log.level, log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(run_dashboard(
        &address,
        fetcher_config,
        config.dashboard_config(),
    ))
}

/// `--address` / `MONIDASH_ADDR` first, then `server.address` from config.
fn resolve_address(flag: Option<&str>, config: &Config) -> Option<String> {
    flag.map(str::trim)
        .filter(|address| !address.is_empty())
        .or_else(|| config.server_address())
        .map(str::to_string)
}

/// Connects, takes over the terminal and runs the dashboard to completion.
///
/// The terminal is restored before anything is printed to stderr.
async fn run_dashboard(
    address: &str,
    fetcher_config: FetcherConfig,
    dashboard_config: DashboardConfig,
) -> ExitCode {
    let fetcher = match BuildFetcher::connect(address, fetcher_config).await {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut updates = fetcher.into_receiver();

    let result = {
        let mut guard = match TerminalGuard::acquire() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Terminal error: {e}");
                return ExitCode::FAILURE;
            }
        };
        let (event_tx, mut events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let poller = spawn_event_poller(event_tx);

        let mut dashboard = Dashboard::new(dashboard_config);
        let result = dashboard
            .run(guard.drawer(), &mut events, &mut updates)
            .await;
        poller.abort();
        result
    };

    match result {
        Ok(ExitReason::TerminalError(message)) => {
            eprintln!("Terminal error: {message}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Terminal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_config_command(action: ConfigAction, explicit: Option<&Path>) -> ExitCode {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(xdg::config_path);

    let result = match action {
        ConfigAction::Init { force } => default::create_default_config(&path, force)
            .map(|()| println!("Created configuration at {}", path.display())),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Validate => ConfigLoader::load(explicit).and_then(|config| {
            config.validate()?;
            println!("Configuration is valid");
            println!("{config:#?}");
            Ok(())
        }),
    };

    if let Err(e) = result {
        eprintln!("Config error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
