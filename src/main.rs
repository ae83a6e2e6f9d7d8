use anyhow::{Context, Result};
use clap::{builder::PossibleValuesParser, Args, Parser, Subcommand};
use std::path::PathBuf;

use lanshare::config::{format_config, Config, CONFIG_KEYS};
use lanshare::logging::{init_logging, LogConfig, Verbosity};
use lanshare::server::{run_server, ServerConfig};

#[derive(Parser)]
#[command(name = "lanshare")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Share files with devices on your local network")]
#[command(
    long_about = "Starts a web server that any phone, tablet or laptop on the same network can use to upload and download files. Scan the QR code on the home page to open it."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the file sharing server (default)
    Serve(ServeArgs),
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on (default: 5000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to store shared files in (default: ./uploads next to the executable)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Open the home page in a browser after starting
    #[arg(long)]
    open: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<String>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration (default)
    Show,
    /// Print the config file location
    Path,
    /// Set a configuration value
    Set {
        #[arg(value_parser = PossibleValuesParser::new(CONFIG_KEYS.iter().copied()))]
        key: String,
        value: String,
    },
    /// Remove a configuration value
    Unset {
        #[arg(value_parser = PossibleValuesParser::new(CONFIG_KEYS.iter().copied()))]
        key: String,
    },
}

#[tokio::main(flavor = "multi_thread", worker_threads = 16)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args).await,
        Some(Commands::Config { action }) => run_config(action.unwrap_or(ConfigAction::Show)),
        None => serve(cli.serve).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let _log_guard = init_logging(&LogConfig {
        verbosity: Verbosity::from_occurrences(args.verbose, args.quiet),
        log_file: args.log_file,
    });

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable config file");
        Config::default()
    });

    let server_config = ServerConfig {
        port: config.effective_port(args.port),
        upload_dir: config.effective_upload_dir(args.dir),
        open_browser: args.open,
    };

    run_server(server_config).await
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load().context("Failed to load config")?;
            println!("{}", format_config(&config));
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load().context("Failed to load config")?;
            config.set_value(&key, &value)?;
            config.save().context("Failed to save config")?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load().context("Failed to load config")?;
            config.unset_value(&key)?;
            config.save().context("Failed to save config")?;
            println!("Unset {}", key);
        }
    }
    Ok(())
}
