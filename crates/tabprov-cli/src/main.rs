mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabprov_core::config::{ProvisionConfig, WarnLevel};
use tabprov_core::paths;

#[derive(Parser)]
#[command(
    name = "tabprov",
    about = "Factory-reset and provision competition tablets over adb",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./tabprov.yaml if present)
    #[arg(long, global = true, env = "TABPROV_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the adb binary (default: search PATH)
    #[arg(long, global = true, env = "TABPROV_ADB")]
    adb: Option<PathBuf>,

    /// Log bridge commands and state transitions
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wipe a tablet, install the apps and push its team configuration
    Provision {
        /// Serial number of the tablet
        serial_number: String,
        /// Code of the team getting the tablet
        team_code: String,
        /// Part code of the tablet
        part_code: String,
        /// YAML file mapping team codes to WiFi passwords
        #[arg(long, default_value = paths::WIFI_CREDENTIALS_FILE)]
        wifi_credentials_file: PathBuf,
        /// After this tablet, prompt for the next one until a blank line
        #[arg(long)]
        batch: bool,
    },

    /// Wipe tablets one after another without provisioning them
    Reset {
        /// Stop after this many devices (default: until input is closed)
        #[arg(long)]
        count: Option<usize>,
    },

    /// Download and unpack the browser package only
    Fetch,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|mut config| {
        if let Some(adb) = cli.adb {
            config.adb_path = Some(adb);
        }
        match cli.command {
            Commands::Provision {
                serial_number,
                team_code,
                part_code,
                wifi_credentials_file,
                batch,
            } => cmd::provision::run(
                &config,
                &cmd::provision::Args {
                    serial_number,
                    team_code,
                    part_code,
                    wifi_credentials_file,
                    batch,
                },
                cli.json,
            ),
            Commands::Reset { count } => cmd::reset::run(&config, count, cli.json),
            Commands::Fetch => cmd::fetch::run(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ProvisionConfig> {
    let config = match explicit {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            ProvisionConfig::load(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => ProvisionConfig::load_from_dir(Path::new("."))
            .with_context(|| format!("failed to read {}", paths::CONFIG_FILE))?,
    };

    for warning in config.validate() {
        match warning.level {
            WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", warning.message),
        }
    }
    Ok(config)
}
