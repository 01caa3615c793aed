use anyhow::{Context, Result};
use bounty_crypto::TokenCipher;
use bounty_node::{config::NodeConfig, logging, start_api_server, BountyNode};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "./bounty-config.toml";

#[derive(Parser)]
#[command(name = "bounty-node")]
#[command(about = "Bounty board self-check, AI review and attestation service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Start {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port for the HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory for configuration
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print a fresh base64 AES-256 key for ENCRYPTION_KEY
    Keygen,

    /// Print the address of the configured signing key
    SignerAddress,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let file_config = load_file_config(cli.config.as_deref())?;
    let mut config = file_config.unwrap_or_default();
    config.apply_env_overrides();

    match cli.command {
        Commands::Start { host, port } => {
            logging::init_logging(&config.logging, cli.verbose)?;

            // CLI flags win over env and file
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            config.validate().context("invalid configuration")?;

            let node = BountyNode::new(&config)?;
            let api_handle = start_api_server(node, &config.api.host, config.api.port).await?;

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            api_handle.abort();
            Ok(())
        }

        Commands::Init { output } => {
            std::fs::create_dir_all(&output)?;
            let path = output.join("bounty-config.toml");
            NodeConfig::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
            println!("Set SIGNER_ADDRESS_PRIVATE_KEY and ENCRYPTION_KEY before starting.");
            Ok(())
        }

        Commands::Keygen => {
            println!("{}", TokenCipher::generate_key());
            Ok(())
        }

        Commands::SignerAddress => {
            let signer = config.attestation_signer()?;
            println!("{}", signer.address());
            Ok(())
        }
    }
}

/// Explicit `--config` must exist; the default file is optional.
fn load_file_config(path: Option<&Path>) -> Result<Option<NodeConfig>> {
    match path {
        Some(path) => NodeConfig::from_file(path).map(Some),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            NodeConfig::from_file(Path::new(DEFAULT_CONFIG_FILE)).map(Some)
        }
        None => Ok(None),
    }
}
