//! Gatehouse server binary.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatehouse::api::{self, AppState};
use gatehouse::auth::{AuthConfig, AuthState, Authenticator, TokenCodec};
use gatehouse::db::Database;
use gatehouse::mail::{LogMailer, SmtpSettings};
use gatehouse::user::{AccountService, UserRepository};

const DEFAULT_CONFIG_FILE: &str = "gatehouse.toml";

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match cli.command {
        Command::Serve(cmd) => serve(&config_path, cmd),
        Command::Config { command } => handle_config(&config_path, command),
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Gatehouse - user-account and authentication backend.")]
struct Cli {
    /// Override the config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(ServeCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Args)]
struct ServeCommand {
    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration (secret redacted)
    Show,
    /// Write a default configuration file with a fresh signing secret
    Init {
        /// Recreate the configuration even if it already exists
        #[arg(long)]
        force: bool,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    database: DatabaseConfig,
    auth: AuthConfig,
    #[serde(default)]
    smtp: SmtpSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseConfig {
    path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("gatehouse.db"),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration: TOML file layered under `GATEHOUSE_*` environment
/// overrides (e.g. `GATEHOUSE_AUTH__SECRET`).
fn load_config(path: &Path) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if path.exists() {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }
    builder = builder.add_source(Environment::with_prefix("GATEHOUSE").separator("__"));

    let config = builder
        .build()
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    config
        .try_deserialize::<AppConfig>()
        .context("deserializing configuration")
}

#[tokio::main]
async fn serve(config_path: &Path, cmd: ServeCommand) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    config
        .auth
        .validate()
        .map_err(|err| anyhow!("invalid [auth] configuration: {err}"))?;

    let db = Database::new(&config.database.path).await?;
    let users = UserRepository::new(db.pool().clone());

    let codec = Arc::new(TokenCodec::new(&config.auth)?);
    let auth_state = AuthState {
        codec: codec.clone(),
        users: users.clone(),
    };
    let authenticator = Authenticator::new(users.clone(), codec);

    // Verification codes go to the log until a real relay is wired in;
    // [smtp] carries the relay settings for that deployment.
    let accounts = AccountService::new(users, Arc::new(LogMailer));

    let state = AppState::new(accounts, authenticator, auth_state);
    let router = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing listen address")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Gatehouse listening");

    axum::serve(listener, router)
        .await
        .context("serving HTTP")?;

    Ok(())
}

fn handle_config(config_path: &Path, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut config = load_config(config_path)?;
            config.auth.secret = "<redacted>".to_string();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommand::Init { force } => {
            if config_path.exists() && !force {
                return Err(anyhow!(
                    "config already exists at {} (use --force to overwrite)",
                    config_path.display()
                ));
            }

            let mut key = [0u8; 48];
            rand::rng().fill(&mut key[..]);

            let config = AppConfig {
                server: ServerConfig::default(),
                database: DatabaseConfig::default(),
                auth: AuthConfig {
                    secret: BASE64.encode(key),
                    expiration_ms: 3_600_000,
                },
                smtp: SmtpSettings::default(),
            };

            std::fs::write(config_path, toml::to_string_pretty(&config)?)
                .with_context(|| format!("writing {}", config_path.display()))?;
            println!("wrote {}", config_path.display());
            Ok(())
        }
    }
}
