//! apifuzz command line
//!
//! Thin wrapper over the library: encode request descriptions into request
//! text, decode request text, and build match/hide rule sets from files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use apifuzz::http::auth::JwtSigner;
use apifuzz::http::RequestSpec;
use apifuzz::rules::{MatchMode, RuleDocument};
use apifuzz::{ApiFuzzError, Config, RequestCodec, ResultExt};

/// Request text codec and match/hide rules for API fuzzing
#[derive(Parser, Debug)]
#[command(name = "apifuzz")]
#[command(author, version, about = "Request text codec and match/hide rules for API fuzzing", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "APIFUZZ_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "APIFUZZ_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, env = "APIFUZZ_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, env = "APIFUZZ_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON request description into HTTP/1.1 request text
    Encode {
        /// Input file, or - for stdin
        path: PathBuf,

        /// Input is the control panel's request form rather than a RequestSpec
        #[arg(long)]
        form: bool,
    },

    /// Decode HTTP/1.1 request text into a JSON request description
    Decode {
        /// Input file, or - for stdin
        path: PathBuf,

        /// Print the engine's request_details object instead
        #[arg(long)]
        details: bool,
    },

    /// Build a match/hide rule set from a TOML or JSON rule document
    Rules {
        /// Input file, or - for stdin (read as JSON)
        path: PathBuf,

        /// Mode used when the document names none
        #[arg(long)]
        mode: Option<MatchMode>,

        /// Print the engine's match_hide value instead
        #[arg(long)]
        engine: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        return generate_default_config();
    }

    init_logging(&cli)?;

    let config = load_config(&cli)?;

    if cli.validate_config {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command given. Run with --help for usage.");
    };

    if let Err(e) = run_command(command, &config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize the logging system. Console output goes to stderr so stdout
/// carries only command output.
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(log_path) = &cli.log_file {
        let path = Path::new(log_path);
        let file_appender = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => {
                RollingFileAppender::new(Rotation::DAILY, dir, name)
            }
            _ => {
                let log_dir = Config::data_dir()
                    .map(|d| d.join("logs"))
                    .unwrap_or_else(|_| PathBuf::from("."));
                std::fs::create_dir_all(&log_dir).ok();
                RollingFileAppender::new(Rotation::DAILY, log_dir, log_path)
            }
        };

        if cli.log_json {
            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false);
            subscriber.with(file_layer).init();
        } else {
            let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
            subscriber.with(file_layer).init();
        }
    } else if cli.log_json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

/// Load and validate configuration
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let config = Config::default();
    let toml = toml::to_string_pretty(&config)?;

    println!("{}", toml);
    Ok(())
}

fn run_command(command: Command, config: &Config) -> Result<(), ApiFuzzError> {
    match command {
        Command::Encode { path, form } => {
            let input = read_input(&path)?;
            let codec = build_codec(config)?;

            let text = if form {
                codec.encode_form(&input)?
            } else {
                let spec: RequestSpec = serde_json::from_str(&input)
                    .with_context(format!("Invalid request description in {}", path.display()))?;
                codec.encode(&spec)?
            };
            print!("{}", text);
        }
        Command::Decode { path, details } => {
            let input = read_input(&path)?;
            let spec = apifuzz::decode(&input)?;

            let value = if details {
                spec.to_request_details()
            } else {
                serde_json::to_value(&spec).with_context("Failed to serialize request")?
            };
            print_json(&value)?;
        }
        Command::Rules { path, mode, engine } => {
            let input = read_input(&path)?;
            let is_toml = path.extension().is_some_and(|ext| ext == "toml");
            let document = if is_toml {
                RuleDocument::from_toml(&input)
            } else {
                RuleDocument::from_json(&input)
            }
            .map_err(|e| {
                ApiFuzzError::with_context(
                    format!("Invalid rule document {}", path.display()),
                    std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:#}", e)),
                )
            })?;

            let set = document.into_rule_set(mode.unwrap_or(config.rules.mode));
            let value = if engine {
                set.to_match_hide()
            } else {
                serde_json::to_value(&set).with_context("Failed to serialize rule set")?
            };
            print_json(&value)?;
        }
    }

    Ok(())
}

/// Codec from config, with the JWT signer injected when a secret is set
fn build_codec(config: &Config) -> Result<RequestCodec, ApiFuzzError> {
    let codec = RequestCodec::from_config(&config.codec);

    let signer = JwtSigner::from_config(&config.jwt).map_err(|e| {
        ApiFuzzError::with_context(
            "Invalid JWT signing settings",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{:#}", e)),
        )
    })?;

    Ok(match signer {
        Some(signer) => codec.with_issuer(Arc::new(signer)),
        None => codec,
    })
}

fn read_input(path: &Path) -> Result<String, ApiFuzzError> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).with_context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(format!("Failed to read {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<(), ApiFuzzError> {
    let text = serde_json::to_string_pretty(value).with_context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
