use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "pizzeria-rs",
    version,
    about = "Minimal pizza-ordering web app with JWT cookie sessions"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, short = 'd', value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_name = "SECRET")]
    pub session_secret: Option<String>,

    /// Session token lifetime, e.g. `24h` or `90m`.
    #[arg(long, value_name = "DURATION")]
    pub session_ttl: Option<String>,

    /// Enable the unauthenticated `/add-pizza` seeding route.
    #[arg(long)]
    pub seed_catalog: bool,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub seed_catalog: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid boolean value for env var {key}: {value}")]
    InvalidEnvBool { key: String, value: String },
    #[error("invalid port in env var {key}: {value}")]
    InvalidEnvPort { key: String, value: String },
    #[error("invalid session ttl {value}: {source}")]
    InvalidTtl {
        value: String,
        source: humantime::DurationError,
    },
    #[error("no session secret configured; set PIZZERIA_SESSION_SECRET")]
    MissingSecret,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    data_dir: Option<PathBuf>,
    session_secret: Option<String>,
    session_ttl: Option<String>,
    seed_catalog: Option<bool>,
}

/// Overrides read from process environment. Separated out so the merge is
/// testable without touching the real environment.
#[derive(Debug, Default)]
struct EnvOverrides {
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    session_secret: Option<String>,
    session_ttl: Option<String>,
    seed_catalog: Option<bool>,
}

impl AppConfig {
    /// Resolve configuration with precedence CLI > env > file > default.
    /// The session secret has no default; resolution fails without one.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;
        let from_env = read_env()?;
        Self::merge(cli, from_file, from_env)
    }

    fn merge(cli: Cli, file: FileConfig, env: EnvOverrides) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or_else(|| env.port.map(|port| SocketAddr::from(([0, 0, 0, 0], port))))
            .or(file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let data_dir = cli
            .data_dir
            .or(env.data_dir)
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let session_secret = cli
            .session_secret
            .or(env.session_secret)
            .or(file.session_secret)
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let session_ttl = cli
            .session_ttl
            .or(env.session_ttl)
            .or(file.session_ttl)
            .map(|raw| parse_ttl(&raw))
            .transpose()?
            .unwrap_or(Duration::from_secs(24 * 3600));

        let seed_catalog = if cli.seed_catalog {
            true
        } else {
            env.seed_catalog.or(file.seed_catalog).unwrap_or(false)
        };

        Ok(Self {
            bind,
            data_dir,
            session_secret,
            session_ttl,
            seed_catalog,
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env() -> Result<EnvOverrides, ConfigError> {
    let port = match read_env_string("PIZZERIA_PORT") {
        Some(raw) => Some(
            raw.trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnvPort {
                    key: String::from("PIZZERIA_PORT"),
                    value: raw,
                })?,
        ),
        None => None,
    };

    Ok(EnvOverrides {
        port,
        data_dir: read_env_string("PIZZERIA_DATA_DIR").map(PathBuf::from),
        session_secret: read_env_string("PIZZERIA_SESSION_SECRET"),
        session_ttl: read_env_string("PIZZERIA_SESSION_TTL"),
        seed_catalog: read_env_bool("PIZZERIA_SEED_CATALOG")?,
    })
}

fn read_env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn read_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_bool_value(key, &value).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from("<non-unicode>"),
        }),
    }
}

fn parse_bool_value(key: &str, raw: &str) -> Result<bool, ConfigError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from(raw),
        }),
    }
}

fn parse_ttl(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigError::InvalidTtl {
        value: String::from(raw),
        source,
    })
}
