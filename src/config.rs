//! Server configuration.
//!
//! Flags win over environment variables, which win over defaults:
//!
//! | Flag          | Env               | Default          |
//! |---------------|-------------------|------------------|
//! | `--bind`      | `WATER_BIND`      | `127.0.0.1:8080` |
//! | `--data-file` | `WATER_DATA_FILE` | none (in-memory) |

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const ENV_BIND: &str = "WATER_BIND";
pub const ENV_DATA_FILE: &str = "WATER_DATA_FILE";

pub const USAGE: &str = "Usage: water-reports [--bind <addr:port>] [--data-file <path>]";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid bind address `{0}`")]
    InvalidBind(String),

    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Journal location. `None` keeps reports in memory only.
    pub data_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the process arguments and environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// `args` excludes the program name.
    pub fn parse<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut bind: Option<String> = None;
        let mut data_file: Option<String> = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bind" => {
                    bind = Some(args.next().ok_or(ConfigError::MissingValue(arg))?);
                }
                "--data-file" => {
                    data_file = Some(args.next().ok_or(ConfigError::MissingValue(arg))?);
                }
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        let bind = bind
            .or_else(|| env(ENV_BIND))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;

        let data_file = data_file
            .or_else(|| env(ENV_DATA_FILE))
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { bind, data_file })
    }
}
