//! Application settings loaded via OrthoConfig.
//!
//! Values come from `ROLLCALL_*` environment variables, CLI flags, and
//! configuration files, in the precedence `ortho_config` applies.

use std::ffi::OsString;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{User, UserValidationError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while interpreting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Loading from the environment, CLI, or files failed.
    #[error("failed to load settings: {message}")]
    Load { message: String },
    #[error("bind address {value:?} is not a socket address")]
    InvalidBindAddr { value: String },
    /// Neither `token_secret` nor `token_secret_file` is set.
    #[error("a token secret is required: set ROLLCALL_TOKEN_SECRET or ROLLCALL_TOKEN_SECRET_FILE")]
    MissingTokenSecret,
    #[error("token secret must not be empty")]
    EmptyTokenSecret,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("users file {path} is not a JSON array of users: {message}")]
    UsersFile { path: PathBuf, message: String },
    #[error("user {index} in {path} is invalid: {source}")]
    InvalidUser {
        path: PathBuf,
        index: usize,
        #[source]
        source: UserValidationError,
    },
}

/// Process-wide configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROLLCALL")]
pub struct AppSettings {
    /// Socket address to listen on; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections; defaults to 10.
    pub db_max_connections: Option<u32>,
    /// HS256 secret used to verify bearer tokens.
    pub token_secret: Option<String>,
    /// File holding the HS256 secret. Ignored when `token_secret` is set.
    pub token_secret_file: Option<PathBuf>,
    /// JSON array of `{id, name, email, role}` objects seeded into the
    /// in-memory store.
    pub users_file: Option<PathBuf>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize)]
struct UserSeed {
    id: String,
    name: String,
    email: String,
    role: String,
}

impl AppSettings {
    /// Load settings from the process arguments and environment.
    pub fn load_from_args<I>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load {
            message: err.to_string(),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|_| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
            })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Resolve the token secret, preferring the inline value over the file.
    ///
    /// Trailing whitespace in secret files is stripped.
    pub fn token_secret(&self) -> Result<Vec<u8>, SettingsError> {
        let secret = match (&self.token_secret, &self.token_secret_file) {
            (Some(inline), _) => inline.trim_end().to_owned(),
            (None, Some(path)) => read_to_string(path)?.trim_end().to_owned(),
            (None, None) => return Err(SettingsError::MissingTokenSecret),
        };
        if secret.is_empty() {
            return Err(SettingsError::EmptyTokenSecret);
        }
        Ok(secret.into_bytes())
    }

    /// Parse the configured users file, or return no users when unset.
    pub fn seed_users(&self) -> Result<Vec<User>, SettingsError> {
        let Some(path) = &self.users_file else {
            return Ok(Vec::new());
        };
        let raw = read_to_string(path)?;
        let seeds: Vec<UserSeed> =
            serde_json::from_str(&raw).map_err(|err| SettingsError::UsersFile {
                path: path.clone(),
                message: err.to_string(),
            })?;
        seeds
            .into_iter()
            .enumerate()
            .map(|(index, seed)| {
                User::try_from_strings(seed.id, seed.name, seed.email, seed.role).map_err(
                    |source| SettingsError::InvalidUser {
                        path: path.clone(),
                        index,
                        source,
                    },
                )
            })
            .collect()
    }
}

fn read_to_string(path: &Path) -> Result<String, SettingsError> {
    let read = || -> io::Result<String> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(file_name))
    };
    read().map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })
}
