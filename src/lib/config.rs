use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use crate::core::TodoError;

pub const DATABASE_ENV: &str = "TODO_DATABASE";
pub const HOST_ENV: &str = "TODO_HOST";
pub const PORT_ENV: &str = "TODO_PORT";
pub const MAX_CONNECTIONS_ENV: &str = "TODO_MAX_CONNECTIONS";

const DATABASE_FILE: &str = "todos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, TodoError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TodoError> {
        let defaults = Self::default();
        Ok(Self {
            database_path: lookup(DATABASE_ENV).map(PathBuf::from).unwrap_or(defaults.database_path),
            host: lookup(HOST_ENV).unwrap_or(defaults.host),
            port: parse(&lookup, PORT_ENV)?.unwrap_or(defaults.port),
            max_connections: parse(&lookup, MAX_CONNECTIONS_ENV)?.unwrap_or(defaults.max_connections),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, TodoError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| TodoError::Config(format!("{key} has invalid value {raw:?}")))
        })
        .transpose()
}

// Beside the executable, falling back to the working directory.
fn default_database_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DATABASE_FILE)))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}
