use std::{env, time::Duration};

use anyhow::{Context, Result, bail};

pub const DEFAULT_DATABASE: &str = "fiber-hr";
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/fiber-hr";
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:3000";
pub const COLLECTION_NAME: &str = "employees";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub database: String,
    pub server_address: String,
    /// Bounds the startup connection, including the initial ping.
    pub connect_timeout: Duration,
    /// Bounds every database operation issued by a request handler.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            mongo_uri: lookup("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            database: lookup("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            server_address: lookup("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            connect_timeout: seconds(
                &lookup,
                "MONGO_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            request_timeout: seconds(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got {raw:?}"))?,
        None => default,
    };
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
