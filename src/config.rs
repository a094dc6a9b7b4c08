use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub index_limit: usize,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: try_load("DATABASE_URL", "sqlite:polls.db".to_string()),
            database_max_connections: try_load("DATABASE_MAX_CONNECTIONS", 5),
            port: try_load("POLLS_PORT", 8000),
            index_limit: try_load("POLLS_INDEX_LIMIT", 5),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or_default(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn parse_or_default<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
