use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Process configuration, read once from the environment at startup and
/// shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string (`DATABASE_URL`, required).
    pub database_url: String,
    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,
    /// Origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// JSON city list backing the feed and city search.
    pub cities_path: String,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `DATABASE_URL`         | required                   |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CITIES_PATH`          | `static/us_cities.json`    |
    ///
    /// JWT settings come from [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on a missing required variable or an unparseable value.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 3000),
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 20),
            cors_origins: env_or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            cities_path: env_or("CITIES_PATH", "static/us_cities.json"),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Socket address to listen on.
    ///
    /// # Panics
    ///
    /// Panics if `host` is not an IP address.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = self
            .host
            .parse()
            .unwrap_or_else(|e| panic!("HOST '{}' is not an IP address: {e}", self.host));
        SocketAddr::new(ip, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
