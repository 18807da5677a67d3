use std::sync::Arc;

use wayside_core::cities::CityDirectory;
use wayside_db::DbPool;

use crate::config::ServerConfig;

/// Handler state. Everything inside is read-only after startup; cloning
/// copies the pool handle and two `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    /// Includes the token verification secret.
    pub config: Arc<ServerConfig>,
    /// Origins for the feed and candidates for city search.
    pub cities: Arc<CityDirectory>,
}
