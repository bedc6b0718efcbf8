use std::sync::Arc;

use crate::config::Config;
use crate::ports::{ProfileProvider, TextGenerator};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    /// `None` when no generation credentials are configured.
    pub text_generator: Option<Arc<dyn TextGenerator>>,
    /// `None` disables leaderboard enrichment.
    pub profiles: Option<Arc<dyn ProfileProvider>>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
