use anyhow::Context;
use sqlx::PgPool;

use quill_config::{CorsConfig, JwtConfig, UsersConfig};
use quill_db::{DEFAULT_MAX_CONNECTIONS, init_db_pool};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub users_config: UsersConfig,
}

impl AppState {
    /// State with configuration read from the environment around an existing
    /// pool.
    pub fn from_env_with_pool(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            users_config: UsersConfig::from_env(),
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let db = init_db_pool(&database_url, max_connections).await?;
    Ok(AppState::from_env_with_pool(db))
}
