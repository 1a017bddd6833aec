//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::vouchers::{DEFAULT_MAX_CODE_ATTEMPTS, PgVouchersService, VouchersService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

/// Knobs applied while building the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    pub run_migrations: bool,
    pub max_code_attempts: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            run_migrations: false,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub vouchers: Arc<dyn VouchersService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        let vouchers = PgVouchersService::new(Db::new(pool))
            .with_max_code_attempts(settings.max_code_attempts);

        Ok(Self {
            vouchers: Arc::new(vouchers),
        })
    }
}
