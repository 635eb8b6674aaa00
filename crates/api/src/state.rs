//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::models::lesson::{Lesson, Unit};
use crate::services::EmailService;

/// How long the lesson catalog may be served from memory.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// The cached lesson catalog (content only; progress is always read fresh).
#[derive(Debug, Clone)]
pub struct Catalog {
    pub units: Vec<Unit>,
    pub lessons: Vec<Lesson>,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    email: Option<EmailService>,
    catalog_cache: Cache<(), Arc<Catalog>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        let catalog_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                catalog_cache,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the email service, if mail is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the lesson catalog cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<(), Arc<Catalog>> {
        &self.inner.catalog_cache
    }
}
