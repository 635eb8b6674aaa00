//! Payment settings repository.
//!
//! At most one document has `is_active = true` (enforced by a partial unique
//! index). Every write is a compare-and-swap on the `version` column so
//! concurrent writers cannot silently overwrite each other.

use serde_json::Value;
use sqlx::PgPool;

use chirp_core::SettingsId;

use super::RepositoryError;
use crate::models::settings::{PaymentSettings, SettingsSection};

const SETTINGS_COLUMNS: &str = "id, is_active, version, general, providers, currencies, \
     regional, webhooks, security, notifications, created_at, updated_at";

/// The seven section payloads of one document, in one bundle.
#[derive(Debug, Clone)]
pub struct SectionValues {
    pub general: Value,
    pub providers: Value,
    pub currencies: Value,
    pub regional: Value,
    pub webhooks: Value,
    pub security: Value,
    pub notifications: Value,
}

impl SectionValues {
    /// Defaults for every section.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            general: SettingsSection::General.default_value(),
            providers: SettingsSection::Providers.default_value(),
            currencies: SettingsSection::Currencies.default_value(),
            regional: SettingsSection::Regional.default_value(),
            webhooks: SettingsSection::Webhooks.default_value(),
            security: SettingsSection::Security.default_value(),
            notifications: SettingsSection::Notifications.default_value(),
        }
    }

    /// Extract the current section payloads from a stored document.
    #[must_use]
    pub fn from_settings(settings: &PaymentSettings) -> Self {
        Self {
            general: settings.general.clone(),
            providers: settings.providers.clone(),
            currencies: settings.currencies.clone(),
            regional: settings.regional.clone(),
            webhooks: settings.webhooks.clone(),
            security: settings.security.clone(),
            notifications: settings.notifications.clone(),
        }
    }

    /// Access to one section by name.
    #[must_use]
    pub const fn section(&self, section: SettingsSection) -> &Value {
        match section {
            SettingsSection::General => &self.general,
            SettingsSection::Providers => &self.providers,
            SettingsSection::Currencies => &self.currencies,
            SettingsSection::Regional => &self.regional,
            SettingsSection::Webhooks => &self.webhooks,
            SettingsSection::Security => &self.security,
            SettingsSection::Notifications => &self.notifications,
        }
    }

    /// Mutable access to one section by name.
    pub const fn section_mut(&mut self, section: SettingsSection) -> &mut Value {
        match section {
            SettingsSection::General => &mut self.general,
            SettingsSection::Providers => &mut self.providers,
            SettingsSection::Currencies => &mut self.currencies,
            SettingsSection::Regional => &mut self.regional,
            SettingsSection::Webhooks => &mut self.webhooks,
            SettingsSection::Security => &mut self.security,
            SettingsSection::Notifications => &mut self.notifications,
        }
    }
}

/// Repository for the payment settings document.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the active settings document, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self) -> Result<Option<PaymentSettings>, RepositoryError> {
        let settings = sqlx::query_as::<_, PaymentSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM payment_settings WHERE is_active = TRUE"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(settings)
    }

    /// Get the active settings document, creating defaults on first access.
    ///
    /// A concurrent first access loses the insert race on the partial unique
    /// index and falls back to reading the winner's row, so defaults are
    /// created exactly once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if queries fail.
    pub async fn get_or_create_active(&self) -> Result<PaymentSettings, RepositoryError> {
        if let Some(settings) = self.get_active().await? {
            return Ok(settings);
        }

        match self.create(&SectionValues::defaults(), true).await {
            Ok(settings) => Ok(settings),
            Err(RepositoryError::Conflict(_)) => {
                self.get_active().await?.ok_or(RepositoryError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a new settings document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when an active document already
    /// exists and `is_active` is requested.
    pub async fn create(
        &self,
        sections: &SectionValues,
        is_active: bool,
    ) -> Result<PaymentSettings, RepositoryError> {
        let settings = sqlx::query_as::<_, PaymentSettings>(&format!(
            "INSERT INTO payment_settings
                 (is_active, general, providers, currencies, regional, webhooks,
                  security, notifications)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SETTINGS_COLUMNS}"
        ))
        .bind(is_active)
        .bind(&sections.general)
        .bind(&sections.providers)
        .bind(&sections.currencies)
        .bind(&sections.regional)
        .bind(&sections.webhooks)
        .bind(&sections.security)
        .bind(&sections.notifications)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "an active payment settings document already exists".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(settings)
    }

    /// Write all sections back, compare-and-swapping on `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the stored version no longer
    /// matches (a concurrent writer won); nothing is written in that case.
    pub async fn save(
        &self,
        id: SettingsId,
        expected_version: i32,
        sections: &SectionValues,
    ) -> Result<PaymentSettings, RepositoryError> {
        let settings = sqlx::query_as::<_, PaymentSettings>(&format!(
            "UPDATE payment_settings
             SET general = $3, providers = $4, currencies = $5, regional = $6,
                 webhooks = $7, security = $8, notifications = $9,
                 version = version + 1, updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {SETTINGS_COLUMNS}"
        ))
        .bind(id)
        .bind(expected_version)
        .bind(&sections.general)
        .bind(&sections.providers)
        .bind(&sections.currencies)
        .bind(&sections.regional)
        .bind(&sections.webhooks)
        .bind(&sections.security)
        .bind(&sections.notifications)
        .fetch_optional(self.pool)
        .await?;

        settings.ok_or_else(|| {
            RepositoryError::Conflict("payment settings were modified concurrently".to_owned())
        })
    }
}
