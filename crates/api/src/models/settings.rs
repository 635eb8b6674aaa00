//! Payment settings — the singleton configuration document.
//!
//! The document is stored as one JSONB column per section so individual
//! sections can be merged without rewriting the whole document. Section
//! payloads are validated against the typed structs below; merge and masking
//! rules are pure functions over `serde_json::Value` and unit-tested here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use chirp_core::SettingsId;

/// Default heart cap when no settings document overrides it.
pub const DEFAULT_MAX_HEARTS: i32 = 5;

/// Keys whose values are masked unless the caller asks for secrets.
const SECRET_KEYS: &[&str] = &[
    "api_key",
    "secret_key",
    "client_secret",
    "signing_secret",
    "encryption_key",
];

/// Replacement value for masked secrets.
const MASKED: &str = "********";

/// The active payment/currency configuration document.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentSettings {
    pub id: SettingsId,
    pub is_active: bool,
    /// Optimistic-concurrency version; incremented on every write.
    pub version: i32,
    pub general: Value,
    pub providers: Value,
    pub currencies: Value,
    pub regional: Value,
    pub webhooks: Value,
    pub security: Value,
    pub notifications: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentSettings {
    /// Parsed hearts configuration, falling back to defaults for missing fields.
    #[must_use]
    pub fn hearts_config(&self) -> HeartsConfig {
        self.currencies
            .get("hearts")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Return a copy with secret fields replaced by a mask.
    #[must_use]
    pub fn masked(mut self) -> Self {
        mask_secret_fields(&mut self.providers);
        mask_secret_fields(&mut self.webhooks);
        mask_secret_fields(&mut self.security);
        self
    }
}

// =============================================================================
// Sections
// =============================================================================

/// The named sections of the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSection {
    General,
    Providers,
    Currencies,
    Regional,
    Webhooks,
    Security,
    Notifications,
}

impl SettingsSection {
    pub const ALL: [Self; 7] = [
        Self::General,
        Self::Providers,
        Self::Currencies,
        Self::Regional,
        Self::Webhooks,
        Self::Security,
        Self::Notifications,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Providers => "providers",
            Self::Currencies => "currencies",
            Self::Regional => "regional",
            Self::Webhooks => "webhooks",
            Self::Security => "security",
            Self::Notifications => "notifications",
        }
    }

    /// Default value for this section.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Self::General => to_default::<GeneralSettings>(),
            Self::Providers => to_default::<ProvidersSettings>(),
            Self::Currencies => to_default::<CurrenciesSettings>(),
            Self::Regional => to_default::<RegionalSettings>(),
            Self::Webhooks => to_default::<WebhooksSettings>(),
            Self::Security => to_default::<SecuritySettings>(),
            Self::Notifications => to_default::<NotificationsSettings>(),
        }
    }

    /// Validate a payload against this section's schema.
    ///
    /// # Errors
    ///
    /// Returns a field-level message when the payload does not deserialize
    /// into the section's shape, or when a webhook endpoint URL is invalid.
    pub fn validate(self, payload: &Value) -> Result<(), String> {
        fn check<T: serde::de::DeserializeOwned>(section: &str, v: &Value) -> Result<(), String> {
            serde_json::from_value::<T>(v.clone())
                .map(|_| ())
                .map_err(|e| format!("invalid {section} settings: {e}"))
        }

        match self {
            Self::General => check::<GeneralSettings>("general", payload),
            Self::Providers => check::<ProvidersSettings>("providers", payload),
            Self::Currencies => check::<CurrenciesSettings>("currencies", payload),
            Self::Regional => check::<RegionalSettings>("regional", payload),
            Self::Webhooks => {
                check::<WebhooksSettings>("webhooks", payload)?;
                if let Some(endpoint) = payload.get("endpoint_url").and_then(Value::as_str)
                    && !endpoint.is_empty()
                {
                    url::Url::parse(endpoint)
                        .map_err(|e| format!("invalid webhooks settings: endpoint_url: {e}"))?;
                }
                Ok(())
            }
            Self::Security => check::<SecuritySettings>("security", payload),
            Self::Notifications => check::<NotificationsSettings>("notifications", payload),
        }
    }
}

impl std::str::FromStr for SettingsSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sec| sec.as_str() == s)
            .ok_or_else(|| format!("unknown settings section: {s}"))
    }
}

fn to_default<T: Default + Serialize>() -> Value {
    serde_json::to_value(T::default()).unwrap_or_else(|_| json!({}))
}

// =============================================================================
// Typed section schemas
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralSettings {
    pub payments_enabled: bool,
    pub default_currency: String,
    pub sandbox_mode: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            payments_enabled: true,
            default_currency: "USD".to_owned(),
            sandbox_mode: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersSettings {
    pub stripe: ProviderAccount,
    pub paypal: ProviderAccount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderAccount {
    pub enabled: bool,
    pub api_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrenciesSettings {
    pub gems: GemsConfig,
    pub hearts: HeartsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GemsConfig {
    pub enabled: bool,
    pub starting_balance: i32,
}

impl Default for GemsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            starting_balance: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeartsConfig {
    pub enabled: bool,
    pub max_hearts: i32,
    pub refill_cost_gems: i32,
    pub regen_minutes: i32,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_hearts: DEFAULT_MAX_HEARTS,
            refill_cost_gems: 500,
            regen_minutes: 240,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionalSettings {
    pub default_region: String,
    pub supported_regions: Vec<String>,
    pub tax_inclusive: bool,
}

impl Default for RegionalSettings {
    fn default() -> Self {
        Self {
            default_region: "US".to_owned(),
            supported_regions: vec!["US".to_owned(), "EU".to_owned()],
            tax_inclusive: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhooksSettings {
    pub endpoint_url: String,
    pub signing_secret: String,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecuritySettings {
    pub require_3ds: bool,
    pub fraud_checks: bool,
    pub encryption_key: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            require_3ds: true,
            fraud_checks: true,
            encryption_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationsSettings {
    pub purchase_receipts: bool,
    pub payment_failures: bool,
    pub notify_email: String,
}

// =============================================================================
// Merge & masking rules
// =============================================================================

/// Replace each top-level key of `base` present in `patch`.
pub fn shallow_merge(base: &mut Value, patch: &Value) {
    let Some(patch_map) = patch.as_object() else {
        return;
    };
    if let Some(base_map) = base.as_object_mut() {
        for (k, v) in patch_map {
            base_map.insert(k.clone(), v.clone());
        }
    } else {
        *base = patch.clone();
    }
}

/// Merge `patch` into `base` one level deep: top-level keys whose values are
/// objects on both sides are shallow-merged, everything else is replaced.
pub fn merge_one_level(base: &mut Value, patch: &Value) {
    let Some(patch_map) = patch.as_object() else {
        return;
    };
    let Some(base_map) = base.as_object_mut() else {
        *base = patch.clone();
        return;
    };
    for (k, v) in patch_map {
        match (base_map.get_mut(k), v.as_object()) {
            (Some(existing @ Value::Object(_)), Some(_)) => shallow_merge(existing, v),
            _ => {
                base_map.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Recursively mask the values of known secret keys.
pub fn mask_secret_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if SECRET_KEYS.contains(&k.as_str()) {
                    if v.as_str().is_none_or(|s| !s.is_empty()) {
                        *v = Value::String(MASKED.to_owned());
                    }
                } else {
                    mask_secret_fields(v);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_secret_fields(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        for section in SettingsSection::ALL {
            let value = section.default_value();
            assert!(
                section.validate(&value).is_ok(),
                "default for {} should validate",
                section.as_str()
            );
        }
    }

    #[test]
    fn test_default_hearts_config() {
        let config = HeartsConfig::default();
        assert_eq!(config.max_hearts, 5);
        assert_eq!(config.refill_cost_gems, 500);
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!(
            "currencies".parse::<SettingsSection>().unwrap(),
            SettingsSection::Currencies
        );
        assert!("payments".parse::<SettingsSection>().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_fields() {
        let payload = json!({"payments_enabled": true, "bogus": 1});
        assert!(SettingsSection::General.validate(&payload).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_webhook_url() {
        let payload = json!({"endpoint_url": "not a url"});
        assert!(SettingsSection::Webhooks.validate(&payload).is_err());
    }

    #[test]
    fn test_validate_accepts_partial_payload() {
        // serde(default) fills the rest; PATCH payloads are partial by design
        let payload = json!({"sandbox_mode": false});
        assert!(SettingsSection::General.validate(&payload).is_ok());
    }

    #[test]
    fn test_shallow_merge_replaces_top_level() {
        let mut base = json!({"a": {"x": 1}, "b": 2});
        shallow_merge(&mut base, &json!({"a": {"y": 3}}));
        // nested object is replaced wholesale, not merged
        assert_eq!(base, json!({"a": {"y": 3}, "b": 2}));
    }

    #[test]
    fn test_merge_one_level_merges_nested_objects() {
        let mut base = json!({"gems": {"enabled": true, "starting_balance": 500}});
        merge_one_level(&mut base, &json!({"gems": {"starting_balance": 750}}));
        assert_eq!(
            base,
            json!({"gems": {"enabled": true, "starting_balance": 750}})
        );
    }

    #[test]
    fn test_merge_one_level_replaces_scalars() {
        let mut base = json!({"default_region": "US", "tax_inclusive": false});
        merge_one_level(&mut base, &json!({"default_region": "EU"}));
        assert_eq!(base["default_region"], "EU");
        assert_eq!(base["tax_inclusive"], false);
    }

    #[test]
    fn test_mask_secret_fields() {
        let mut value = json!({
            "stripe": {"enabled": true, "api_key": "pk_live_abc", "secret_key": "sk_live_def"},
            "paypal": {"enabled": false, "api_key": "", "secret_key": ""}
        });
        mask_secret_fields(&mut value);
        assert_eq!(value["stripe"]["api_key"], MASKED);
        assert_eq!(value["stripe"]["secret_key"], MASKED);
        // empty secrets stay empty so the UI can tell "unset" from "set"
        assert_eq!(value["paypal"]["api_key"], "");
        assert_eq!(value["stripe"]["enabled"], true);
    }

    #[test]
    fn test_hearts_config_falls_back_to_defaults() {
        let settings = PaymentSettings {
            id: SettingsId::new(1),
            is_active: true,
            version: 1,
            general: json!({}),
            providers: json!({}),
            currencies: json!({"hearts": {"max_hearts": 10}}),
            regional: json!({}),
            webhooks: json!({}),
            security: json!({}),
            notifications: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let config = settings.hearts_config();
        assert_eq!(config.max_hearts, 10);
        assert_eq!(config.refill_cost_gems, 500);
    }
}
