//! Subscription plans with promotional pricing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing cadence for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "billing_period", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

/// A subscription plan as stored in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubscriptionPlan {
    /// Plan slug, e.g. `premium-monthly`.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Regular price in `currency` units.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub billing_period: BillingPeriod,
    pub promo_price: Option<Decimal>,
    pub promo_starts_at: Option<DateTime<Utc>>,
    pub promo_ends_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl SubscriptionPlan {
    /// The price in effect at `now`: the promotional price when `now` lies
    /// within `[promo_starts_at, promo_ends_at)`, otherwise the regular one.
    #[must_use]
    pub fn effective_price(&self, now: DateTime<Utc>) -> Decimal {
        match (self.promo_price, self.promo_starts_at, self.promo_ends_at) {
            (Some(promo), Some(starts), Some(ends)) if starts <= now && now < ends => promo,
            _ => self.price,
        }
    }

    /// Whether the promotional price applies at `now`.
    #[must_use]
    pub fn promo_active(&self, now: DateTime<Utc>) -> bool {
        matches!(
            (self.promo_price, self.promo_starts_at, self.promo_ends_at),
            (Some(_), Some(starts), Some(ends)) if starts <= now && now < ends
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan(promo: Option<(&str, &str)>) -> SubscriptionPlan {
        SubscriptionPlan {
            id: "premium-monthly".to_owned(),
            name: "Premium".to_owned(),
            description: "Ad-free learning".to_owned(),
            price: Decimal::new(999, 2),
            currency: "USD".to_owned(),
            billing_period: BillingPeriod::Monthly,
            promo_price: promo.map(|_| Decimal::new(499, 2)),
            promo_starts_at: promo.map(|(s, _)| s.parse().unwrap()),
            promo_ends_at: promo.map(|(_, e)| e.parse().unwrap()),
            active: true,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_promo_price_within_window() {
        let p = plan(Some(("2026-08-01T00:00:00Z", "2026-09-01T00:00:00Z")));
        assert_eq!(p.effective_price(at(2026, 8, 15)), Decimal::new(499, 2));
    }

    #[test]
    fn test_regular_price_outside_window() {
        let p = plan(Some(("2026-08-01T00:00:00Z", "2026-09-01T00:00:00Z")));
        assert_eq!(p.effective_price(at(2026, 9, 15)), Decimal::new(999, 2));
        assert_eq!(p.effective_price(at(2026, 7, 15)), Decimal::new(999, 2));
    }

    #[test]
    fn test_window_end_is_exclusive() {
        let p = plan(Some(("2026-08-01T00:00:00Z", "2026-09-01T12:00:00Z")));
        assert_eq!(p.effective_price(at(2026, 9, 1)), Decimal::new(999, 2));
    }

    #[test]
    fn test_no_promo_configured() {
        let p = plan(None);
        assert_eq!(p.effective_price(at(2026, 8, 15)), Decimal::new(999, 2));
        assert!(!p.promo_active(at(2026, 8, 15)));
    }
}
