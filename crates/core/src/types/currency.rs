//! In-app currency kinds.

use serde::{Deserialize, Serialize};

/// The currency a shop item is priced in.
///
/// `Gems` and `Coins` are soft currencies held on the user document;
/// `Usd` prices are settled by an external payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "currency_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    Gems,
    Coins,
    Usd,
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gems => write!(f, "gems"),
            Self::Coins => write!(f, "coins"),
            Self::Usd => write!(f, "usd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&CurrencyKind::Gems).unwrap(),
            "\"gems\""
        );
        let parsed: CurrencyKind = serde_json::from_str("\"usd\"").unwrap();
        assert_eq!(parsed, CurrencyKind::Usd);
    }
}
