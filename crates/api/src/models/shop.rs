//! Shop catalog entries.

use serde::{Deserialize, Serialize};

use chirp_core::CurrencyKind;

/// What a shop item grants when purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Refills hearts; credited to the balance on checkout.
    Hearts,
    /// Premium subscription trials and upgrades.
    Premium,
    /// XP boosts, streak freezes and similar consumables.
    Boosts,
    /// Gem packs, priced in real currency.
    Gems,
}

/// A configured catalog entry. Read-only from the client's perspective.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShopItem {
    /// Catalog slug, e.g. `heart-refill`.
    pub id: String,
    pub name: String,
    /// Price in the item's currency unit (gems/coins count, or cents for USD).
    pub price: i32,
    pub currency: CurrencyKind,
    pub category: ItemCategory,
    /// Hearts granted per unit for `Hearts` items.
    pub hearts_per_unit: i32,
    pub active: bool,
}

impl ShopItem {
    /// Total price for `quantity` units.
    ///
    /// Saturates rather than wrapping; a catalog price high enough to
    /// saturate would already fail the affordability check.
    #[must_use]
    pub const fn total_price(&self, quantity: i32) -> i32 {
        self.price.saturating_mul(quantity)
    }
}
