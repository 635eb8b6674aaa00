//! Domain types for the Chirp API.
//!
//! Row types derive `sqlx::FromRow` where they are read straight from the
//! database; pure domain logic (report triage, settings merging, promo price
//! resolution) lives next to the types it operates on.

pub mod lesson;
pub mod plan;
pub mod purchase;
pub mod report;
pub mod settings;
pub mod shop;
pub mod user;

pub use lesson::{LessonView, UnitView};
pub use plan::SubscriptionPlan;
pub use purchase::{DeviceType, PaymentMethod, Platform, Purchase};
pub use report::{Report, ReportPriority, ReportStatus, ReportType};
pub use settings::{PaymentSettings, SettingsSection};
pub use shop::{ItemCategory, ShopItem};
pub use user::{Balances, CurrentUser, User};
