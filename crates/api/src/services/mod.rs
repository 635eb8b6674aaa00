//! Application services.

pub mod email;
pub mod shop;

pub use email::EmailService;
pub use shop::ShopService;
