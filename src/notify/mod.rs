//! Outbound notification: Telegram sink and recipient registry.

pub mod recipients;
pub mod telegram;

pub use recipients::{Recipient, RecipientStore};
pub use telegram::{format_signal, TelegramNotifier};
