//! Delivery of missed blocks reports.
//!
//! A [`Reporter`] turns a [`mbc_engine::Report`] into a chat message and
//! sends it. Telegram and Slack are supported; both render validator links
//! through [`ChainInfo`]. The Telegram bot also answers [`Command`]s about
//! the latest snapshot and manages subscriptions.

pub mod commands;
pub mod error;
pub mod link;
pub mod reporter;
pub mod slack;
pub mod subscriptions;
pub mod telegram;

pub use commands::{Command, CommandContext, LatestSnapshot, serve_commands};
pub use error::{ReportError, SubscriptionError};
pub use link::{ChainInfo, ValidatorLink};
pub use reporter::{Reporter, till_jail_suffix};
pub use slack::{SlackConfig, SlackReporter};
pub use subscriptions::{NotificationInfo, SubscriptionFile};
pub use telegram::{TelegramConfig, TelegramReporter};
