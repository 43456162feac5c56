use crate::error::ReportError;
use crate::link::{ChainInfo, ValidatorLink};
use crate::reporter::{Reporter, till_jail_suffix};
use crate::subscriptions::SubscriptionFile;
use mbc_engine::{ChainParams, Report, ReportEntry};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use teloxide::{Bot, prelude::*, types::ParseMode, utils::html};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub token: String,
    pub chat: i64,
    /// Subscription file, see [`SubscriptionFile`]. Optional.
    pub config_path: String,
}

pub struct TelegramReporter {
    config: TelegramConfig,
    bot: Bot,
    chain_info: ChainInfo,
    params: ChainParams,
    subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
}

impl TelegramReporter {
    pub fn new(
        config: TelegramConfig,
        chain_info: ChainInfo,
        params: ChainParams,
        subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
    ) -> Self {
        Self {
            bot: Bot::new(config.token.clone()),
            config,
            chain_info,
            params,
            subscriptions,
        }
    }

    fn serialize_entry(&self, entry: &ReportEntry, out: &mut String) {
        let link = html_link(&self.chain_info.link_for(entry));

        let _ = write!(
            out,
            "{} <strong>{} {}</strong>{}",
            entry.emoji,
            link,
            html::escape(&entry.description),
            till_jail_suffix(entry, &self.params).unwrap_or_default(),
        );

        if let Some(Ok(subscriptions)) = self.subscriptions.as_ref().map(|s| s.lock()) {
            for notifier in subscriptions.notifiers(&entry.validator_address) {
                let _ = write!(out, " @{}", notifier.trim_start_matches('@'));
            }
        }

        out.push('\n');
    }
}

pub(crate) fn html_link(link: &ValidatorLink) -> String {
    match link {
        ValidatorLink::Page { url, text } => {
            format!("<a href=\"{}\">{}</a>", html::escape(url), html::escape(text))
        }
        ValidatorLink::Text(text) => html::escape(text),
        ValidatorLink::Unresolved(address) => format!("<code>{}</code>", html::escape(address)),
    }
}

#[async_trait::async_trait]
impl Reporter for TelegramReporter {
    fn name(&self) -> &'static str {
        "TelegramReporter"
    }

    fn enabled(&self) -> bool {
        !self.config.token.is_empty() && self.config.chat != 0
    }

    fn serialize(&self, report: &Report) -> String {
        let mut message = String::new();
        for entry in &report.entries {
            self.serialize_entry(entry, &mut message);
        }
        message
    }

    async fn send_report(&self, report: &Report) -> Result<(), ReportError> {
        if report.is_empty() {
            debug!("empty report, not sending telegram message");
            return Ok(());
        }

        self.bot
            .send_message(ChatId(self.config.chat), self.serialize(report))
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
