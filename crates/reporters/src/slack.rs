use crate::error::ReportError;
use crate::link::{ChainInfo, ValidatorLink};
use crate::reporter::{Reporter, till_jail_suffix};
use mbc_engine::{ChainParams, Report, ReportEntry};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;
use tracing::debug;

pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SlackConfig {
    /// Bot token, `xoxb-...`.
    pub token: String,
    /// Channel ID or name.
    pub chat: String,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    mrkdwn: bool,
    unfurl_links: bool,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackReporter {
    config: SlackConfig,
    client: Client,
    api_url: String,
    chain_info: ChainInfo,
    params: ChainParams,
}

impl SlackReporter {
    pub fn new(config: SlackConfig, chain_info: ChainInfo, params: ChainParams) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            api_url: SLACK_POST_MESSAGE_URL.to_owned(),
            chain_info,
            params,
        }
    }

    /// Points the reporter at a different `chat.postMessage` endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn serialize_entry(&self, entry: &ReportEntry, out: &mut String) {
        let link = match self.chain_info.link_for(entry) {
            ValidatorLink::Page { url, text } => format!("<{}|{}>", url, escape(&text)),
            ValidatorLink::Text(text) => escape(&text),
            ValidatorLink::Unresolved(address) => format!("`{address}`"),
        };

        let _ = writeln!(
            out,
            "{} *{} {}*{}",
            entry.emoji,
            link,
            escape(&entry.description),
            till_jail_suffix(entry, &self.params).unwrap_or_default(),
        );
    }
}

/// Slack control characters in mrkdwn text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait::async_trait]
impl Reporter for SlackReporter {
    fn name(&self) -> &'static str {
        "SlackReporter"
    }

    fn enabled(&self) -> bool {
        !self.config.token.is_empty() && !self.config.chat.is_empty()
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
            debug!("empty report, not sending slack message");
            return Ok(());
        }

        let text = self.serialize(report);
        let response: PostMessageResponse = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.config.token)
            .json(&PostMessage {
                channel: &self.config.chat,
                text: &text,
                mrkdwn: true,
                unfurl_links: false,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(ReportError::SlackApi(
                response.error.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }

        Ok(())
    }
}
