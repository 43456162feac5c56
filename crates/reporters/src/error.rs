use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("slack request failed: {0}")]
    SlackHttp(#[from] reqwest::Error),
    #[error("slack api returned an error: {0}")]
    SlackApi(String),
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("could not access subscription file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse subscription file: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("could not serialize subscriptions: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
