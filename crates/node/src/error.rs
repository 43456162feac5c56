use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("node returned non-success status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not decode node response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid numeric value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid consensus pubkey: {0}")]
    InvalidPubkey(String),
    #[error("bech32 encoding error: {0}")]
    Bech32(#[from] bech32::Error),
    #[error("invalid block time {value:?}: {source}")]
    InvalidTime {
        value: String,
        source: chrono::ParseError,
    },
    #[error("not enough blocks to compute average block time (latest height {latest})")]
    NotEnoughBlocks { latest: i64 },
}
