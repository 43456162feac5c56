use crate::error::ReportError;
use mbc_engine::{ChainParams, Direction, Report, ReportEntry};

/// A destination for missed blocks reports.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the reporter has everything it needs to deliver messages.
    fn enabled(&self) -> bool;

    /// Renders `report` as the message body this reporter would send.
    fn serialize(&self, report: &Report) -> String;

    /// Sends `report`. Empty reports are not sent.
    async fn send_report(&self, report: &Report) -> Result<(), ReportError>;
}

/// ` (1h2m3s till jail)` for validators getting worse, nothing otherwise.
pub fn till_jail_suffix(entry: &ReportEntry, params: &ChainParams) -> Option<String> {
    if entry.direction != Direction::Increasing {
        return None;
    }

    Some(format!(
        " ({} till jail)",
        params.time_to_jail(entry.missing_blocks)
    ))
}
