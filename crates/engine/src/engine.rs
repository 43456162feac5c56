use crate::bands::SeverityBands;
use crate::classifier::diff;
use crate::filter::MonitorFilter;
use crate::report::Report;
use crate::snapshot::SnapshotSet;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Source of fresh validator snapshots, usually a chain node.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    type Error: Display + Send;

    async fn fetch_snapshot(&self) -> Result<SnapshotSet, Self::Error>;
}

/// Holds the last known snapshot and diffs every new one against it.
///
/// Each monitored chain owns its own engine; nothing is shared between
/// instances.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    bands: SeverityBands,
    filter: MonitorFilter,
    previous: Option<SnapshotSet>,
}

impl ClassificationEngine {
    /// `bands` must already be validated against the chain's signing window.
    pub fn new(bands: SeverityBands, filter: MonitorFilter) -> Self {
        Self {
            bands,
            filter,
            previous: None,
        }
    }

    pub fn bands(&self) -> &SeverityBands {
        &self.bands
    }

    pub fn filter(&self) -> &MonitorFilter {
        &self.filter
    }

    /// The retained snapshot, `None` until the first successful poll.
    pub fn previous(&self) -> Option<&SnapshotSet> {
        self.previous.as_ref()
    }

    /// Runs one poll cycle against `source`.
    ///
    /// A failed fetch yields an empty report and leaves the retained
    /// snapshot untouched, so the next cycle compares against the latest
    /// data that was actually observed.
    pub async fn tick<S>(&mut self, source: &S) -> Report
    where
        S: SnapshotSource + ?Sized,
    {
        debug!("querying for signing infos");

        match source.fetch_snapshot().await {
            Ok(snapshot) => self.advance(snapshot),
            Err(error) => {
                warn!(error = %error, "could not fetch validators state, skipping report");
                Report::default()
            }
        }
    }

    /// Filters `current`, diffs it against the retained snapshot and makes it
    /// the new retained snapshot.
    ///
    /// The first snapshot after start only seeds the engine and never
    /// produces entries.
    pub fn advance(&mut self, mut current: SnapshotSet) -> Report {
        current.retain(|validator| self.filter.is_monitored(&validator.operator_address));

        let report = match self.previous.as_ref() {
            Some(previous) => diff(previous, &current, &self.bands),
            None => {
                info!(validators = current.len(), "no previous state, seeding and skipping report");
                Report::default()
            }
        };

        self.previous = Some(current);
        report
    }
}
