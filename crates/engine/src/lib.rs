//! Validator state-diff and classification engine.
//!
//! Turns two time-separated snapshots of validator signing status into a
//! small, prioritized list of [`ReportEntry`] events:
//!
//! ```text
//!   SnapshotSource::fetch_snapshot()
//!     -> MonitorFilter           (drop validators nobody asked for)
//!     -> ClassificationEngine    (seed on first poll, diff afterwards)
//!        -> tombstoning > jailing/unjailing > severity band crossing
//!     -> Report                  (sorted by validator address)
//! ```
//!
//! The engine performs no I/O of its own; fetching and delivery live in the
//! `mbc-node` and `mbc-reporters` crates.

pub mod bands;
pub mod classifier;
pub mod engine;
pub mod filter;
pub mod jail;
pub mod report;
pub mod snapshot;

pub use bands::{BandsError, LookupError, SeverityBand, SeverityBands};
pub use classifier::diff;
pub use engine::{ClassificationEngine, SnapshotSource};
pub use filter::{FilterError, MonitorFilter};
pub use jail::{ChainParams, TimeToJail, estimate_time_to_jail};
pub use report::{Direction, Report, ReportEntry};
pub use snapshot::{SnapshotSet, ValidatorSnapshot};
