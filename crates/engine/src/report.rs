use serde::{Deserialize, Serialize};

pub const TOMBSTONED_EMOJI: &str = "💀";
pub const TOMBSTONED_DESC: &str = "was tombstoned";
pub const JAILED_EMOJI: &str = "❌";
pub const JAILED_DESC: &str = "was jailed";
pub const UNJAILED_EMOJI: &str = "👌";
pub const UNJAILED_DESC: &str = "was unjailed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Crossed into a stricter severity band.
    Increasing,
    /// Crossed into a looser severity band.
    Decreasing,
    Jailed,
    Unjailed,
    Tombstoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Operator address, empty when it could not be resolved.
    pub validator_address: String,
    pub validator_moniker: String,
    pub consensus_address: String,
    pub emoji: String,
    pub description: String,
    pub missing_blocks: i64,
    pub direction: Direction,
}

/// Notable events produced by one diff pass, sorted by validator address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(mut entries: Vec<ReportEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.validator_address
                .cmp(&b.validator_address)
                .then_with(|| a.consensus_address.cmp(&b.consensus_address))
        });
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
