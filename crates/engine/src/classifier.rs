//! Pure classification of one snapshot generation against the previous one.

use crate::bands::SeverityBands;
use crate::report::{
    Direction, JAILED_DESC, JAILED_EMOJI, Report, ReportEntry, TOMBSTONED_DESC, TOMBSTONED_EMOJI,
    UNJAILED_DESC, UNJAILED_EMOJI,
};
use crate::snapshot::{SnapshotSet, ValidatorSnapshot};
use tracing::{debug, error, trace};

/// Compares `current` against `previous` and returns the notable transitions.
///
/// Validators missing from `previous` are skipped. Per validator the first
/// matching rule wins: tombstoning, then jailing edges, then band crossing.
pub fn diff(previous: &SnapshotSet, current: &SnapshotSet, bands: &SeverityBands) -> Report {
    let mut entries = Vec::new();

    for (address, new_state) in current.iter() {
        let Some(old_state) = previous.get(address) else {
            debug!(address = %address, "no previous state for validator, skipping");
            continue;
        };

        match classify(old_state, new_state, bands) {
            Some(entry) => entries.push(entry),
            None => trace!(address = %address, "no report entry for validator"),
        }
    }

    Report::new(entries)
}

/// Classifies a single validator transition.
pub fn classify(
    old_state: &ValidatorSnapshot,
    new_state: &ValidatorSnapshot,
    bands: &SeverityBands,
) -> Option<ReportEntry> {
    trace!(?old_state, ?new_state, "processing validator report entry");

    let address = new_state.consensus_address.as_str();

    if new_state.tombstoned && !old_state.tombstoned {
        debug!(address, "validator is tombstoned");
        return Some(entry(new_state, TOMBSTONED_EMOJI, TOMBSTONED_DESC, Direction::Tombstoned));
    }

    match (old_state.jailed, new_state.jailed) {
        (false, true) => {
            debug!(address, "validator is jailed");
            return Some(entry(new_state, JAILED_EMOJI, JAILED_DESC, Direction::Jailed));
        }
        (true, false) => {
            debug!(address, "validator is unjailed");
            return Some(entry(new_state, UNJAILED_EMOJI, UNJAILED_DESC, Direction::Unjailed));
        }
        (true, true) => {
            debug!(address, "validator is and was jailed, no need to send report");
            return None;
        }
        (false, false) => {}
    }

    let old_band = match bands.lookup(old_state.missed_blocks) {
        Ok(band) => band,
        Err(err) => {
            error!(address, error = %err, "could not get previous severity band");
            return None;
        }
    };
    let new_band = match bands.lookup(new_state.missed_blocks) {
        Ok(band) => band,
        Err(err) => {
            error!(address, error = %err, "could not get current severity band");
            return None;
        }
    };

    if old_band.start == new_band.start {
        debug!(
            address,
            before = old_state.missed_blocks,
            after = new_state.missed_blocks,
            "validator did not change severity band, no need to send report"
        );
        return None;
    }

    // A falling counter means the window moved past earlier misses.
    if old_state.missed_blocks < new_state.missed_blocks {
        debug!(
            address,
            before = old_state.missed_blocks,
            after = new_state.missed_blocks,
            "validator's missed blocks increasing"
        );
        Some(entry(
            new_state,
            &new_band.emoji_enter,
            &new_band.desc_enter,
            Direction::Increasing,
        ))
    } else {
        debug!(
            address,
            before = old_state.missed_blocks,
            after = new_state.missed_blocks,
            "validator's missed blocks decreasing"
        );
        Some(entry(
            new_state,
            &new_band.emoji_exit,
            &new_band.desc_exit,
            Direction::Decreasing,
        ))
    }
}

fn entry(
    state: &ValidatorSnapshot,
    emoji: &str,
    description: &str,
    direction: Direction,
) -> ReportEntry {
    ReportEntry {
        validator_address: state.operator_address.clone(),
        validator_moniker: state.moniker.clone(),
        consensus_address: state.consensus_address.clone(),
        emoji: emoji.to_owned(),
        description: description.to_owned(),
        missing_blocks: state.missed_blocks,
        direction,
    }
}
