//! Severity bands over the missed-blocks counter.
//!
//! A ladder of [`SeverityBand`]s partitions `[0, signed_blocks_window]` into
//! contiguous, non-overlapping ranges. A validator only produces a band
//! crossing alert when its counter moves from one band into another, so
//! fluctuation inside a band stays silent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Percent breakpoints of `signed_blocks_window + 1` used for the default ladder.
const DEFAULT_BREAKPOINTS: [f64; 10] = [0.0, 0.5, 1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 100.0];
const DEFAULT_ENTER_EMOJI: [&str; 9] = ["🟡", "🟡", "🟡", "🟠", "🟠", "🟠", "🔴", "🔴", "🔴"];
const DEFAULT_EXIT_EMOJI: [&str; 9] = ["🟢", "🟡", "🟡", "🟡", "🟡", "🟠", "🟠", "🟠", "🟠"];

/// One inclusive range of the missed-blocks counter with its alert styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub start: i64,
    pub end: i64,
    /// Shown when a validator gets worse and enters this band.
    #[serde(rename = "emoji-start")]
    pub emoji_enter: String,
    /// Shown when a validator recovers into this band from above.
    #[serde(rename = "emoji-end")]
    pub emoji_exit: String,
    #[serde(rename = "desc-start")]
    pub desc_enter: String,
    #[serde(rename = "desc-end")]
    pub desc_exit: String,
}

impl SeverityBand {
    pub fn contains(&self, missed: i64) -> bool {
        missed >= self.start && missed <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BandsError {
    #[error("severity band list is empty")]
    Empty,
    #[error("first severity band should start at 0, got {start}")]
    FirstStartNotZero { start: i64 },
    #[error("last severity band should end at >= {window}, got {end}")]
    LastEndBelowWindow { end: i64, window: i64 },
    #[error("severity band at index {index} ends at {end}, and the next one starts at {next_start}")]
    NotContiguous {
        index: usize,
        end: i64,
        next_start: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("could not find a severity band for missed blocks counter = {missed}")]
    NotFound { missed: i64 },
}

/// Ordered ladder of severity bands, immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityBands(Vec<SeverityBand>);

impl SeverityBands {
    pub fn new(bands: Vec<SeverityBand>) -> Self {
        Self(bands)
    }

    /// Generates the default ladder for a signing window.
    ///
    /// Breakpoints are `floor((window + 1) * p / 100)` for the percents in
    /// [`DEFAULT_BREAKPOINTS`]. Bands that would be empty for small windows
    /// are left out, so the result always passes [`SeverityBands::validate`].
    pub fn default_for_window(signed_blocks_window: i64) -> Self {
        let total_range = (signed_blocks_window.max(0) + 1) as f64;

        let mut bands: Vec<SeverityBand> = Vec::with_capacity(DEFAULT_ENTER_EMOJI.len());
        let mut first_upper_percent = None;
        let mut next_start = 0;

        let styles = DEFAULT_ENTER_EMOJI.iter().zip(DEFAULT_EXIT_EMOJI.iter());
        for (percents, (emoji_enter, emoji_exit)) in DEFAULT_BREAKPOINTS.windows(2).zip(styles) {
            let &[lower, upper] = percents else {
                continue;
            };

            let end = (total_range * upper / 100.0).floor() as i64 - 1;
            if end < next_start {
                continue;
            }

            first_upper_percent.get_or_insert(upper);
            bands.push(SeverityBand {
                start: next_start,
                end,
                emoji_enter: (*emoji_enter).to_owned(),
                emoji_exit: (*emoji_exit).to_owned(),
                desc_enter: format!("is skipping blocks (> {lower:.1}%)"),
                desc_exit: format!("is recovering (< {upper:.1}%)"),
            });
            next_start = end + 1;
        }

        // The lowest band is the healthy floor, whichever breakpoint it ends at.
        if let (Some(first), Some(upper)) = (bands.first_mut(), first_upper_percent) {
            let [floor_lower, ..] = DEFAULT_BREAKPOINTS;
            let [floor_enter, ..] = DEFAULT_ENTER_EMOJI;
            let [floor_exit, ..] = DEFAULT_EXIT_EMOJI;

            first.emoji_enter = floor_enter.to_owned();
            first.emoji_exit = floor_exit.to_owned();
            first.desc_enter = format!("is skipping blocks (> {floor_lower:.1}%)");
            first.desc_exit = format!("is recovered (< {upper:.1}%)");
        }

        Self(bands)
    }

    /// Checks that the ladder is non-empty, starts at 0, reaches the window and
    /// has no gaps or overlaps between adjacent bands.
    pub fn validate(&self, signed_blocks_window: i64) -> Result<(), BandsError> {
        let (Some(first), Some(last)) = (self.0.first(), self.0.last()) else {
            return Err(BandsError::Empty);
        };

        if first.start != 0 {
            return Err(BandsError::FirstStartNotZero { start: first.start });
        }

        if last.end < signed_blocks_window {
            return Err(BandsError::LastEndBelowWindow {
                end: last.end,
                window: signed_blocks_window,
            });
        }

        for (index, pair) in self.0.windows(2).enumerate() {
            if let [current, next] = pair {
                if current.end.checked_add(1) != Some(next.start) {
                    return Err(BandsError::NotContiguous {
                        index,
                        end: current.end,
                        next_start: next.start,
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the band containing `missed`.
    pub fn lookup(&self, missed: i64) -> Result<&SeverityBand, LookupError> {
        self.0
            .iter()
            .find(|band| band.contains(missed))
            .ok_or(LookupError::NotFound { missed })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeverityBand> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SeverityBand>> for SeverityBands {
    fn from(bands: Vec<SeverityBand>) -> Self {
        Self::new(bands)
    }
}
