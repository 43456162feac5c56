use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain parameters read once at startup and treated as static afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainParams {
    pub signed_blocks_window: i64,
    pub min_signed_per_window: f64,
    pub missed_blocks_to_jail: i64,
    /// Average block production time, in seconds.
    pub avg_block_time: f64,
}

impl ChainParams {
    pub fn new(signed_blocks_window: i64, min_signed_per_window: f64, avg_block_time: f64) -> Self {
        let missed_blocks_to_jail =
            (signed_blocks_window as f64 * (1.0 - min_signed_per_window)).floor() as i64;

        Self {
            signed_blocks_window,
            min_signed_per_window,
            missed_blocks_to_jail,
            avg_block_time,
        }
    }

    pub fn time_to_jail(&self, missed_blocks: i64) -> TimeToJail {
        estimate_time_to_jail(missed_blocks, self.missed_blocks_to_jail, self.avg_block_time)
    }
}

/// Signed duration until a validator becomes eligible for jailing.
///
/// Negative when the counter is already past the threshold, which happens
/// when the signing window moves before the chain jails the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeToJail {
    seconds: i64,
}

impl TimeToJail {
    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> i64 {
        self.seconds
    }

    pub fn is_overdue(&self) -> bool {
        self.seconds < 0
    }
}

impl fmt::Display for TimeToJail {
    /// Renders as `1h2m3s`, `5m0s` or `42s`, with a leading `-` when negative.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 0 {
            write!(f, "-")?;
        }

        let total = self.seconds.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

        if hours > 0 {
            write!(f, "{hours}h{minutes}m{seconds}s")
        } else if minutes > 0 {
            write!(f, "{minutes}m{seconds}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

/// `avg_block_time * (missed_blocks_to_jail - current_missed)`, truncated to whole seconds.
pub fn estimate_time_to_jail(
    current_missed: i64,
    missed_blocks_to_jail: i64,
    avg_block_time: f64,
) -> TimeToJail {
    let blocks_left = missed_blocks_to_jail.saturating_sub(current_missed);
    let seconds = (avg_block_time * blocks_left as f64).trunc() as i64;
    TimeToJail::from_secs(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_missed_blocks_to_jail_from_min_signed() {
        let params = ChainParams::new(10_000, 0.05, 6.0);
        assert_eq!(params.missed_blocks_to_jail, 9500);

        let params = ChainParams::new(100, 0.5, 6.0);
        assert_eq!(params.missed_blocks_to_jail, 50);
    }

    #[test]
    fn estimates_remaining_time() {
        assert_eq!(estimate_time_to_jail(9000, 9500, 6.0).as_secs(), 3000);
        assert_eq!(estimate_time_to_jail(9499, 9500, 6.5).as_secs(), 6);
    }

    #[test]
    fn past_threshold_is_negative() {
        let eta = estimate_time_to_jail(9550, 9500, 2.0);
        assert_eq!(eta.as_secs(), -100);
        assert!(eta.is_overdue());
    }

    #[test]
    fn formats_like_a_clock() {
        assert_eq!(TimeToJail::from_secs(3723).to_string(), "1h2m3s");
        assert_eq!(TimeToJail::from_secs(3600).to_string(), "1h0m0s");
        assert_eq!(TimeToJail::from_secs(300).to_string(), "5m0s");
        assert_eq!(TimeToJail::from_secs(42).to_string(), "42s");
        assert_eq!(TimeToJail::from_secs(0).to_string(), "0s");
        assert_eq!(TimeToJail::from_secs(-300).to_string(), "-5m0s");
    }

    #[test]
    fn chain_params_delegate_to_estimator() {
        let params = ChainParams::new(10_000, 0.05, 6.0);
        assert_eq!(params.time_to_jail(9400).to_string(), "10m0s");
    }
}
