//! Start-time convergence and tier assignment
//!
//! Every workflow in a batch is given a start delay counted back from one
//! shared target instant. The target is far enough out that the sequential
//! submission loop finishes before it, so the whole batch begins executing at
//! roughly the same moment regardless of submission order.

use crate::types::LaunchMode;
use chrono::{DateTime, Duration, Utc};

/// Number of priority tiers a priority batch is spread across
pub const PRIORITY_TIERS: u8 = 5;

/// Fairness batches never synchronise on less than this many seconds
pub const FAIRNESS_MIN_START_SECS: i64 = 7;

/// Fairness batches never synchronise on more than this many seconds
pub const FAIRNESS_MAX_START_SECS: i64 = 30;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Computes the shared target start instant for a batch
pub struct StartTimeCalculator;

impl StartTimeCalculator {
    /// Lead time before the batch should start.
    ///
    /// Priority mode allows ~50ms per submission plus a 5s buffer.
    /// Fairness mode uses `ceil(0.15 * count - 15)` clamped to `[7, 30]` seconds.
    pub fn lead_time(count: u64, mode: LaunchMode) -> Duration {
        match mode {
            LaunchMode::Priority => {
                let millis = count.saturating_mul(50).saturating_add(5_000);
                i64::try_from(millis)
                    .ok()
                    .and_then(Duration::try_milliseconds)
                    .unwrap_or(Duration::MAX)
            }
            LaunchMode::Fairness => Duration::seconds(Self::fairness_seconds(count)),
        }
    }

    /// Absolute instant the batch should begin executing, saturating at the
    /// latest representable instant
    pub fn target_start(count: u64, mode: LaunchMode, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(Self::lead_time(count, mode))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    // ceil(0.15n - 15) == ceil((3n - 300) / 20), kept in integers so the
    // 200 -> 15s and 300 -> 30s anchors hold exactly.
    fn fairness_seconds(count: u64) -> i64 {
        let numerator = i128::from(count) * 3 - 300;
        let scaled = if numerator <= 0 {
            numerator / 20
        } else {
            (numerator + 19) / 20
        };
        scaled.clamp(
            i128::from(FAIRNESS_MIN_START_SECS),
            i128::from(FAIRNESS_MAX_START_SECS),
        ) as i64
    }
}

/// Computes the per-workflow start delay towards the target instant
pub struct DelayCalculator;

impl DelayCalculator {
    /// Whole seconds from `now` until `target`, never negative
    pub fn delay_seconds(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        let millis = (target - now).num_milliseconds();
        if millis > 0 {
            (millis / 1000) as u64
        } else {
            0
        }
    }
}

/// Maps a priority-mode ordinal to its tier
pub struct TierAssigner;

impl TierAssigner {
    /// Size of each contiguous tier range for a batch of `count`
    pub fn workflows_per_tier(count: u64) -> u64 {
        count.div_ceil(u64::from(PRIORITY_TIERS))
    }

    /// Tier (1..=5) for the 1-based `ordinal` within a batch of `count`
    pub fn tier_for(ordinal: u64, count: u64) -> u8 {
        let per_tier = Self::workflows_per_tier(count).max(1);
        let tier = ordinal.max(1).div_ceil(per_tier);
        tier.min(u64::from(PRIORITY_TIERS)) as u8
    }
}
