//! Time and duration conversion utilities.
//!
//! Conversions here saturate instead of truncating, matching how the
//! playback timer reports its cadence in logs and in the UI.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Number of ticks needed for progress to go from 0 to 100 percent.
///
/// Returns 0 for a non-positive or non-finite increment.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ticks_per_scene(tick_increment: f64) -> u32 {
    if !tick_increment.is_finite() || tick_increment <= 0.0 {
        return 0;
    }
    (100.0 / tick_increment).ceil().min(f64::from(u32::MAX)) as u32
}

/// Wall-clock time one scene takes to play through at the given cadence.
///
/// Pacing depends only on the tick interval and increment; a scene's
/// configured duration does not enter into it.
#[must_use]
pub fn scene_wall_time(tick_interval: Duration, tick_increment: f64) -> Duration {
    tick_interval.saturating_mul(ticks_per_scene(tick_increment))
}
