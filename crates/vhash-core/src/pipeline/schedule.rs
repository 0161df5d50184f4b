//! Sampling schedule: how many frames to take and where.

use serde::Serialize;

/// Fewest screenshots any video is sampled with.
pub const MIN_SCREENSHOTS: usize = 2;

/// Number of screenshots to take for a video of `duration_secs` at `strength`.
///
/// Strength is a per-second multiplier, not a percentage. The product is
/// always rounded up so fractional durations never under-sample, and the
/// result never drops below [`MIN_SCREENSHOTS`].
pub fn screenshot_count(duration_secs: f64, strength: f64) -> usize {
    let product = (duration_secs * strength).ceil();
    let raw = if product.is_finite() && product > 0.0 {
        product as usize
    } else {
        0
    };
    raw.max(MIN_SCREENSHOTS)
}

/// Ordered timestamps (seconds) at which frames are captured.
///
/// Timestamps sit at `duration * (i + 1) / (count + 1)`: evenly spaced and
/// strictly inside the video, so neither the first nor the last frame (often
/// black, or past the final decodable packet) is ever requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSchedule {
    duration: f64,
    timestamps: Vec<f64>,
}

impl SampleSchedule {
    /// Build the schedule for a video of `duration_secs` at `strength`.
    pub fn new(duration_secs: f64, strength: f64) -> Self {
        let count = screenshot_count(duration_secs, strength);
        let duration = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        let step = duration / (count as f64 + 1.0);
        let timestamps = (1..=count).map(|i| step * i as f64).collect();
        Self {
            duration,
            timestamps,
        }
    }

    /// Number of scheduled screenshots.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Always false; a schedule holds at least [`MIN_SCREENSHOTS`] entries.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Scheduled timestamps in ascending order.
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Duration the schedule was built for.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
