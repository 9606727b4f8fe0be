//! Tunable constants behind a single struct, instead of scattered through
//! the algorithm modules, so a caller can override dataset-specific values
//! (the default-start table in particular) without forking the crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tracking sample rate, in frames per second. Fixed by the tracking
/// provider's export format; not expected to vary per dataset.
pub const FPS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Half-kernel width (frames) for the raw velocity central difference.
    pub smoothing_speed: usize,
    /// Half-kernel width (frames) for the reported acceleration.
    pub smoothing_acc: usize,
    /// Half-kernel width (frames) for the refinement-only acceleration.
    pub smoothing_acc_refine: usize,
    /// Speeds above this are physically implausible for a player (m/s).
    pub impossible_speed_th: f64,
    /// Distance (m) under which a player is considered "close to the ball"
    /// for offset synchronization purposes.
    pub th_dist_ply_ball: f64,
    /// Distance (m) used by the matcher's `is_matched` window check.
    pub th_is_matched: f64,
    /// Minimum pass count per rostered player for a period's coarse
    /// estimate to use that player, keyed by period.
    pub min_pass_per_period: HashMap<u8, usize>,
    /// Fallback period-start frame used when no player clears
    /// `min_pass_per_period`, keyed by period. Dataset-specific.
    pub default_start: HashMap<u8, i64>,
    /// Half-window (frames) searched around the coarse estimate during
    /// fine refinement, and around each candidate period start.
    pub search_offset: i64,
    /// Half-window (frames) searched per event during event refinement,
    /// absent provider-specific overrides (`Event::offset_refine`).
    pub window_offset: i64,
    /// Distance (m) beyond which a frame is masked out of the refinement
    /// window.
    pub dist_ball_th: f64,
    /// Minimum fraction of the refinement window the player must be
    /// detected in for refinement to proceed.
    pub is_detected_th: f64,
    /// Minimum ball acceleration (m/s^2) required at the refined frame.
    pub ball_acc_th: f64,
    /// How many frames before the last ball-close frame to search for the
    /// acceleration peak.
    pub local_offset_frame_past: i64,
    /// Half-window (frames) used by the matcher's `is_matched` check.
    pub matcher_offset: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            smoothing_speed: 2,
            smoothing_acc: 8,
            smoothing_acc_refine: 2,
            impossible_speed_th: 10.5,
            th_dist_ply_ball: 2.5,
            th_is_matched: 3.5,
            min_pass_per_period: HashMap::from([(1, 10), (2, 10), (3, 5), (4, 5)]),
            default_start: HashMap::from([(1, 0), (2, 27_000), (3, 54_000), (4, 63_000)]),
            search_offset: 25,
            window_offset: 10,
            dist_ball_th: 3.0,
            is_detected_th: 0.5,
            ball_acc_th: 7.0,
            local_offset_frame_past: 5,
            matcher_offset: 5,
        }
    }
}

impl SyncConfig {
    pub fn min_pass_for(&self, period: u8) -> usize {
        *self.min_pass_per_period.get(&period).unwrap_or(&usize::MAX)
    }

    pub fn default_start_for(&self, period: u8) -> i64 {
        *self.default_start.get(&period).unwrap_or(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_published_constants() {
        let config = SyncConfig::default();
        assert_eq!(config.default_start_for(2), 27_000);
        assert_eq!(config.min_pass_for(3), 5);
    }
}
