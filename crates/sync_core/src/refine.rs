//! Per-event local search for the true ball-contact frame. Only events
//! flagged `to_refine` are candidates; everything else keeps the frame
//! `sync::stamp_events` assigned. `force_to_refine` never gates eligibility
//! — it only widens the search window (see `sync_adapters::impect`).

use crate::config::SyncConfig;
use crate::feature_store::FeatureStore;
use crate::model::Event;

/// Refines `skc_frame` in place for every eligible event, in event order
/// (neighbour clamping depends on `provider_frame` of adjacent events,
/// not on refinement having already run on them).
pub fn refine_events(events: &mut [Event], store: &FeatureStore, config: &SyncConfig) {
    let provider_frames: Vec<Option<i64>> = events.iter().map(|e| e.provider_frame).collect();

    for idx in 0..events.len() {
        let eligible = match events[idx].player_id {
            Some(player_id) if store.ply_id_to_idx.contains_key(&player_id) => events[idx].to_refine,
            _ => false,
        };
        if !eligible {
            continue;
        }

        let before = if idx > 0 { provider_frames[idx - 1].unwrap_or(0) } else { 0 };
        let after = if idx + 1 < events.len() {
            provider_frames[idx + 1].unwrap_or(store.nb_frames as i64)
        } else {
            store.nb_frames as i64
        };

        if let Some(refined) = refine_one(&events[idx], store, config, before, after) {
            events[idx].skc_frame = Some(refined);
        }
    }
}

fn refine_one(event: &Event, store: &FeatureStore, config: &SyncConfig, before: i64, after: i64) -> Option<i64> {
    let provider_frame = event.provider_frame?;
    let offset_refine = event.offset_refine.unwrap_or(config.window_offset);
    let ply_idx = *store.ply_id_to_idx.get(&event.player_id?)?;

    let lo = 0.max(provider_frame - offset_refine).max(before + 1);
    let hi = (store.nb_frames as i64).min(provider_frame + offset_refine).min(after - 1);
    if hi - lo < 1 {
        return None;
    }
    let (lo, hi) = (lo as usize, hi as usize);

    if !detected_enough(store, lo, hi, ply_idx, config.is_detected_th) {
        return None;
    }

    let mask = distance_mask(store, lo, hi, ply_idx, config.dist_ball_th)?;
    let ball_acc = masked_ball_acc(store, lo, hi, &mask)?;

    let best = argmax_near_last_streak(&ball_acc, config.local_offset_frame_past)?;
    if ball_acc[best] < config.ball_acc_th {
        return None;
    }
    Some(lo as i64 + best as i64)
}

fn detected_enough(store: &FeatureStore, lo: usize, hi: usize, ply_idx: usize, th: f64) -> bool {
    let window = hi - lo;
    if window == 0 {
        return false;
    }
    let detected_count = (lo..hi).filter(|&f| store.detected[[f, ply_idx]]).count();
    (detected_count as f64 / window as f64) > th
}

/// `true` at index `i` (relative to `lo`) means that frame is masked out
/// (too far from the ball). Returns `None` if every frame in the window
/// is masked.
fn distance_mask(store: &FeatureStore, lo: usize, hi: usize, ply_idx: usize, th: f64) -> Option<Vec<bool>> {
    let mask: Vec<bool> = (lo..hi).map(|f| !(store.ply_dist_to_ball(f, ply_idx) <= th)).collect();
    if mask.iter().all(|&m| m) {
        None
    } else {
        Some(mask)
    }
}

/// Ball acceleration-to-refine in the window, with masked-out frames set
/// to NaN. Returns `None` if nothing survives.
fn masked_ball_acc(store: &FeatureStore, lo: usize, hi: usize, mask: &[bool]) -> Option<Vec<f64>> {
    let values: Vec<f64> = (lo..hi)
        .zip(mask)
        .map(|(f, &masked)| if masked { f64::NAN } else { store.ball_acc_refine(f) })
        .collect();
    if values.iter().all(|v| v.is_nan()) {
        None
    } else {
        Some(values)
    }
}

/// Finds the last finite index, restricts attention to the
/// `local_offset_frame_past` frames before it (inclusive), and returns the
/// argmax within that sub-range.
fn argmax_near_last_streak(ball_acc: &[f64], local_offset_frame_past: i64) -> Option<usize> {
    let last_idx = ball_acc.iter().rposition(|v| v.is_finite())?;
    let sub_lo = last_idx.saturating_sub(local_offset_frame_past.max(0) as usize);

    let mut best_idx = None;
    let mut best_val = f64::NEG_INFINITY;
    for (i, &v) in ball_acc.iter().enumerate().take(last_idx + 1).skip(sub_lo) {
        if v.is_finite() && v > best_val {
            best_val = v;
            best_idx = Some(i);
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BallSample, GenericEventType, MatchCatalogue, PlayerCatalogueEntry, PlayerSample, TrackingFrame};

    fn catalogue() -> MatchCatalogue {
        MatchCatalogue {
            pitch_length: 105.0,
            pitch_width: 68.0,
            home_team_id: 1,
            away_team_id: 2,
            home_team_side: vec![],
            players: vec![PlayerCatalogueEntry {
                id: 1,
                team_id: 1,
                number: 9,
                start_time: Some(0.0),
                short_name: None,
            }],
        }
    }

    /// Ball sits on the player from frame 40..45, accelerating sharply at
    /// frame 44 as it's played away, then drifts far.
    fn tracking_with_contact_near(contact_frame: usize, total: usize) -> Vec<TrackingFrame> {
        (0..total)
            .map(|f| {
                let close = f >= contact_frame.saturating_sub(5) && f <= contact_frame + 1;
                let ball_x = if close { 0.0 } else { 50.0 + f as f64 };
                TrackingFrame {
                    frame: f,
                    period: Some(1),
                    player_data: vec![PlayerSample { player_id: 1, x: 0.0, y: 0.0, is_detected: true }],
                    ball_data: BallSample { x: Some(ball_x), y: Some(0.0), z: Some(0.0) },
                }
            })
            .collect()
    }

    #[test]
    fn no_refinement_when_player_never_detected() {
        let total = 60;
        let mut frames = tracking_with_contact_near(40, total);
        for tf in frames.iter_mut() {
            for p in tf.player_data.iter_mut() {
                p.is_detected = false;
            }
        }
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();

        let mut event = Event::new(
            "e1",
            1,
            4.0,
            GenericEventType::Pass,
            "pass",
            Some(1),
            Some(1),
            Some(1),
            Some(1),
            crate::model::Coordinate::Known(0.0, 0.0),
        );
        event.to_refine = true;
        event.offset_refine = Some(10);
        event.provider_frame = Some(40);
        event.skc_frame = Some(40);

        let mut events = vec![event];
        refine_events(&mut events, &store, &config);
        assert_eq!(events[0].skc_frame, Some(40));
    }

    /// An ordinary impect pass (`force_to_refine == false`) must still be
    /// refined — eligibility is gated on `to_refine` alone.
    #[test]
    fn to_refine_without_force_to_refine_still_refines() {
        let total = 60;
        let frames = tracking_with_contact_near(40, total);
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();

        let mut event = Event::new(
            "e1",
            1,
            4.0,
            GenericEventType::Pass,
            "PASS",
            Some(1),
            Some(1),
            Some(1),
            Some(1),
            crate::model::Coordinate::Known(0.0, 0.0),
        );
        event.to_refine = true;
        event.force_to_refine = false;
        event.offset_refine = Some(10);
        event.provider_frame = Some(40);
        event.skc_frame = Some(40);

        let mut events = vec![event];
        refine_events(&mut events, &store, &config);
        assert_ne!(events[0].skc_frame, Some(40));
    }
}
