//! Final quality flags: `is_matched`, `is_player_detected`,
//! `frame_tracking_data_available`, `has_provider_player_id`. Read-only
//! over the feature store; writes only to the event list.

use crate::config::SyncConfig;
use crate::feature_store::FeatureStore;
use crate::model::Event;

/// NaN distances are replaced by this sentinel purely to keep the
/// threshold comparison branch-free; it never leaves this function.
const NAN_DIST_SENTINEL: f64 = 100.0;

pub fn match_events(events: &mut [Event], store: &FeatureStore, config: &SyncConfig) {
    for event in events.iter_mut() {
        let ply_idx = event.player_id.and_then(|id| store.ply_id_to_idx.get(&id).copied());

        event.has_provider_player_id = Some(event.provider_player_id.is_some());

        let Some(ply_idx) = ply_idx else {
            event.is_matched = Some(false);
            event.is_player_detected = Some(false);
            event.frame_tracking_data_available = Some(frame_tracking_data_available(event, store));
            continue;
        };

        event.is_matched = Some(is_matched(event, store, ply_idx, config.matcher_offset, config.th_is_matched));
        event.is_player_detected = Some(is_player_detected(event, store, ply_idx));
        event.frame_tracking_data_available = Some(frame_tracking_data_available(event, store));
    }
}

fn is_matched(event: &Event, store: &FeatureStore, ply_idx: usize, offset: i64, threshold: f64) -> bool {
    let Some(skc_frame) = event.skc_frame else { return false };
    let lo = (skc_frame - offset).max(0);
    let hi = (skc_frame + offset).min(store.nb_frames as i64);
    (lo..hi).any(|f| {
        let d = store.ply_dist_to_ball(f as usize, ply_idx);
        let d = if d.is_nan() { NAN_DIST_SENTINEL } else { d };
        d <= threshold
    })
}

fn is_player_detected(event: &Event, store: &FeatureStore, ply_idx: usize) -> bool {
    match event.skc_frame {
        Some(frame) if frame >= 0 && (frame as usize) < store.nb_frames => store.detected[[frame as usize, ply_idx]],
        _ => false,
    }
}

fn frame_tracking_data_available(event: &Event, store: &FeatureStore) -> bool {
    match event.skc_frame {
        Some(frame) if frame >= 0 && (frame as usize) < store.nb_frames => {
            let f = frame as usize;
            (0..store.nb_players).any(|p| store.positions[[f, p, 0]].is_finite() || store.positions[[f, p, 1]].is_finite())
        }
        _ => false,
    }
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

    fn base_event() -> Event {
        Event::new(
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
        )
    }

    #[test]
    fn unmapped_player_is_never_matched() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 0.0, y: 0.0, is_detected: true }],
            ball_data: BallSample { x: Some(0.0), y: Some(0.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();

        let mut event = base_event();
        event.player_id = Some(999); // not rostered
        event.skc_frame = Some(0);
        event.provider_player_id = Some(999);
        let mut events = vec![event];
        match_events(&mut events, &store, &config);

        assert_eq!(events[0].is_matched, Some(false));
        assert_eq!(events[0].is_player_detected, Some(false));
        assert_eq!(events[0].has_provider_player_id, Some(true));
    }

    #[test]
    fn skc_frame_one_past_last_frame_is_safe() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 0.0, y: 0.0, is_detected: true }],
            ball_data: BallSample { x: Some(0.0), y: Some(0.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();

        let mut event = base_event();
        event.skc_frame = Some(store.nb_frames as i64); // one past the last frame
        let mut events = vec![event];
        match_events(&mut events, &store, &config);

        assert_eq!(events[0].is_player_detected, Some(false));
        assert_eq!(events[0].frame_tracking_data_available, Some(false));
    }

    #[test]
    fn matched_when_close_within_window() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 1.0, y: 0.0, is_detected: true }],
            ball_data: BallSample { x: Some(1.0), y: Some(0.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();

        let mut event = base_event();
        event.skc_frame = Some(0);
        let mut events = vec![event];
        match_events(&mut events, &store, &config);
        assert_eq!(events[0].is_matched, Some(true));
    }
}
