//! Freeze-frame stream: one row per applicable event, carrying the full
//! tracking snapshot at `skc_frame` plus the event's own identifiers and
//! quality flags, so a consumer can render "who was where" at the moment
//! skillcorner believes the event actually happened.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attacking_side::AttackingSideResolver;
use crate::feature_store::{FeatureStore, IDX_ACC, IDX_SPEED, IDX_VX, IDX_VY};
use crate::model::{Event, MatchCatalogue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeFramePlayer {
    pub player_id: u64,
    pub team_id: u64,
    pub x: f64,
    pub y: f64,
    pub is_detected: bool,
    pub speed: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub acc: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeFrame {
    pub event_id: String,
    pub event_type_name: String,
    pub period: u8,
    pub skc_frame: i64,
    pub is_matched: Option<bool>,
    pub is_player_detected: Option<bool>,
    pub event_x: Option<f64>,
    pub event_y: Option<f64>,
    pub ball_x: f64,
    pub ball_y: f64,
    pub players: Vec<FreezeFramePlayer>,
}

/// One frame is emitted per event that both reached a synchronized frame
/// and is flagged applicable; events with `skc_frame == None` (never
/// stamped, e.g. no period match at all) or out of range are skipped
/// rather than padded with an empty frame.
pub fn build_freeze_frames(
    events: &[Event],
    catalogue: &MatchCatalogue,
    store: &FeatureStore,
    resolver: &AttackingSideResolver,
) -> Vec<FreezeFrame> {
    let id_to_team: HashMap<u64, u64> = catalogue.players.iter().map(|p| (p.id, p.team_id)).collect();

    events
        .iter()
        .filter(|event| event.is_matched_applicable)
        .filter_map(|event| {
            let frame = event.skc_frame?;
            if frame < 0 || frame as usize >= store.nb_frames {
                return None;
            }
            let frame = frame as usize;

            let projected = event
                .team_id
                .zip(event.position.xy())
                .and_then(|(team_id, (x, y))| resolver.project(event.period, team_id, x, y));

            let players = store
                .ply_id_to_idx
                .iter()
                .filter_map(|(&player_id, &idx)| {
                    let team_id = *id_to_team.get(&player_id)?;
                    let x = store.positions[[frame, idx, 0]];
                    let y = store.positions[[frame, idx, 1]];
                    let speed = store.ply_kin[[frame, idx, IDX_SPEED]];
                    let vx = store.ply_kin[[frame, idx, IDX_VX]];
                    let vy = store.ply_kin[[frame, idx, IDX_VY]];
                    let acc = store.ply_kin[[frame, idx, IDX_ACC]];
                    Some(FreezeFramePlayer {
                        player_id,
                        team_id,
                        x,
                        y,
                        is_detected: store.detected[[frame, idx]],
                        speed: finite(speed),
                        vx: finite(vx),
                        vy: finite(vy),
                        acc: finite(acc),
                    })
                })
                .collect();

            Some(FreezeFrame {
                event_id: event.id.clone(),
                event_type_name: event.event_type_name.clone(),
                period: event.period,
                skc_frame: frame as i64,
                is_matched: event.is_matched,
                is_player_detected: event.is_player_detected,
                event_x: projected.map(|(x, _)| x),
                event_y: projected.map(|(_, y)| y),
                ball_x: store.ball[[frame, 0]],
                ball_y: store.ball[[frame, 1]],
                players,
            })
        })
        .collect()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::model::{
        BallSample, Coordinate, GenericEventType, PlayerCatalogueEntry, PlayerSample, TrackingFrame,
    };

    fn catalogue() -> MatchCatalogue {
        MatchCatalogue {
            pitch_length: 105.0,
            pitch_width: 68.0,
            home_team_id: 1,
            away_team_id: 2,
            home_team_side: vec![],
            players: vec![PlayerCatalogueEntry { id: 1, team_id: 1, number: 9, start_time: Some(0.0), short_name: None }],
        }
    }

    #[test]
    fn missing_skc_frame_yields_no_freeze_frame() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 0.0, y: 0.0, is_detected: true }],
            ball_data: BallSample { x: Some(0.0), y: Some(0.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();
        let resolver = AttackingSideResolver::new(&catalogue(), &store);

        let mut event = Event::new(
            "e1",
            1,
            0.0,
            GenericEventType::Pass,
            "pass",
            Some(1),
            Some(1),
            Some(1),
            Some(1),
            Coordinate::Known(0.0, 0.0),
        );
        event.skc_frame = None;

        let out = build_freeze_frames(&[event], &catalogue(), &store, &resolver);
        assert!(out.is_empty());
    }

    #[test]
    fn undetected_player_kinematics_surface_as_none() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 0.0, y: 0.0, is_detected: false }],
            ball_data: BallSample { x: Some(0.0), y: Some(0.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();
        let resolver = AttackingSideResolver::new(&catalogue(), &store);

        let mut event = Event::new(
            "e1",
            1,
            0.0,
            GenericEventType::Pass,
            "pass",
            Some(1),
            Some(1),
            Some(1),
            Some(1),
            Coordinate::Known(0.0, 0.0),
        );
        event.skc_frame = Some(0);

        let out = build_freeze_frames(&[event], &catalogue(), &store, &resolver);
        assert_eq!(out.len(), 1);
        let player = &out[0].players[0];
        assert_eq!(player.speed, None); // single-frame stream: central diff is NaN everywhere
    }
}
