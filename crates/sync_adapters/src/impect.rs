//! Impect. Team/player identity goes through the jersey-number-set
//! fingerprint ([`crate::id_map`]); `force_to_refine` additionally widens
//! the refinement window for a pass immediately following a loose-ball
//! recovery, where Impect's own timestamp is least reliable.

use serde::Deserialize;

use sync_core::model::{Coordinate, Event, GenericEventType, MatchCatalogue};

use crate::error::Result;
use crate::id_map::{self, ProviderPlayer};

const OFFSET_FORCE_REFINE: i64 = 15;
const OFFSET_REFINE: i64 = 5;
const POSSIBLE_PERIOD_ID: [i64; 4] = [1, 2, 3, 4];

const FIRST_TOUCH_TYPES: &[&str] = &["RECEPTION", "CLEARANCE", "BLOCK", "INTERCEPTION"];
const NO_IS_MATCHED_APPLICABLE: &[&str] = &["NO_VIDEO", "FINAL_WHISTLE", "KICK_OFF", "OUT"];
/// Previous-event types after which an Impect `PASS` is presumed
/// mistimed enough to widen its refinement window.
const FORCE_REFINE_AFTER: &[&str] = &["RECEPTION", "LOOSE_BALL_REGAIN", "INTERCEPTION"];

fn period_start_secs(period: i64) -> f64 {
    match period {
        1 => 0.0,
        2 => 10_000.0,
        3 => 20_000.0,
        4 => 23_333.33,
        _ => 0.0,
    }
}

#[derive(Debug, Deserialize)]
pub struct RawImpectEvent {
    pub id: String,
    pub period_id: i64,
    pub game_time_in_sec: f64,
    pub player_id: Option<i64>,
    pub squad_id: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub action_type: String,
    pub body_part: Option<String>,
}

#[derive(Debug)]
pub struct ImpectPlayerRecord {
    pub player_id: i64,
    pub squad_id: i64,
    pub shirt_number: u32,
}

pub fn standardize_events(
    raw_events: &[RawImpectEvent],
    catalogue: &MatchCatalogue,
    impect_players: &[ImpectPlayerRecord],
) -> Result<Vec<Event>> {
    let provider_players: Vec<ProviderPlayer> = impect_players
        .iter()
        .map(|p| ProviderPlayer {
            provider_player_id: p.player_id,
            provider_team_id: p.squad_id,
            jersey_number: p.shirt_number,
        })
        .collect();
    let (impect_team_id_to_skc_team_id, impect_ply_id_to_skc_ply_id) =
        id_map::resolve("impect", catalogue, &provider_players)?;

    let mut out = Vec::with_capacity(raw_events.len());
    let mut previous_event_type: Option<String> = None;

    for raw in raw_events {
        if !POSSIBLE_PERIOD_ID.contains(&raw.period_id) {
            continue;
        }

        let player_id = raw.player_id.and_then(|id| impect_ply_id_to_skc_ply_id.get(&id).copied().flatten());
        let team_id = raw.squad_id.and_then(|id| impect_team_id_to_skc_team_id.get(&id).copied());

        let timestamp = raw.game_time_in_sec - period_start_secs(raw.period_id);

        let position = match (raw.x, raw.y) {
            (Some(x), Some(y)) => {
                Coordinate::Known(x * catalogue.pitch_length / 105.0, y * catalogue.pitch_width / 68.0)
            }
            _ => Coordinate::Unknown,
        };

        let generic_type = match raw.action_type.as_str() {
            "PASS" => GenericEventType::Pass,
            "SHOT" => GenericEventType::Shot,
            _ => GenericEventType::Generic,
        };
        let to_refine = matches!(generic_type, GenericEventType::Pass | GenericEventType::Shot);
        let is_head = raw.body_part.as_deref() == Some("HEAD");
        let force_to_refine = raw.action_type == "PASS"
            && previous_event_type.as_deref().is_some_and(|t| FORCE_REFINE_AFTER.contains(&t))
            && !is_head;

        let mut event = Event::new(
            raw.id.clone(),
            raw.period_id as u8,
            timestamp,
            generic_type,
            raw.action_type.clone(),
            player_id,
            raw.player_id,
            team_id,
            raw.squad_id,
            position,
        );
        event.to_refine = to_refine;
        event.force_to_refine = force_to_refine;
        event.is_head = is_head;
        event.touch_type = Some(if FIRST_TOUCH_TYPES.contains(&raw.action_type.as_str()) {
            sync_core::model::TouchType::First
        } else {
            sync_core::model::TouchType::Last
        });
        event.is_matched_applicable = !NO_IS_MATCHED_APPLICABLE.contains(&raw.action_type.as_str());
        event.offset_refine = if force_to_refine {
            Some(OFFSET_FORCE_REFINE)
        } else if to_refine {
            Some(OFFSET_REFINE)
        } else {
            None
        };

        previous_event_type = Some(event.event_type_name.clone());
        out.push(event);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::model::PlayerCatalogueEntry;

    fn catalogue() -> MatchCatalogue {
        MatchCatalogue {
            pitch_length: 105.0,
            pitch_width: 68.0,
            home_team_id: 1,
            away_team_id: 2,
            home_team_side: vec![],
            players: vec![
                PlayerCatalogueEntry { id: 10, team_id: 1, number: 9, start_time: Some(0.0), short_name: None },
                PlayerCatalogueEntry { id: 11, team_id: 1, number: 4, start_time: Some(0.0), short_name: None },
                PlayerCatalogueEntry { id: 20, team_id: 2, number: 7, start_time: Some(0.0), short_name: None },
                PlayerCatalogueEntry { id: 21, team_id: 2, number: 3, start_time: Some(0.0), short_name: None },
            ],
        }
    }

    fn impect_players() -> Vec<ImpectPlayerRecord> {
        vec![
            ImpectPlayerRecord { player_id: 900, squad_id: 50, shirt_number: 9 },
            ImpectPlayerRecord { player_id: 901, squad_id: 50, shirt_number: 4 },
            ImpectPlayerRecord { player_id: 902, squad_id: 60, shirt_number: 7 },
            ImpectPlayerRecord { player_id: 903, squad_id: 60, shirt_number: 3 },
        ]
    }

    #[test]
    fn pass_after_loose_ball_regain_forces_refinement() {
        let raw = vec![
            RawImpectEvent {
                id: "1".into(),
                period_id: 1,
                game_time_in_sec: 10.0,
                player_id: Some(900),
                squad_id: Some(50),
                x: Some(0.0),
                y: Some(0.0),
                action_type: "LOOSE_BALL_REGAIN".into(),
                body_part: None,
            },
            RawImpectEvent {
                id: "2".into(),
                period_id: 1,
                game_time_in_sec: 10.5,
                player_id: Some(900),
                squad_id: Some(50),
                x: Some(1.0),
                y: Some(0.0),
                action_type: "PASS".into(),
                body_part: Some("FOOT".into()),
            },
        ];
        let events = standardize_events(&raw, &catalogue(), &impect_players()).unwrap();
        assert!(events[1].force_to_refine);
        assert_eq!(events[1].offset_refine, Some(OFFSET_FORCE_REFINE));
    }

    #[test]
    fn headed_pass_never_forces_refinement() {
        let raw = vec![
            RawImpectEvent {
                id: "1".into(),
                period_id: 1,
                game_time_in_sec: 10.0,
                player_id: Some(900),
                squad_id: Some(50),
                x: Some(0.0),
                y: Some(0.0),
                action_type: "RECEPTION".into(),
                body_part: None,
            },
            RawImpectEvent {
                id: "2".into(),
                period_id: 1,
                game_time_in_sec: 10.5,
                player_id: Some(900),
                squad_id: Some(50),
                x: Some(1.0),
                y: Some(0.0),
                action_type: "PASS".into(),
                body_part: Some("HEAD".into()),
            },
        ];
        let events = standardize_events(&raw, &catalogue(), &impect_players()).unwrap();
        assert!(!events[1].force_to_refine);
        assert_eq!(events[1].offset_refine, Some(OFFSET_REFINE));
    }
}
