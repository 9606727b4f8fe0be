//! Statsbomb. Team identity is resolved from the already-known
//! Statsbomb home-team id (no jersey fingerprinting needed there);
//! player identity still goes through the jersey-number-set match since
//! Statsbomb lineups carry no direct SKC player id.

use std::collections::HashMap;

use serde::Deserialize;

use sync_core::model::{Coordinate, Event, GenericEventType, MatchCatalogue};

use crate::datetime::parse_hms_frac;
use crate::error::{AdapterError, Result};
use crate::id_map::{provider_player_id_to_skc, ProviderPlayer};

const PASS_TYPE_ID: i64 = 30;
const SHOT_TYPE_ID: i64 = 16;
const STB_LENGTH: f64 = 120.0;
const STB_WIDTH: f64 = 80.0;
const OFFSET_REFINE: i64 = 5;
const POSSIBLE_PERIOD_ID: [i64; 4] = [1, 2, 3, 4];

const NO_IS_MATCHED_APPLICABLE: &[&str] = &[
    "Tactical Shift",
    "Substitution",
    "Referee Ball-Drop",
    "Player Off",
    "Player On",
    "Injury Stoppage",
    "Half End",
    "Half Start",
    "Starting XI",
];

#[derive(Debug, Deserialize)]
pub struct RawStatsbombEvent {
    pub id: String,
    pub period: i64,
    /// `HH:MM:SS.ffffff`, wall-clock within the period.
    pub timestamp: String,
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
    pub location: Option<[f64; 2]>,
    pub type_id: i64,
    pub type_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsbombLineupEntry {
    pub team_id: i64,
    pub player_id: i64,
    pub jersey_number: u32,
}

pub fn standardize_events(
    raw_events: &[RawStatsbombEvent],
    lineup: &[StatsbombLineupEntry],
    statsbomb_home_team_id: i64,
    catalogue: &MatchCatalogue,
) -> Result<Vec<Event>> {
    let stb_team_id_to_skc_team_id = skc_team_id_to_stb_team_id(catalogue, lineup, statsbomb_home_team_id)?;

    let provider_players: Vec<ProviderPlayer> = lineup
        .iter()
        .map(|entry| ProviderPlayer {
            provider_player_id: entry.player_id,
            provider_team_id: entry.team_id,
            jersey_number: entry.jersey_number,
        })
        .collect();
    let skc_team_id_to_stb_team_id: HashMap<u64, i64> =
        stb_team_id_to_skc_team_id.iter().map(|(&stb, &skc)| (skc, stb)).collect();
    let player_map = provider_player_id_to_skc(catalogue, &skc_team_id_to_stb_team_id, &provider_players);

    let mut out = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        if !POSSIBLE_PERIOD_ID.contains(&raw.period) {
            continue;
        }

        let player_id = raw.player_id.and_then(|id| player_map.get(&id).copied().flatten());
        let team_id = raw.team_id.and_then(|id| stb_team_id_to_skc_team_id.get(&id).copied());

        let event_seconds = parse_hms_frac(&raw.timestamp).ok_or_else(|| AdapterError::MalformedField {
            provider: "statsbomb",
            field: "timestamp",
            detail: raw.timestamp.clone(),
        })?;

        let position = match raw.location {
            Some([x, y]) => Coordinate::Known(
                (x - STB_LENGTH / 2.0) * catalogue.pitch_length / STB_LENGTH,
                -(y - STB_WIDTH / 2.0) * catalogue.pitch_width / STB_WIDTH,
            ),
            None => Coordinate::Unknown,
        };

        let generic_type = if raw.type_id == PASS_TYPE_ID {
            GenericEventType::Pass
        } else if raw.type_id == SHOT_TYPE_ID {
            GenericEventType::Shot
        } else {
            GenericEventType::Generic
        };
        let to_refine = matches!(generic_type, GenericEventType::Pass | GenericEventType::Shot);

        let mut event = Event::new(
            raw.id.clone(),
            raw.period as u8,
            event_seconds,
            generic_type,
            raw.type_name.clone(),
            player_id,
            raw.player_id,
            team_id,
            raw.team_id,
            position,
        );
        event.to_refine = to_refine;
        event.is_matched_applicable = !NO_IS_MATCHED_APPLICABLE.contains(&raw.type_name.as_str());
        event.offset_refine = to_refine.then_some(OFFSET_REFINE);

        out.push(event);
    }
    Ok(out)
}

fn skc_team_id_to_stb_team_id(
    catalogue: &MatchCatalogue,
    lineup: &[StatsbombLineupEntry],
    statsbomb_home_team_id: i64,
) -> Result<HashMap<u64, i64>> {
    let mut lineup_team_ids: Vec<i64> = lineup.iter().map(|e| e.team_id).collect();
    lineup_team_ids.dedup();
    lineup_team_ids.sort_unstable();
    lineup_team_ids.dedup();

    if lineup_team_ids.len() != 2 {
        return Err(AdapterError::MalformedField {
            provider: "statsbomb",
            field: "lineup",
            detail: format!("expected exactly 2 teams in lineup, found {}", lineup_team_ids.len()),
        });
    }

    let away_team_id = if lineup_team_ids[0] == statsbomb_home_team_id {
        lineup_team_ids[1]
    } else if lineup_team_ids[1] == statsbomb_home_team_id {
        lineup_team_ids[0]
    } else {
        return Err(AdapterError::UnknownHomeTeam { provider: "statsbomb", raw_id: statsbomb_home_team_id });
    };

    let mut map = HashMap::new();
    map.insert(catalogue.home_team_id, statsbomb_home_team_id);
    map.insert(catalogue.away_team_id, away_team_id);
    Ok(map)
}
