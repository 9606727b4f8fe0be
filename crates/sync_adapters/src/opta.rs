//! Opta (Stats Perform) F24-style event feed. Player/team identity is
//! carried directly on each event — no jersey-fingerprint matching
//! needed, only a straight id lookup built from the match catalogue's
//! provider-id fields.

use std::collections::HashMap;

use serde::Deserialize;

use sync_core::model::{Coordinate, Event, GenericEventType, MatchCatalogue, TouchType};

use crate::datetime::parse_iso_datetime_secs;
use crate::error::{AdapterError, Result};

const START_PERIOD_TYPE_ID: i64 = 32;
const TEAM_SET_UP_ID: i64 = 34;
const PENALTY_SHOOTOUT_PERIOD_ID: i64 = 14;
const PASS_TYPE_IDS: [i64; 2] = [1, 2];
const SHOT_TYPE_IDS: [i64; 4] = [13, 14, 15, 16];
const FIRST_TOUCH_TYPE_IDS: [i64; 7] = [7, 8, 10, 12, 49, 52, 59];
const OFFSET_REFINE: i64 = 10;
const POSSIBLE_PERIOD_ID: [i64; 4] = [1, 2, 3, 4];

const NO_IS_MATCHED_APPLICABLE: &[&str] = &[
    "Start",
    "Start delay",
    "End delay",
    "End",
    "Team set up",
    "Formation change",
    "Deleted event",
    "Player off",
    "Player on",
    "Player changed position",
    "Player changed Jersey",
    "Player retired",
    "Player returns",
    "Player becomes goalkeeper",
    "Goalkeeper becomes player",
    "Official change",
    "Condition change",
    "Collection End",
    "Temp_Goal",
    "Temp_Attempt",
    "Resume",
    "Contentious referee decision",
    "Card Bookings",
];

fn event_type_name(type_id: i64) -> &'static str {
    match type_id {
        1 => "Pass",
        2 => "Offside Pass",
        3 => "Take On",
        4 => "Foul",
        5 => "Out",
        6 => "Corner Awarded",
        7 => "Tackle",
        8 => "Interception",
        10 => "Save Goalkeeper",
        11 => "Claim Goalkeeper",
        12 => "Clearance",
        13 => "Miss",
        14 => "Post",
        15 => "Attempt Saved",
        16 => "Goal",
        17 => "Card Bookings",
        18 => "Player off",
        19 => "Player on",
        20 => "Player retired",
        21 => "Player returns",
        22 => "Player becomes goalkeeper",
        23 => "Goalkeeper becomes player",
        24 => "Condition change",
        25 => "Official change",
        27 => "Start delay",
        28 => "End delay",
        30 => "End",
        32 => "Start",
        34 => "Team set up",
        35 => "Player changed position",
        36 => "Player changed Jersey",
        37 => "Collection End",
        38 => "Temp_Goal",
        39 => "Temp_Attempt",
        40 => "Formation change",
        41 => "Punch",
        42 => "Good Skill",
        43 => "Deleted event",
        44 => "Aerial",
        45 => "Challenge",
        47 => "Rescinded card",
        49 => "Ball recovery",
        50 => "Dispossessed",
        51 => "Error",
        52 => "Keeper pick-up",
        53 => "Cross not claimed",
        54 => "Smother",
        55 => "Offside provoked",
        56 => "Shield ball opp",
        57 => "Foul throw-in",
        58 => "Penalty faced",
        59 => "Keeper Sweeper",
        60 => "Chance missed",
        61 => "Ball touch",
        63 => "Temp_Save",
        64 => "Resume",
        65 => "Contentious referee decision",
        _ => "unknown",
    }
}

#[derive(Debug, Deserialize)]
pub struct RawOptaEvent {
    pub id: String,
    pub period_id: i64,
    pub type_id: i64,
    /// `YYYY-MM-DDTHH:MM:SS.ffffff`.
    pub timestamp: String,
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// `opta_player_id -> skc_player_id` and `opta_team_id -> skc_team_id`,
/// both supplied directly (Opta feeds link to the catalogue by id, not
/// by jersey number).
pub struct OptaIdentityMap {
    pub player_id_map: HashMap<i64, u64>,
    pub team_id_map: HashMap<i64, u64>,
}

pub fn standardize_events(
    raw_events: &[RawOptaEvent],
    catalogue: &MatchCatalogue,
    identity: &OptaIdentityMap,
) -> Result<Vec<Event>> {
    let skc_ply_id_to_team: HashMap<u64, u64> = catalogue.players.iter().map(|p| (p.id, p.team_id)).collect();
    let skc_team_id_to_opta_team_id: HashMap<u64, i64> =
        identity.team_id_map.iter().map(|(&opta, &skc)| (skc, opta)).collect();

    let period_starts = period_start_datetimes(raw_events)?;

    let mut out = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        if raw.type_id == TEAM_SET_UP_ID
            || raw.period_id == PENALTY_SHOOTOUT_PERIOD_ID
            || !POSSIBLE_PERIOD_ID.contains(&raw.period_id)
        {
            continue;
        }

        let player_id = raw.player_id.and_then(|id| identity.player_id_map.get(&id).copied());
        let team_id = match raw.team_id {
            Some(opta_team_id) => identity.team_id_map.get(&opta_team_id).copied(),
            None => player_id.and_then(|id| skc_ply_id_to_team.get(&id).copied()).and_then(|skc_team| {
                skc_team_id_to_opta_team_id.get(&skc_team).and_then(|opta| identity.team_id_map.get(opta).copied())
            }),
        };

        let period_start = *period_starts
            .get(&raw.period_id)
            .ok_or_else(|| AdapterError::MalformedField {
                provider: "opta",
                field: "period_id",
                detail: format!("no `Start` event found for period {}", raw.period_id),
            })?;
        let event_datetime = parse_iso_datetime_secs(&raw.timestamp).ok_or_else(|| AdapterError::MalformedField {
            provider: "opta",
            field: "timestamp",
            detail: raw.timestamp.clone(),
        })?;
        let timestamp = event_datetime - period_start;

        let position = match (raw.x, raw.y) {
            (Some(x), Some(y)) => {
                let px = (x - 50.0) * catalogue.pitch_length / 100.0;
                let py = (y - 50.0) * catalogue.pitch_width / 100.0;
                Coordinate::Known(px, py)
            }
            _ => Coordinate::Unknown,
        };

        let generic_type = if PASS_TYPE_IDS.contains(&raw.type_id) {
            GenericEventType::Pass
        } else if SHOT_TYPE_IDS.contains(&raw.type_id) {
            GenericEventType::Shot
        } else {
            GenericEventType::Generic
        };
        let type_name = event_type_name(raw.type_id);
        let to_refine = matches!(generic_type, GenericEventType::Pass | GenericEventType::Shot);

        let mut event = Event::new(
            raw.id.clone(),
            raw.period_id as u8,
            timestamp,
            generic_type,
            type_name,
            player_id,
            raw.player_id,
            team_id,
            raw.team_id,
            position,
        );
        event.touch_type =
            Some(if FIRST_TOUCH_TYPE_IDS.contains(&raw.type_id) { TouchType::First } else { TouchType::Last });
        event.to_refine = to_refine;
        event.is_matched_applicable = !NO_IS_MATCHED_APPLICABLE.contains(&type_name);
        event.offset_refine = to_refine.then_some(OFFSET_REFINE);

        out.push(event);
    }
    Ok(out)
}

fn period_start_datetimes(raw_events: &[RawOptaEvent]) -> Result<HashMap<i64, f64>> {
    let mut out = HashMap::new();
    for raw in raw_events {
        if raw.type_id == START_PERIOD_TYPE_ID {
            let secs = parse_iso_datetime_secs(&raw.timestamp).ok_or_else(|| AdapterError::MalformedField {
                provider: "opta",
                field: "timestamp",
                detail: raw.timestamp.clone(),
            })?;
            out.insert(raw.period_id, secs);
        }
    }
    Ok(out)
}
