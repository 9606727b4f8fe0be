//! Wyscout. Player/team identity is carried directly by Wyscout's own
//! player id, already present in the match catalogue's provider-specific
//! roster extension — no jersey fingerprinting needed here.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use sync_core::model::{Coordinate, Event, GenericEventType, MatchCatalogue, TouchType};

use crate::datetime::parse_hms_frac;
use crate::error::{AdapterError, Result};

const OFFSET_REFINE: i64 = 10;
const NO_IS_MATCHED_APPLICABLE: &[&str] = &["game_interruption"];

fn period_start_minute(period: u8) -> f64 {
    match period {
        1 => 0.0,
        2 => 45.0,
        3 => 90.0,
        4 => 105.0,
        _ => 120.0,
    }
}

fn mapping_period_name(name: &str) -> Option<u8> {
    match name {
        "1H" => Some(1),
        "2H" => Some(2),
        "1E" => Some(3),
        "2E" => Some(4),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct RawWyscoutEvent {
    pub id: String,
    #[serde(rename = "matchPeriod")]
    pub match_period: String,
    #[serde(rename = "matchTimestamp")]
    pub match_timestamp: String,
    #[serde(rename = "videoTimestamp")]
    pub video_timestamp: String,
    pub player_wyscout_id: Option<i64>,
    pub team_wyscout_id: Option<i64>,
    pub location: Option<(f64, f64)>,
    pub primary_type: String,
    pub secondary_types: Vec<String>,
}

/// `wyscout_player_id -> skc_player_id`, built from the provider-specific
/// roster extension the catalogue's source JSON carries alongside the
/// canonical fields `sync_core::model` exposes.
pub fn standardize_events(
    raw_events: &[RawWyscoutEvent],
    catalogue: &MatchCatalogue,
    wyscout_id_to_skc_id: &HashMap<i64, u64>,
) -> Result<Vec<Event>> {
    let wyscout_team_id_to_skc_team_id = wyscout_team_id_to_skc_team_id(raw_events, wyscout_id_to_skc_id, catalogue);
    let (offsets, use_match_timestamp) = offsets_per_period(raw_events)?;

    let mut out = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        if raw.match_period.starts_with('P') {
            continue;
        }
        let period = mapping_period_name(&raw.match_period).ok_or_else(|| AdapterError::MalformedField {
            provider: "wyscout",
            field: "matchPeriod",
            detail: raw.match_period.clone(),
        })?;

        let player_id = raw.player_wyscout_id.and_then(|id| wyscout_id_to_skc_id.get(&id).copied());
        let team_id = raw.team_wyscout_id.and_then(|id| wyscout_team_id_to_skc_team_id.get(&id).copied());

        let offset = *offsets.get(&period).ok_or_else(|| AdapterError::MalformedField {
            provider: "wyscout",
            field: "matchPeriod",
            detail: format!("no kickoff event found for period {period}"),
        })?;
        let raw_timestamp = event_timestamp(raw, period, use_match_timestamp)?;
        let timestamp = raw_timestamp - offset;

        let position = match raw.location {
            Some((x, y)) => Coordinate::Known(
                (x - 50.0) * catalogue.pitch_length / 100.0,
                -(y - 50.0) * catalogue.pitch_width / 100.0,
            ),
            None => Coordinate::Unknown,
        };

        let generic_type = if raw.primary_type == "pass" || is_potential_pass(raw) {
            GenericEventType::Pass
        } else if raw.primary_type == "shot" {
            GenericEventType::Shot
        } else {
            GenericEventType::Generic
        };
        let to_refine = matches!(generic_type, GenericEventType::Pass | GenericEventType::Shot);

        let mut event = Event::new(
            raw.id.clone(),
            period,
            timestamp,
            generic_type,
            raw.primary_type.clone(),
            player_id,
            raw.player_wyscout_id,
            team_id,
            raw.team_wyscout_id,
            position,
        );
        event.touch_type = Some(if is_first_touch(raw) { TouchType::First } else { TouchType::Last });
        event.to_refine = to_refine;
        event.is_matched_applicable = !NO_IS_MATCHED_APPLICABLE.contains(&raw.primary_type.as_str());
        event.offset_refine = to_refine.then_some(OFFSET_REFINE);

        out.push(event);
    }
    Ok(out)
}

fn is_first_touch(raw: &RawWyscoutEvent) -> bool {
    const FIRST_TOUCH_PRIMARY: &[&str] = &["clearance", "interception", "touch"];
    let is_primary = FIRST_TOUCH_PRIMARY.contains(&raw.primary_type.as_str());
    let is_primary_and_secondary = match raw.primary_type.as_str() {
        "duel" => raw.secondary_types.iter().any(|s| s == "sliding_tackle"),
        "shot_against" => raw.secondary_types.iter().any(|s| s == "save"),
        _ => false,
    };
    is_primary || is_primary_and_secondary
}

/// A wyscout `interception` that also carries a passing secondary type
/// is, practically, a pass — it gets treated (and refined) as one.
pub fn is_potential_pass(raw: &RawWyscoutEvent) -> bool {
    raw.primary_type == "interception"
        && raw.secondary_types.iter().any(|s| s == "pass" || s == "head_pass")
}

fn wyscout_team_id_to_skc_team_id(
    raw_events: &[RawWyscoutEvent],
    wyscout_id_to_skc_id: &HashMap<i64, u64>,
    catalogue: &MatchCatalogue,
) -> HashMap<i64, u64> {
    let skc_ply_id_to_team: HashMap<u64, u64> = catalogue.players.iter().map(|p| (p.id, p.team_id)).collect();

    let mut out = HashMap::new();
    for raw in raw_events {
        let Some(wyscout_team_id) = raw.team_wyscout_id else { continue };
        let Some(wyscout_player_id) = raw.player_wyscout_id else { continue };
        let Some(&skc_ply_id) = wyscout_id_to_skc_id.get(&wyscout_player_id) else { continue };
        let Some(&skc_team_id) = skc_ply_id_to_team.get(&skc_ply_id) else { continue };
        out.insert(wyscout_team_id, skc_team_id);
        if out.len() == 2 {
            break;
        }
    }
    out
}

fn event_timestamp(raw: &RawWyscoutEvent, period: u8, use_match_timestamp: bool) -> Result<f64> {
    if use_match_timestamp {
        let secs = parse_hms_frac(&raw.match_timestamp).ok_or_else(|| AdapterError::MalformedField {
            provider: "wyscout",
            field: "matchTimestamp",
            detail: raw.match_timestamp.clone(),
        })?;
        Ok(secs - period_start_minute(period) * 60.0)
    } else {
        raw.video_timestamp.parse::<f64>().map_err(|_| AdapterError::MalformedField {
            provider: "wyscout",
            field: "videoTimestamp",
            detail: raw.video_timestamp.clone(),
        })
    }
}

/// Per-period kickoff offset: the timestamp of the first event (by video
/// order) in that period, used so every period's events start near 0.
/// `use_match_timestamp` is false only if any event's `matchTimestamp`
/// encodes a negative (pre-kickoff) offset.
fn offsets_per_period(raw_events: &[RawWyscoutEvent]) -> Result<(HashMap<u8, f64>, bool)> {
    let use_match_timestamp = !raw_events.iter().any(|e| e.match_timestamp.contains('-'));

    let mut order: Vec<usize> = (0..raw_events.len()).collect();
    let mut video_ts = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        video_ts.push(raw.video_timestamp.parse::<f64>().unwrap_or(f64::MAX));
    }
    order.sort_by(|&a, &b| video_ts[a].partial_cmp(&video_ts[b]).unwrap());

    let mut offsets = HashMap::new();
    let mut seen: HashSet<u8> = HashSet::new();
    for &idx in &order {
        let raw = &raw_events[idx];
        let Some(period) = mapping_period_name(&raw.match_period) else { continue };
        if seen.insert(period) {
            offsets.insert(period, event_timestamp(raw, period, use_match_timestamp)?);
        }
    }
    Ok((offsets, use_match_timestamp))
}
