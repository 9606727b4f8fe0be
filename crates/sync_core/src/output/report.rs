//! Per-event report: one row per event, carrying identifiers, the
//! quality flags, and the attacking-side-projected position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attacking_side::AttackingSideResolver;
use crate::model::{Event, MatchCatalogue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReport {
    pub event_id: String,
    pub period: u8,
    pub event_type_name: String,
    pub player_id: Option<u64>,
    pub provider_player_id: Option<i64>,
    pub team_id: Option<u64>,
    pub provider_team_id: Option<i64>,
    pub skc_frame: Option<i64>,
    pub provider_frame: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub is_matched: Option<bool>,
    pub is_player_detected: Option<bool>,
    pub frame_tracking_data_available: Option<bool>,
    pub has_provider_player_id: Option<bool>,
    pub is_matched_applicable: bool,
    /// Derived from the player catalogue: did this player start the match
    /// (`start_time == 0`)? `None` for events with no mapped player.
    pub starting: Option<bool>,
}

pub fn build_reports(
    events: &[Event],
    catalogue: &MatchCatalogue,
    resolver: &AttackingSideResolver,
) -> Vec<EventReport> {
    let start_time_by_player: HashMap<u64, Option<f64>> =
        catalogue.players.iter().map(|p| (p.id, p.start_time)).collect();

    events
        .iter()
        .map(|event| {
            let projected = event
                .team_id
                .zip(event.position.xy())
                .and_then(|(team_id, (x, y))| resolver.project(event.period, team_id, x, y));

            EventReport {
                event_id: event.id.clone(),
                period: event.period,
                event_type_name: event.event_type_name.clone(),
                player_id: event.player_id,
                provider_player_id: event.provider_player_id,
                team_id: event.team_id,
                provider_team_id: event.provider_team_id,
                skc_frame: event.skc_frame,
                provider_frame: event.provider_frame,
                x: projected.map(|(x, _)| x),
                y: projected.map(|(_, y)| y),
                is_matched: event.is_matched,
                is_player_detected: event.is_player_detected,
                frame_tracking_data_available: event.frame_tracking_data_available,
                has_provider_player_id: event.has_provider_player_id,
                is_matched_applicable: event.is_matched_applicable,
                starting: event
                    .player_id
                    .and_then(|id| start_time_by_player.get(&id).copied())
                    .map(|start_time| start_time == Some(0.0)),
            }
        })
        .collect()
}
