//! Per-event-type quality summary, mirroring the breakdown a analyst
//! reviews match-by-match to spot a bad synchronization before it reaches
//! the rest of the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::report::EventReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTypeAggregate {
    pub event_type_name: String,
    pub nb_events: usize,
    pub is_matched: usize,
    pub pct_is_matched: f64,
    pub is_matched_is_player_detected: usize,
    pub is_not_matched: usize,
    pub is_not_matched_is_player_detected: usize,
    pub is_not_matched_has_provider_player_id_attached: usize,
    pub is_not_matched_frame_tracking_data_available: usize,
    pub is_matched_applicable: usize,
}

/// Only rows with `is_matched_applicable` contribute; this mirrors the
/// per-event applicability flag adapters set for non-actionable event
/// types (e.g. a card or a substitution, which has no ball contact to
/// match against tracking).
pub fn aggregate_by_event_type(reports: &[EventReport]) -> Vec<EventTypeAggregate> {
    let mut by_type: BTreeMap<&str, Vec<&EventReport>> = BTreeMap::new();
    for report in reports {
        if report.is_matched_applicable {
            by_type.entry(report.event_type_name.as_str()).or_default().push(report);
        }
    }

    by_type
        .into_iter()
        .map(|(event_type_name, rows)| {
            let nb_events = rows.len();
            let is_matched = rows.iter().filter(|r| r.is_matched == Some(true)).count();
            let is_not_matched = nb_events - is_matched;
            let is_matched_is_player_detected = rows
                .iter()
                .filter(|r| r.is_matched == Some(true) && r.is_player_detected == Some(true))
                .count();
            let is_not_matched_is_player_detected = rows
                .iter()
                .filter(|r| r.is_matched != Some(true) && r.is_player_detected == Some(true))
                .count();
            let is_not_matched_has_provider_player_id_attached = rows
                .iter()
                .filter(|r| r.is_matched != Some(true) && r.has_provider_player_id == Some(true))
                .count();
            let is_not_matched_frame_tracking_data_available = rows
                .iter()
                .filter(|r| r.is_matched != Some(true) && r.frame_tracking_data_available == Some(true))
                .count();
            let pct_is_matched = if nb_events == 0 { 0.0 } else { 100.0 * is_matched as f64 / nb_events as f64 };

            EventTypeAggregate {
                event_type_name: event_type_name.to_string(),
                nb_events,
                is_matched,
                pct_is_matched,
                is_matched_is_player_detected,
                is_not_matched,
                is_not_matched_is_player_detected,
                is_not_matched_has_provider_player_id_attached,
                is_not_matched_frame_tracking_data_available,
                is_matched_applicable: nb_events,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(event_type_name: &str, applicable: bool, matched: Option<bool>, detected: Option<bool>) -> EventReport {
        EventReport {
            event_id: "e".into(),
            period: 1,
            event_type_name: event_type_name.into(),
            player_id: Some(1),
            provider_player_id: Some(1),
            team_id: Some(1),
            provider_team_id: Some(1),
            skc_frame: Some(0),
            provider_frame: Some(0),
            x: None,
            y: None,
            is_matched: matched,
            is_player_detected: detected,
            frame_tracking_data_available: Some(false),
            has_provider_player_id: Some(true),
            is_matched_applicable: applicable,
            starting: Some(true),
        }
    }

    #[test]
    fn non_applicable_events_are_excluded() {
        let reports = vec![report("pass", true, Some(true), Some(true)), report("card", false, None, None)];
        let agg = aggregate_by_event_type(&reports);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].event_type_name, "pass");
    }

    #[test]
    fn percentage_matched_is_computed_per_type() {
        let reports = vec![
            report("pass", true, Some(true), Some(true)),
            report("pass", true, Some(false), Some(true)),
        ];
        let agg = aggregate_by_event_type(&reports);
        assert_eq!(agg[0].nb_events, 2);
        assert_eq!(agg[0].is_matched, 1);
        assert!((agg[0].pct_is_matched - 50.0).abs() < 1e-9);
    }
}
