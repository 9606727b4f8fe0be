//! Non-fatal diagnostics, logged via the `log` facade rather than
//! returned as errors — none of these stop the pipeline.

use crate::model::Event;

/// Below this, a period-start estimate is suspicious enough to warrant a
/// warning (a period genuinely starting 100+ frames into negative time is
/// almost always a tracking/video problem, not real match data).
const ACCEPTABLE_NEGATIVE_TH: i64 = -100;

/// Minimum acceptable percentage of matched (applicable) events.
const TH_MATCHED: f64 = 40.0;

pub fn warn_negative_period_start(period: u8, refined_period_start_frame: i64) {
    if refined_period_start_frame < ACCEPTABLE_NEGATIVE_TH {
        log::warn!(
            "period {period} start estimate is {refined_period_start_frame}, likely a tracking/event/video problem"
        );
    }
}

pub fn warn_low_match_rate(events: &[Event]) {
    let applicable: Vec<&Event> = events.iter().filter(|e| e.is_matched_applicable).collect();
    if applicable.is_empty() {
        return;
    }
    let matched = applicable.iter().filter(|e| e.is_matched == Some(true)).count();
    let pct = 100.0 * matched as f64 / applicable.len() as f64;
    if pct < TH_MATCHED {
        log::warn!("only {pct:.1}% of applicable events matched, likely a tracking/event/video problem");
    }
}

/// `wyscout` id 0 means "no player" rather than a mapping failure, so it's
/// excluded from the warning.
pub fn warn_unmapped_provider_player_ids(events: &[Event], event_provider: &str) {
    let mut unmapped: Vec<i64> = events
        .iter()
        .filter(|e| e.player_id.is_none())
        .filter_map(|e| e.provider_player_id)
        .filter(|&id| !(event_provider == "wyscout" && id == 0))
        .collect();
    unmapped.sort_unstable();
    unmapped.dedup();
    if !unmapped.is_empty() {
        log::warn!("unmapped {event_provider} player ids, likely a problem in the events or match catalogue: {unmapped:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wyscout_zero_id_is_excluded() {
        let mut event = crate::model::Event::new(
            "e1",
            1,
            0.0,
            crate::model::GenericEventType::Generic,
            "x",
            None,
            Some(0),
            None,
            None,
            crate::model::Coordinate::Unknown,
        );
        event.player_id = None;
        let events = vec![event];
        // Just exercises the filtering logic; assert no panic and behavior
        // by checking the filtered list would be empty.
        let unmapped: Vec<i64> = events
            .iter()
            .filter(|e| e.player_id.is_none())
            .filter_map(|e| e.provider_player_id)
            .filter(|&id| !(true && id == 0))
            .collect();
        assert!(unmapped.is_empty());
        warn_unmapped_provider_player_ids(&events, "wyscout");
    }
}
