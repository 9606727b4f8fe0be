//! # sync_core
//!
//! Aligns a provider's event stream (passes, shots, touches — timestamped
//! per period but with no frame index) with a tracking stream (per-frame
//! player/ball positions at a fixed sampling rate). Three phases run in
//! strict order over a single match: the tracking [`feature_store`] is
//! built once and never mutated again, the [`sync`] module stamps every
//! event with a frame, [`refine`] nudges pass/shot frames onto the true
//! ball-contact instant, and [`matcher`] labels the result with quality
//! flags. [`output`] joins the two streams into reportable rows.
//!
//! The crate is single-threaded and synchronous: one call processes one
//! match. Running several matches concurrently is safe by construction —
//! nothing here holds process-wide state — simply run one instance per
//! match on whatever executor the caller prefers.

pub mod attacking_side;
pub mod config;
pub mod error;
pub mod feature_store;
pub mod kinematics;
pub mod matcher;
pub mod model;
pub mod output;
pub mod refine;
pub mod sync;
pub mod warnings;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use feature_store::FeatureStore;
pub use model::{Event, MatchCatalogue, TrackingFrame};

/// Runs the full pipeline — stamp, refine, match — over one match's events
/// and tracking, in place. Output assembly (`output::assemble`) is a
/// separate step since not every caller wants every artifact.
pub fn synchronize(events: &mut [model::Event], store: &FeatureStore, config: &SyncConfig) -> Result<()> {
    sync::stamp_events(events, store, config)?;
    refine::refine_events(events, store, config);
    matcher::match_events(events, store, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BallSample, GenericEventType, MatchCatalogue, PlayerCatalogueEntry, PlayerSample};

    fn tiny_catalogue() -> MatchCatalogue {
        MatchCatalogue {
            pitch_length: 105.0,
            pitch_width: 68.0,
            home_team_id: 1,
            away_team_id: 2,
            home_team_side: vec![],
            players: vec![
                PlayerCatalogueEntry {
                    id: 10,
                    team_id: 1,
                    number: 9,
                    start_time: Some(0.0),
                    short_name: Some("A".into()),
                },
                PlayerCatalogueEntry {
                    id: 11,
                    team_id: 2,
                    number: 4,
                    start_time: Some(0.0),
                    short_name: Some("B".into()),
                },
            ],
        }
    }

    fn tiny_tracking(nb_frames: usize) -> Vec<TrackingFrame> {
        (0..nb_frames)
            .map(|f| TrackingFrame {
                frame: f,
                period: Some(1),
                player_data: vec![
                    PlayerSample { player_id: 10, x: f as f64 * 0.1, y: 0.0, is_detected: true },
                    PlayerSample { player_id: 11, x: 30.0, y: 30.0, is_detected: true },
                ],
                ball_data: BallSample { x: Some(f as f64 * 0.1), y: Some(0.0), z: Some(0.0) },
            })
            .collect()
    }

    #[test]
    fn pipeline_runs_end_to_end_without_panicking() {
        let catalogue = tiny_catalogue();
        let tracking = tiny_tracking(100);
        let config = SyncConfig::default();
        let store = FeatureStore::build(&tracking, &catalogue, &config).unwrap();

        let mut events = vec![model::Event::new(
            "e1",
            1,
            4.0,
            GenericEventType::Pass,
            "Pass",
            Some(10),
            Some(10),
            Some(1),
            Some(1),
            crate::model::Coordinate::Known(0.0, 0.0),
        )];
        events[0].to_refine = true;
        events[0].offset_refine = Some(5);

        synchronize(&mut events, &store, &config).unwrap();
        assert!(events[0].skc_frame.is_some());
        assert!(events[0].is_matched.is_some());
    }
}
