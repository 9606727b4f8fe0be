//! Structural-failure errors. Everything else in §7 of the design notes
//! (mapping failure, unknown coordinates, degenerate synchronization,
//! empty refinement windows) is handled locally and never reaches here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("tracking frame index {frame} is out of range (nb_frames = {nb_frames})")]
    FrameIndexOutOfRange { frame: usize, nb_frames: usize },

    #[error("player {player_id} referenced by tracking data has no entry in the match catalogue")]
    UnknownPlayer { player_id: u64 },

    #[error("match catalogue declares no rostered players (start_time is null for everyone)")]
    EmptyRoster,

    #[error("events and tracking disagree on period bounds: {0}")]
    InconsistentPeriods(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
