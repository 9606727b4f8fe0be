//! Canonical, provider-neutral types. A provider adapter (see the
//! `sync_adapters` crate) is responsible for producing [`Event`] values and
//! a [`MatchCatalogue`]; this crate never parses a raw provider payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenericEventType {
    Pass,
    Shot,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchType {
    First,
    Last,
}

/// An event's pitch position, or the `unknown` sentinel when the raw
/// provider record carried no usable location. `Unknown` is never used in
/// a geometric computation — only passed through to the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Coordinate {
    Known(f64, f64),
    Unknown,
}

impl Coordinate {
    pub fn xy(&self) -> Option<(f64, f64)> {
        match self {
            Coordinate::Known(x, y) => Some((*x, *y)),
            Coordinate::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackingSide {
    LeftToRight,
    RightToLeft,
}

impl AttackingSide {
    pub fn opposite(self) -> Self {
        match self {
            AttackingSide::LeftToRight => AttackingSide::RightToLeft,
            AttackingSide::RightToLeft => AttackingSide::LeftToRight,
        }
    }
}

/// Canonical event record. Adapters populate every field up to and
/// including `offset_refine`; the remaining fields are written by the core
/// pipeline (`sync`, `refine`, `matcher`) in that order and are `None`
/// until their phase has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub period: u8,
    /// Seconds from the start of `period`. May be negative if the
    /// provider's period anchor differs from the tracking's.
    pub timestamp: f64,
    pub generic_event_type: GenericEventType,
    /// Provider-specific type name, opaque to the core (e.g. `"PASS"`,
    /// `"interception"`). Used only for output grouping.
    pub event_type_name: String,
    pub player_id: Option<u64>,
    pub provider_player_id: Option<i64>,
    pub team_id: Option<u64>,
    pub provider_team_id: Option<i64>,
    pub position: Coordinate,
    pub to_refine: bool,
    pub force_to_refine: bool,
    pub is_head: bool,
    pub touch_type: Option<TouchType>,
    pub is_matched_applicable: bool,
    /// Search half-window in frames used by the refiner; `None` when the
    /// event is not a refinement candidate.
    pub offset_refine: Option<i64>,

    // Written by `sync::stamp_events`.
    pub provider_frame: Option<i64>,
    /// Possibly refined frame; starts out equal to `provider_frame`.
    pub skc_frame: Option<i64>,

    // Written by `matcher::match_events`.
    pub is_matched: Option<bool>,
    pub is_player_detected: Option<bool>,
    pub frame_tracking_data_available: Option<bool>,
    pub has_provider_player_id: Option<bool>,
}

impl Event {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        period: u8,
        timestamp: f64,
        generic_event_type: GenericEventType,
        event_type_name: impl Into<String>,
        player_id: Option<u64>,
        provider_player_id: Option<i64>,
        team_id: Option<u64>,
        provider_team_id: Option<i64>,
        position: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            period,
            timestamp,
            generic_event_type,
            event_type_name: event_type_name.into(),
            player_id,
            provider_player_id,
            team_id,
            provider_team_id,
            position,
            to_refine: false,
            force_to_refine: false,
            is_head: false,
            touch_type: None,
            is_matched_applicable: true,
            offset_refine: None,
            provider_frame: None,
            skc_frame: None,
            is_matched: None,
            is_player_detected: None,
            frame_tracking_data_available: None,
            has_provider_player_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCatalogueEntry {
    pub id: u64,
    pub team_id: u64,
    pub number: u32,
    /// `None` means the player never took part in the match; such players
    /// are excluded from the feature store's player slots entirely.
    pub start_time: Option<f64>,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCatalogue {
    pub pitch_length: f64,
    pub pitch_width: f64,
    pub home_team_id: u64,
    pub away_team_id: u64,
    pub players: Vec<PlayerCatalogueEntry>,
    /// Per-period attacking side of the home team, index 0 = period 1.
    /// Empty when the provider doesn't declare it, triggering the
    /// mean-x-position fallback in `attacking_side`.
    pub home_team_side: Vec<AttackingSide>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerSample {
    pub player_id: u64,
    pub x: f64,
    pub y: f64,
    pub is_detected: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BallSample {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// One tracking sample. Frame indices across the whole stream are dense,
/// monotone, and start at 0 — the feature store indexes its arrays
/// directly by frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingFrame {
    pub frame: usize,
    pub period: Option<u8>,
    pub player_data: Vec<PlayerSample>,
    pub ball_data: BallSample,
}
