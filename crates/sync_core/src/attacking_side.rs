//! Resolves each team's attacking direction per period, used only to
//! project event coordinates onto a canonical attacking direction at
//! report time.

use std::collections::HashMap;

use crate::feature_store::FeatureStore;
use crate::model::{AttackingSide, MatchCatalogue};

/// `team_id -> attacking side`, one map per period (index 0 = period 1).
pub struct AttackingSideResolver {
    by_period: HashMap<u8, HashMap<u64, AttackingSide>>,
}

impl AttackingSideResolver {
    pub fn new(catalogue: &MatchCatalogue, store: &FeatureStore) -> Self {
        let by_period = if !catalogue.home_team_side.is_empty() {
            from_catalogue(catalogue)
        } else {
            from_tracking(catalogue, store)
        };
        Self { by_period }
    }

    pub fn side_of(&self, period: u8, team_id: u64) -> Option<AttackingSide> {
        self.by_period.get(&period)?.get(&team_id).copied()
    }

    /// Projects `(x, y)` onto the canonical attacking direction for this
    /// team/period, negating both coordinates when the team attacks
    /// right-to-left. Returns `None` when the side can't be resolved.
    pub fn project(&self, period: u8, team_id: u64, x: f64, y: f64) -> Option<(f64, f64)> {
        match self.side_of(period, team_id)? {
            AttackingSide::LeftToRight => Some((x, y)),
            AttackingSide::RightToLeft => Some((-x, -y)),
        }
    }
}

fn from_catalogue(catalogue: &MatchCatalogue) -> HashMap<u8, HashMap<u64, AttackingSide>> {
    let mut out = HashMap::new();
    for (idx, &home_side) in catalogue.home_team_side.iter().enumerate() {
        let period = (idx + 1) as u8;
        let mut sides = HashMap::new();
        sides.insert(catalogue.home_team_id, home_side);
        sides.insert(catalogue.away_team_id, home_side.opposite());
        out.insert(period, sides);
    }
    out
}

/// Fallback: for each period, the team with the smaller mean x position
/// is assigned `left_to_right`.
fn from_tracking(catalogue: &MatchCatalogue, store: &FeatureStore) -> HashMap<u8, HashMap<u64, AttackingSide>> {
    let mut out = HashMap::new();
    let home_idx = store.team_id_to_idx_list.get(&catalogue.home_team_id).cloned().unwrap_or_default();
    let away_idx = store.team_id_to_idx_list.get(&catalogue.away_team_id).cloned().unwrap_or_default();

    for (&period, &(start, end)) in &store.period_bounds {
        let home_mean_x = mean_x(store, &home_idx, start, end);
        let away_mean_x = mean_x(store, &away_idx, start, end);

        let home_side = if home_mean_x < away_mean_x {
            AttackingSide::LeftToRight
        } else {
            AttackingSide::RightToLeft
        };

        let mut sides = HashMap::new();
        sides.insert(catalogue.home_team_id, home_side);
        sides.insert(catalogue.away_team_id, home_side.opposite());
        out.insert(period, sides);
    }
    out
}

fn mean_x(store: &FeatureStore, idx_list: &[usize], start: usize, end: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for frame in start..=end {
        for &idx in idx_list {
            let x = store.positions[[frame, idx, 0]];
            if x.is_finite() {
                sum += x;
                count += 1;
            }
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
