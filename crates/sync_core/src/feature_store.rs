//! Packs irregular per-frame tracking records into the dense, read-only
//! arrays the rest of the pipeline operates on. Built once per match;
//! never mutated after `build` returns.

use std::collections::HashMap;

use ndarray::{Array2, Array3};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::kinematics::{self, SpeedAcc};
use crate::model::{MatchCatalogue, TrackingFrame};

pub const IDX_SPEED: usize = 0;
pub const IDX_VX: usize = 1;
pub const IDX_VY: usize = 2;
pub const IDX_ACC: usize = 3;
pub const IDX_ACC_REFINE: usize = 4;

/// Dense per-match feature store. `P` (player slots) only covers players
/// with a non-null `start_time`; `F` is the tracking stream's frame count.
pub struct FeatureStore {
    pub ply_id_to_idx: HashMap<u64, usize>,
    pub team_id_to_idx_list: HashMap<u64, Vec<usize>>,
    pub nb_frames: usize,
    pub nb_players: usize,

    pub positions: Array3<f64>, // [F, P, 2]
    pub detected: Array2<bool>, // [F, P]
    pub ball: Array2<f64>,      // [F, 3] (x, y, z)

    pub dist_ply_ball: Array2<f64>, // [F, P]

    /// (speed, vx, vy, acc) after physical-criterion masking.
    pub ply_kin: Array3<f64>, // [F, P, 4]
    /// (speed, vx, vy, acc_report, acc_refine), never masked.
    pub ball_kin: Array2<f64>, // [F, 5]

    pub period_bounds: HashMap<u8, (usize, usize)>,
}

impl FeatureStore {
    pub fn build(frames: &[TrackingFrame], catalogue: &MatchCatalogue, config: &SyncConfig) -> Result<Self> {
        let nb_frames = frames.len();

        let mut ply_id_to_idx = HashMap::new();
        for player in &catalogue.players {
            if player.start_time.is_some() {
                let idx = ply_id_to_idx.len();
                ply_id_to_idx.insert(player.id, idx);
            }
        }
        if ply_id_to_idx.is_empty() {
            return Err(SyncError::EmptyRoster);
        }
        let nb_players = ply_id_to_idx.len();

        let mut team_id_to_idx_list: HashMap<u64, Vec<usize>> = HashMap::new();
        for player in &catalogue.players {
            if let Some(&idx) = ply_id_to_idx.get(&player.id) {
                team_id_to_idx_list.entry(player.team_id).or_default().push(idx);
            }
        }

        let mut positions = Array3::<f64>::from_elem((nb_frames, nb_players, 2), f64::NAN);
        let mut detected = Array2::<bool>::from_elem((nb_frames, nb_players), false);
        let mut ball = Array2::<f64>::from_elem((nb_frames, 3), f64::NAN);
        let mut period_bounds: HashMap<u8, (usize, usize)> = HashMap::new();

        for tf in frames {
            if tf.frame >= nb_frames {
                return Err(SyncError::FrameIndexOutOfRange { frame: tf.frame, nb_frames });
            }
            for sample in &tf.player_data {
                if let Some(&idx) = ply_id_to_idx.get(&sample.player_id) {
                    positions[[tf.frame, idx, 0]] = sample.x;
                    positions[[tf.frame, idx, 1]] = sample.y;
                    detected[[tf.frame, idx]] = sample.is_detected;
                }
            }
            if let (Some(x), Some(y), Some(z)) = (tf.ball_data.x, tf.ball_data.y, tf.ball_data.z) {
                ball[[tf.frame, 0]] = x;
                ball[[tf.frame, 1]] = y;
                ball[[tf.frame, 2]] = z;
            }
            if let Some(period) = tf.period {
                period_bounds
                    .entry(period)
                    .and_modify(|bounds| bounds.1 = tf.frame)
                    .or_insert((tf.frame, tf.frame));
            }
        }

        let dist_ply_ball = distance_matrix(&positions, &ball);

        let SpeedAcc { mut speed, mut velocity, mut acc, .. } = kinematics::compute_speed_acc(
            &positions,
            crate::config::FPS,
            config.smoothing_speed,
            config.smoothing_acc,
            config.smoothing_acc_refine,
        );
        round_in_place(&mut speed);
        round_in_place_3(&mut velocity);
        round_in_place(&mut acc);
        kinematics::apply_physical_criterion(&mut speed, &mut velocity, &mut acc, config.impossible_speed_th);
        let ply_kin = pack_player_kinematics(&speed, &velocity, &acc);

        let ball_positions = ball.slice(ndarray::s![.., 0..2]).to_owned();
        let ball_positions = ball_positions.insert_axis(ndarray::Axis(1)); // [F,1,2]
        let ball_speed_acc = kinematics::compute_speed_acc(
            &ball_positions,
            crate::config::FPS,
            config.smoothing_speed,
            config.smoothing_acc,
            config.smoothing_acc_refine,
        );
        let ball_kin = pack_ball_kinematics(&ball_speed_acc);

        Ok(Self {
            ply_id_to_idx,
            team_id_to_idx_list,
            nb_frames,
            nb_players,
            positions,
            detected,
            ball,
            dist_ply_ball,
            ply_kin,
            ball_kin,
            period_bounds,
        })
    }

    pub fn ply_dist_to_ball(&self, frame: usize, ply_idx: usize) -> f64 {
        self.dist_ply_ball[[frame, ply_idx]]
    }

    pub fn ball_acc_refine(&self, frame: usize) -> f64 {
        self.ball_kin[[frame, IDX_ACC_REFINE]]
    }
}

fn distance_matrix(positions: &Array3<f64>, ball: &Array2<f64>) -> Array2<f64> {
    let (f, p, _) = positions.dim();
    let mut dist = Array2::<f64>::from_elem((f, p), f64::NAN);
    for i in 0..f {
        let bx = ball[[i, 0]];
        let by = ball[[i, 1]];
        for j in 0..p {
            let dx = positions[[i, j, 0]] - bx;
            let dy = positions[[i, j, 1]] - by;
            dist[[i, j]] = (dx * dx + dy * dy).sqrt();
        }
    }
    dist
}

fn round_in_place(arr: &mut Array2<f64>) {
    arr.mapv_inplace(kinematics::round2);
}

fn round_in_place_3(arr: &mut Array3<f64>) {
    arr.mapv_inplace(kinematics::round2);
}

fn pack_player_kinematics(speed: &Array2<f64>, velocity: &Array3<f64>, acc: &Array2<f64>) -> Array3<f64> {
    let (f, p) = speed.dim();
    let mut out = Array3::<f64>::from_elem((f, p, 4), f64::NAN);
    for i in 0..f {
        for j in 0..p {
            out[[i, j, IDX_SPEED]] = speed[[i, j]];
            out[[i, j, IDX_VX]] = velocity[[i, j, 0]];
            out[[i, j, IDX_VY]] = velocity[[i, j, 1]];
            out[[i, j, IDX_ACC]] = acc[[i, j]];
        }
    }
    out
}

fn pack_ball_kinematics(speed_acc: &SpeedAcc) -> Array2<f64> {
    let (f, _n) = speed_acc.speed.dim();
    let mut out = Array2::<f64>::from_elem((f, 5), f64::NAN);
    for i in 0..f {
        out[[i, IDX_SPEED]] = speed_acc.speed[[i, 0]];
        out[[i, IDX_VX]] = speed_acc.velocity[[i, 0, 0]];
        out[[i, IDX_VY]] = speed_acc.velocity[[i, 0, 1]];
        out[[i, IDX_ACC]] = speed_acc.acc[[i, 0]];
        out[[i, IDX_ACC_REFINE]] = speed_acc.acc_refine[[i, 0]];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BallSample, PlayerCatalogueEntry, PlayerSample};

    fn catalogue() -> MatchCatalogue {
        MatchCatalogue {
            pitch_length: 105.0,
            pitch_width: 68.0,
            home_team_id: 1,
            away_team_id: 2,
            home_team_side: vec![],
            players: vec![PlayerCatalogueEntry {
                id: 1,
                team_id: 1,
                number: 9,
                start_time: Some(0.0),
                short_name: None,
            }],
        }
    }

    #[test]
    fn distance_is_zero_when_colocated() {
        let frames = vec![TrackingFrame {
            frame: 0,
            period: Some(1),
            player_data: vec![PlayerSample { player_id: 1, x: 5.0, y: 5.0, is_detected: true }],
            ball_data: BallSample { x: Some(5.0), y: Some(5.0), z: Some(0.0) },
        }];
        let config = SyncConfig::default();
        let store = FeatureStore::build(&frames, &catalogue(), &config).unwrap();
        assert_eq!(store.ply_dist_to_ball(0, 0), 0.0);
    }

    #[test]
    fn out_of_range_frame_is_structural_error() {
        let frames = vec![TrackingFrame {
            frame: 5,
            period: Some(1),
            player_data: vec![],
            ball_data: BallSample::default(),
        }];
        let config = SyncConfig::default();
        let err = FeatureStore::build(&frames, &catalogue(), &config).unwrap_err();
        assert!(matches!(err, SyncError::FrameIndexOutOfRange { .. }));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let mut cat = catalogue();
        cat.players[0].start_time = None;
        let config = SyncConfig::default();
        let err = FeatureStore::build(&[], &cat, &config).unwrap_err();
        assert!(matches!(err, SyncError::EmptyRoster));
    }
}
