//! Central-difference velocity/acceleration with symmetric NaN padding.
//! Shared by players and the ball — the ball is just a single-column
//! instance of the same (frame, entity, xy) array.

use ndarray::{Array2, Array3};

/// Speed, velocity, and two accelerations (one per smoothing width) over a
/// `(frames, entities, 2)` position array. NaN in a position propagates
/// through every derived value for that frame/entity automatically: any
/// arithmetic touching a NaN operand yields NaN.
pub struct SpeedAcc {
    pub speed: Array2<f64>,      // (F, N)
    pub velocity: Array3<f64>,   // (F, N, 2)
    pub acc: Array2<f64>,        // (F, N), central-diff width = acc_width
    pub acc_refine: Array2<f64>, // (F, N), central-diff width = acc_refine_width
}

/// `positions` is `(F, N, 2)`. `speed_width` must be the same even width
/// used for both the velocity vectors and the speed norm that seeds the
/// two acceleration passes.
pub fn compute_speed_acc(
    positions: &Array3<f64>,
    fps: f64,
    speed_width: usize,
    acc_width: usize,
    acc_refine_width: usize,
) -> SpeedAcc {
    let (speed, velocity) = central_diff_vector(positions, fps, speed_width);
    let acc = central_diff_scalar(&speed, fps, acc_width);
    let acc_refine = central_diff_scalar(&speed, fps, acc_refine_width);
    SpeedAcc { speed, velocity, acc, acc_refine }
}

/// Position diff -> velocity vector and its norm, padded symmetrically
/// with NaN so the result has the same frame count as the input. `w` must
/// be even (all smoothing widths used by this crate are).
fn central_diff_vector(positions: &Array3<f64>, fps: f64, w: usize) -> (Array2<f64>, Array3<f64>) {
    let (f, n, _) = positions.dim();
    let mut speed = Array2::<f64>::from_elem((f, n), f64::NAN);
    let mut velocity = Array3::<f64>::from_elem((f, n, 2), f64::NAN);
    if w == 0 || f <= w {
        return (speed, velocity);
    }
    let pad_before = w / 2;
    let scale = fps / w as f64;
    for i in 0..(f - w) {
        let out = i + pad_before;
        for j in 0..n {
            let dx = positions[[i + w, j, 0]] - positions[[i, j, 0]];
            let dy = positions[[i + w, j, 1]] - positions[[i, j, 1]];
            velocity[[out, j, 0]] = dx * scale;
            velocity[[out, j, 1]] = dy * scale;
            speed[[out, j]] = (dx * dx + dy * dy).sqrt() * scale;
        }
    }
    (speed, velocity)
}

/// Same central difference, but over an already-scalar series (used to go
/// from speed to acceleration).
fn central_diff_scalar(values: &Array2<f64>, fps: f64, w: usize) -> Array2<f64> {
    let (f, n) = values.dim();
    let mut out = Array2::<f64>::from_elem((f, n), f64::NAN);
    if w == 0 || f <= w {
        return out;
    }
    let pad_before = w / 2;
    let scale = fps / w as f64;
    for i in 0..(f - w) {
        let dest = i + pad_before;
        for j in 0..n {
            out[[dest, j]] = (values[[i + w, j]] - values[[i, j]]) * scale;
        }
    }
    out
}

/// Drops physically implausible player samples: any `(frame, player)` with
/// speed above `impossible_speed_th`, or failing the speed-acceleration
/// envelope, has all of (speed, vx, vy, acc) set to NaN. Ball kinematics
/// never go through this — the ball can exceed player limits.
///
/// The envelope constants are empirical and must not be rounded.
pub fn apply_physical_criterion(
    speed: &mut Array2<f64>,
    velocity: &mut Array3<f64>,
    acc: &mut Array2<f64>,
    impossible_speed_th: f64,
) {
    let (f, n) = speed.dim();
    for i in 0..f {
        for j in 0..n {
            let s = speed[[i, j]];
            let a = acc[[i, j]];
            let envelope = -0.6354 * s + 9.1 - a;
            let implausible = envelope <= 0.0 || s > impossible_speed_th;
            if implausible {
                speed[[i, j]] = f64::NAN;
                velocity[[i, j, 0]] = f64::NAN;
                velocity[[i, j, 1]] = f64::NAN;
                acc[[i, j]] = f64::NAN;
            }
        }
    }
}

/// Rounds every finite value to 2 decimal places, matching the reported
/// precision of the original numeric pipeline. NaN passes through.
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}
