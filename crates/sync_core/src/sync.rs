//! Per-period offset synchronization: a coarse FFT cross-correlation
//! estimate refined by a fine least-mean-deviation search over matched
//! passes, then frame stamping for every event in the period.

use std::collections::HashMap;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::feature_store::FeatureStore;
use crate::model::{Event, GenericEventType};

/// Maps a timestamp to an absolute frame given a period-start frame.
pub fn event_frame(timestamp: f64, period_start_frame: i64) -> i64 {
    period_start_frame + (timestamp * crate::config::FPS).round() as i64
}

/// Stamps every event with `provider_frame`/`skc_frame`, one period at a
/// time. Periods with no tracking coverage (absent from `period_bounds`)
/// are skipped — their events keep `provider_frame = None`.
pub fn stamp_events(events: &mut [Event], store: &FeatureStore, config: &SyncConfig) -> Result<()> {
    let periods: Vec<u8> = {
        let mut set: Vec<u8> = events.iter().map(|e| e.period).collect();
        set.sort_unstable();
        set.dedup();
        set
    };

    for period in periods {
        let refined_start = refined_period_start(events, store, config, period);
        for event in events.iter_mut() {
            if event.period == period {
                let frame = event_frame(event.timestamp, refined_start);
                event.provider_frame = Some(frame);
                event.skc_frame = Some(frame);
            }
        }
    }
    Ok(())
}

fn is_close_to_ball_signal(store: &FeatureStore, ply_idx: usize, th: f64) -> Vec<f64> {
    (0..store.nb_frames)
        .map(|f| {
            let d = store.ply_dist_to_ball(f, ply_idx);
            if d.is_finite() && d < th {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn pass_event_frames_by_player(
    events: &[Event],
    period: u8,
    default_start: i64,
    ply_id_to_idx: &HashMap<u64, usize>,
) -> HashMap<u64, Vec<i64>> {
    let mut out: HashMap<u64, Vec<i64>> = ply_id_to_idx.keys().map(|&id| (id, Vec::new())).collect();
    for event in events {
        if event.period != period || event.generic_event_type != GenericEventType::Pass {
            continue;
        }
        if let Some(player_id) = event.player_id {
            if ply_id_to_idx.contains_key(&player_id) {
                out.entry(player_id).or_default().push(event_frame(event.timestamp, default_start));
            }
        }
    }
    out
}

/// Coarse per-period estimate: cross-correlate each qualifying player's
/// pass-indicator signal against their ball-proximity signal, take the
/// median offset across players.
fn coarse_period_start(events: &[Event], store: &FeatureStore, config: &SyncConfig, period: u8) -> i64 {
    let default_start = config.default_start_for(period);
    let min_pass = config.min_pass_for(period);
    let frames_by_player = pass_event_frames_by_player(events, period, default_start, &store.ply_id_to_idx);

    let mut estimates = Vec::new();
    for (&player_id, &ply_idx) in &store.ply_id_to_idx {
        let frames = match frames_by_player.get(&player_id) {
            Some(f) => f,
            None => continue,
        };
        if frames.len() < min_pass {
            continue;
        }

        let close_signal = is_close_to_ball_signal(store, ply_idx, config.th_dist_ply_ball);
        let start = default_start.max(0) as usize;
        if start >= close_signal.len() {
            continue;
        }
        let c_tail = &close_signal[start..];

        let max_frame = *frames.iter().max().unwrap();
        let hist_len = (max_frame - default_start + 1).max(0) as usize;
        let mut histogram = vec![0.0f64; hist_len];
        for &frame in frames {
            let rel = frame - default_start;
            if rel >= 0 {
                histogram[rel as usize] += 1.0;
            }
        }
        let reversed: Vec<f64> = histogram.iter().rev().copied().collect();
        if reversed.is_empty() {
            continue;
        }

        let conv = fft_convolve_full(c_tail, &reversed);
        let argmax = argmax(&conv);
        let offset = argmax as i64 - reversed.len() as i64 + 1;
        estimates.push(offset + default_start);
    }

    if estimates.is_empty() {
        default_start
    } else {
        median_trunc(estimates)
    }
}

struct MatchedPass {
    matched_frame: i64,
    timestamp: f64,
}

fn matched_passes(
    events: &[Event],
    store: &FeatureStore,
    config: &SyncConfig,
    period: u8,
    coarse_start: i64,
) -> Vec<MatchedPass> {
    let offset = config.search_offset;
    let mut out = Vec::new();
    for event in events {
        if event.period != period || event.generic_event_type != GenericEventType::Pass {
            continue;
        }
        let Some(player_id) = event.player_id else { continue };
        let Some(&ply_idx) = store.ply_id_to_idx.get(&player_id) else { continue };

        let frame = event_frame(event.timestamp, coarse_start);
        let win_lo = (frame - offset).max(0);
        let win_hi = (frame + offset).min(store.nb_frames as i64);
        if win_hi <= win_lo {
            continue;
        }

        let mut last_close: Option<i64> = None;
        for f in win_lo..win_hi {
            let d = store.ply_dist_to_ball(f as usize, ply_idx);
            if d.is_finite() && d < config.th_dist_ply_ball {
                last_close = Some(f);
            }
        }
        if let Some(matched_frame) = last_close {
            out.push(MatchedPass { matched_frame, timestamp: event.timestamp });
        }
    }
    out
}

/// Fine refinement: search candidate starts around the coarse estimate,
/// keep the one minimizing mean absolute deviation against matched
/// passes, then apply the empirical off-by-one correction.
fn refined_period_start(events: &[Event], store: &FeatureStore, config: &SyncConfig, period: u8) -> i64 {
    let coarse = coarse_period_start(events, store, config, period);
    let matches = matched_passes(events, store, config, period, coarse);
    if matches.is_empty() {
        return coarse;
    }

    let offset = config.search_offset;
    let mut best_candidate = coarse;
    let mut best_deviation = f64::INFINITY;
    for candidate in (coarse - offset)..(coarse + offset) {
        let total: f64 = matches
            .iter()
            .map(|m| (m.matched_frame - event_frame(m.timestamp, candidate)).unsigned_abs() as f64)
            .sum();
        let mean = total / matches.len() as f64;
        if mean < best_deviation {
            best_deviation = mean;
            best_candidate = candidate;
        }
    }
    best_candidate - 1
}

fn median_trunc(mut values: Vec<i64>) -> i64 {
    values.sort_unstable();
    let n = values.len();
    let mid = (n - 1) as f64 / 2.0;
    let lo = mid.floor() as usize;
    let hi = mid.ceil() as usize;
    let frac = mid - lo as f64;
    let result = values[lo] as f64 + (values[hi] as f64 - values[lo] as f64) * frac;
    result.trunc() as i64
}

fn argmax(values: &[f64]) -> usize {
    let mut best_idx = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    best_idx
}

/// Full-mode discrete linear convolution via FFT. Returns a vector of
/// length `a.len() + b.len() - 1`. Correctness, not throughput, matters
/// here — each call handles one player for one period.
fn fft_convolve_full(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let out_len = a.len() + b.len() - 1;
    let fft_len = out_len.next_power_of_two();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut buf_a: Vec<Complex<f64>> = a.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_a.resize(fft_len, Complex::new(0.0, 0.0));
    let mut buf_b: Vec<Complex<f64>> = b.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_b.resize(fft_len, Complex::new(0.0, 0.0));

    fft.process(&mut buf_a);
    fft.process(&mut buf_b);

    let mut buf_c: Vec<Complex<f64>> = buf_a.iter().zip(buf_b.iter()).map(|(x, y)| x * y).collect();
    ifft.process(&mut buf_c);

    let scale = 1.0 / fft_len as f64;
    buf_c.iter().take(out_len).map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convolution_matches_brute_force_for_small_signals() {
        let a = [1.0, 2.0, 3.0];
        let b = [0.0, 1.0, 0.5];
        let got = fft_convolve_full(&a, &b);

        // brute-force full convolution
        let mut want = vec![0.0; a.len() + b.len() - 1];
        for (i, &av) in a.iter().enumerate() {
            for (j, &bv) in b.iter().enumerate() {
                want[i + j] += av * bv;
            }
        }
        for (g, w) in got.iter().zip(want.iter()) {
            assert!((g - w).abs() < 1e-9, "{g} vs {w}");
        }
    }

    #[test]
    fn event_frame_rounds_timestamp_to_nearest_frame() {
        assert_eq!(event_frame(4.0, 0), 40);
        assert_eq!(event_frame(-0.3, 100), 97);
    }

    #[test]
    fn median_trunc_matches_numpy_percentile_50_then_int() {
        assert_eq!(median_trunc(vec![1, 2, 3]), 2);
        assert_eq!(median_trunc(vec![1, 2, 3, 4]), 2); // (2+3)/2=2.5, trunc -> 2
    }
}
