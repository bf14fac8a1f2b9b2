//! Conventions shared by every simulated trace: how many samples a run has,
//! the time axis they sit on, and threshold-crossing analysis on top of them.

use itertools::Itertools;

use crate::error::{Result, SimError, require_positive, series_with_capacity};

/// Ratios closer than this (relative) to an integer are treated as that integer
const STEP_RATIO_TOLERANCE: f64 = 1e-9;

/// Number of samples covering `duration` at step `dt`: ceil(duration / dt).
///
/// Float division noise is absorbed first, so 0.07 / 0.01 gives 7 samples and not 8.
pub fn step_count(duration: f64, dt: f64) -> Result<usize> {
    let duration = require_positive("duration", duration)?;
    let dt = require_positive("dt", dt)?;

    let ratio = duration / dt;
    let nearest = ratio.round();
    let samples = if (ratio - nearest).abs() <= STEP_RATIO_TOLERANCE * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    // usize::MAX as f64 rounds up to 2^64, which the cast would saturate
    if !samples.is_finite() || samples >= usize::MAX as f64 {
        return Err(SimError::TooManySamples { samples });
    }
    Ok((samples as usize).max(1))
}

/// t[i] = i * dt
pub fn time_axis(len: usize, dt: f64) -> Vec<f64> {
    (0..len).map(|i| i as f64 * dt).collect()
}

/// `time_axis` for integrator output, failing cleanly when the buffer cannot be allocated
pub(crate) fn try_time_axis(len: usize, dt: f64) -> Result<Vec<f64>> {
    let mut t = series_with_capacity(len)?;
    t.extend((0..len).map(|i| i as f64 * dt));
    Ok(t)
}

/// Indices `k` where the trace goes from below `threshold` at `k - 1` to at or above it at `k`.
pub fn upward_crossings(v: &[f64], threshold: f64) -> Vec<usize> {
    v.iter()
        .tuple_windows()
        .positions(|(prev, curr)| *prev < threshold && *curr >= threshold)
        .map(|k| k + 1)
        .collect()
}

pub fn spike_times(v: &[f64], t: &[f64], threshold: f64) -> Result<Vec<f64>> {
    if v.len() != t.len() {
        return Err(SimError::LengthMismatch {
            expected: v.len(),
            found: t.len(),
        });
    }
    Ok(upward_crossings(v, threshold)
        .into_iter()
        .map(|k| t[k])
        .collect())
}

/// Crossings per second, with `dt` in ms
pub fn firing_rate_hz(v: &[f64], dt: f64, threshold: f64) -> Result<f64> {
    let dt = require_positive("dt", dt)?;
    if v.is_empty() {
        return Err(SimError::EmptyRun { parameter: "v" });
    }
    let duration_s = v.len() as f64 * dt / 1000.0;
    Ok(upward_crossings(v, threshold).len() as f64 / duration_s)
}
