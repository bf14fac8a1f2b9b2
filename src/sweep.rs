use log::{debug, info};
use rayon::prelude::*;

use crate::error::Result;
use crate::hodgkin_huxley::{HH_DT, HhTrace, simulate_hh};
use crate::trace::firing_rate_hz;

/// Independent HH runs, one per injected current, in input order.
///
/// Runs share nothing, so they are spread over the rayon pool. A configuration
/// error in any run fails the whole sweep.
pub fn sweep_hh(currents: &[f64], t0: f64) -> Result<Vec<HhTrace>> {
    debug!("Sweeping {} currents over {} ms", currents.len(), t0);
    currents
        .par_iter()
        .map(|&i0| simulate_hh(i0, t0))
        .collect()
}

/// f-I curve: spike rate (Hz) at each injected current
pub fn firing_rates(currents: &[f64], t0: f64, threshold: f64) -> Result<Vec<f64>> {
    let rates = sweep_hh(currents, t0)?
        .iter()
        .map(|trace| firing_rate_hz(&trace.v, HH_DT, threshold))
        .collect::<Result<Vec<f64>>>()?;
    info!(
        "f-I sweep: {} points, peak rate {:.1} Hz",
        rates.len(),
        rates.iter().cloned().fold(0.0, f64::max)
    );
    Ok(rates)
}
