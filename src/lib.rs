use pyo3::prelude::*;

pub mod channels;
pub mod error;
pub mod hodgkin_huxley;
pub mod integrate_fire;
pub mod sweep;
pub mod trace;

pub use channels::{Conductances, Currents, Gate, HhConstants};
pub use error::{Result, SimError};
pub use hodgkin_huxley::{HH_DT, HhState, HhTrace, simulate_hh, simulate_hh_with};
pub use integrate_fire::{IfParams, IfTrace, Leak, simulate_if, simulate_lif};
pub use sweep::{firing_rates, sweep_hh};

use log::{debug, warn};

type Series = Vec<f64>;

fn run_hh(i0: f64, t0: f64) -> PyResult<HhTrace> {
    debug!("HH run: i0 = {i0} mA/cm^2, t0 = {t0} ms");
    let trace = simulate_hh(i0, t0)?;
    if trace.has_non_finite() {
        warn!("HH run with i0 = {i0} produced non-finite samples");
    }
    Ok(trace)
}

fn if_output(trace: IfTrace) -> (Series, Series) {
    if trace.v.iter().any(|v| !v.is_finite()) {
        warn!("I&F run produced non-finite samples");
    }
    debug!("I&F run: {} samples", trace.len());
    (trace.v, trace.t)
}

/// Python bindings: sequences go out as lists of floats, tuples in the documented order.
#[pymodule]
mod single_neuron_rs {
    use pyo3::prelude::*;

    use super::{Series, if_output, run_hh};
    use crate::channels::Gate;
    use crate::integrate_fire::{IfParams, Leak};

    /// Returns (V, m, h, n, t)
    #[pyfunction]
    fn simulate_hh(i0: f64, t0: f64) -> PyResult<(Series, Series, Series, Series, Series)> {
        let trace = run_hh(i0, t0)?;
        Ok((trace.v, trace.m, trace.h, trace.n, trace.t))
    }

    /// Returns (gNa, gK, gL, t) in mS/cm^2
    #[pyfunction]
    fn hh_conductances(i0: f64, t0: f64) -> PyResult<(Series, Series, Series, Series)> {
        let trace = run_hh(i0, t0)?;
        let g = trace.conductances();
        Ok((
            g.iter().map(|g| g.na).collect(),
            g.iter().map(|g| g.k).collect(),
            g.iter().map(|g| g.leak).collect(),
            trace.t,
        ))
    }

    /// Returns (INa, IK, IL, t) in mA/cm^2
    #[pyfunction]
    fn hh_currents(i0: f64, t0: f64) -> PyResult<(Series, Series, Series, Series)> {
        let trace = run_hh(i0, t0)?;
        let i = trace.currents();
        Ok((
            i.iter().map(|i| i.na).collect(),
            i.iter().map(|i| i.k).collect(),
            i.iter().map(|i| i.leak).collect(),
            trace.t,
        ))
    }

    /// Returns (m_inf, h_inf, n_inf, tau_m, tau_h, tau_n) at each voltage
    #[pyfunction]
    fn gating_curves(v: Series) -> (Series, Series, Series, Series, Series, Series) {
        let steady = |gate: Gate| -> Series { v.iter().map(|&v| gate.steady_state(v)).collect() };
        let tau = |gate: Gate| -> Series { v.iter().map(|&v| gate.time_constant(v)).collect() };
        (
            steady(Gate::M),
            steady(Gate::H),
            steady(Gate::N),
            tau(Gate::M),
            tau(Gate::H),
            tau(Gate::N),
        )
    }

    /// Returns (V, t)
    #[pyfunction]
    #[pyo3(signature = (
        i,
        c=IfParams::DEFAULT.capacitance,
        dt=IfParams::DEFAULT.dt,
        steps=IfParams::DEFAULT.steps,
        v0=IfParams::DEFAULT.v0,
        v_th=IfParams::DEFAULT.v_threshold,
        v_reset=IfParams::DEFAULT.v_reset
    ))]
    fn simulate_if(
        i: f64,
        c: f64,
        dt: f64,
        steps: usize,
        v0: f64,
        v_th: f64,
        v_reset: f64,
    ) -> PyResult<(Series, Series)> {
        let trace = crate::simulate_if(i, c, dt, steps, v0, v_th, v_reset)?;
        Ok(if_output(trace))
    }

    /// Returns (V, t)
    #[pyfunction]
    #[pyo3(signature = (
        i,
        c=IfParams::DEFAULT.capacitance,
        g_leak=0.1,
        e_leak=0.0,
        dt=IfParams::DEFAULT.dt,
        steps=IfParams::DEFAULT.steps,
        v0=IfParams::DEFAULT.v0,
        v_th=IfParams::DEFAULT.v_threshold,
        v_reset=IfParams::DEFAULT.v_reset
    ))]
    #[allow(clippy::too_many_arguments)]
    fn simulate_lif(
        i: f64,
        c: f64,
        g_leak: f64,
        e_leak: f64,
        dt: f64,
        steps: usize,
        v0: f64,
        v_th: f64,
        v_reset: f64,
    ) -> PyResult<(Series, Series)> {
        let leak = Leak {
            g: g_leak,
            e_rev: e_leak,
        };
        let trace = crate::simulate_lif(i, c, leak, dt, steps, v0, v_th, v_reset)?;
        Ok(if_output(trace))
    }

    #[pyfunction]
    #[pyo3(signature = (v, t, threshold=0.0))]
    fn spike_times(v: Series, t: Series, threshold: f64) -> PyResult<Series> {
        Ok(crate::trace::spike_times(&v, &t, threshold)?)
    }

    /// f-I curve of the HH model, in Hz
    #[pyfunction]
    #[pyo3(signature = (currents, t0, threshold=0.0))]
    fn firing_rates(currents: Series, t0: f64, threshold: f64) -> PyResult<Series> {
        Ok(crate::firing_rates(&currents, t0, threshold)?)
    }
}
