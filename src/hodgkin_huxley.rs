use crate::channels::{Conductances, Currents, Gate, HhConstants, VOLTAGE_OFFSET};
use crate::error::{Result, require_finite, series_with_capacity};
use crate::trace::{spike_times, step_count, try_time_axis};

/// Fixed integration step (ms)
pub const HH_DT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HhState {
    pub v: f64,
    pub m: f64,
    pub h: f64,
    pub n: f64,
}

impl HhState {
    pub const INITIAL: HhState = HhState {
        v: -70.0,
        m: 0.05,
        h: 0.54,
        n: 0.34,
    };

    /// Advances every component from this state's values only
    fn euler_step(&self, constants: &HhConstants, i0: f64, dt: f64) -> HhState {
        let u = self.v + VOLTAGE_OFFSET;
        let dv = constants.g_na * self.m.powi(3) * self.h * (constants.e_na - u)
            + constants.g_k * self.n.powi(4) * (constants.e_k - u)
            + constants.g_l * (constants.e_l - u)
            + i0;
        HhState {
            v: self.v + dt * dv,
            m: Gate::M.euler_step(self.m, self.v, dt),
            h: Gate::H.euler_step(self.h, self.v, dt),
            n: Gate::N.euler_step(self.n, self.v, dt),
        }
    }
}

/// One HH run: sample `i` of every sequence sits at `t[i] = i * HH_DT`
#[derive(Debug, Clone, PartialEq)]
pub struct HhTrace {
    pub v: Vec<f64>,
    pub m: Vec<f64>,
    pub h: Vec<f64>,
    pub n: Vec<f64>,
    pub t: Vec<f64>,
    constants: HhConstants,
}

impl HhTrace {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn constants(&self) -> &HhConstants {
        &self.constants
    }

    pub fn state(&self, i: usize) -> Option<HhState> {
        Some(HhState {
            v: *self.v.get(i)?,
            m: *self.m.get(i)?,
            h: *self.h.get(i)?,
            n: *self.n.get(i)?,
        })
    }

    pub fn conductances(&self) -> Vec<Conductances> {
        (0..self.len())
            .map(|i| self.constants.conductances(self.m[i], self.h[i], self.n[i]))
            .collect()
    }

    pub fn currents(&self) -> Vec<Currents> {
        (0..self.len())
            .map(|i| {
                self.constants
                    .currents(self.v[i], self.m[i], self.h[i], self.n[i])
            })
            .collect()
    }

    pub fn spike_times(&self, threshold: f64) -> Vec<f64> {
        // v and t are built together, so the lengths always agree
        spike_times(&self.v, &self.t, threshold).unwrap_or_default()
    }

    pub fn has_non_finite(&self) -> bool {
        [&self.v, &self.m, &self.h, &self.n]
            .iter()
            .any(|seq| seq.iter().any(|x| !x.is_finite()))
    }
}

/// Runs the canonical HH model for `t0` ms under a constant injected current `i0` (mA/cm^2)
pub fn simulate_hh(i0: f64, t0: f64) -> Result<HhTrace> {
    simulate_hh_with(&HhConstants::default(), i0, t0)
}

pub fn simulate_hh_with(constants: &HhConstants, i0: f64, t0: f64) -> Result<HhTrace> {
    let i0 = require_finite("i0", i0)?;
    let samples = step_count(t0, HH_DT)?;

    let t = try_time_axis(samples, HH_DT)?;
    let mut v = series_with_capacity(samples)?;
    let mut m = series_with_capacity(samples)?;
    let mut h = series_with_capacity(samples)?;
    let mut n = series_with_capacity(samples)?;

    let mut state = HhState::INITIAL;
    for i in 0..samples {
        v.push(state.v);
        m.push(state.m);
        h.push(state.h);
        n.push(state.n);
        if i + 1 < samples {
            state = state.euler_step(constants, i0, HH_DT);
        }
    }

    Ok(HhTrace {
        v,
        m,
        h,
        n,
        t,
        constants: *constants,
    })
}
