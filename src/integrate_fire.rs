//! Integrate-and-fire membrane with a hard threshold reset.
//!
//! ```text
//! C dV/dt = I - g_leak (V - e_rev)      (leak term absent for the perfect integrator)
//! if V > v_threshold: V = v_reset
//! ```
//!
//! The reset is checked once per step, after the Euler update, on the new sample only.
//! There is no refractory period: the step after a reset integrates from `v_reset` again,
//! even when `v_reset` sits at or above the threshold.

use itertools::Itertools;

use crate::error::{Result, SimError, require_finite, require_positive, series_with_capacity};
use crate::trace::try_time_axis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leak {
    pub g: f64,
    pub e_rev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfParams {
    /// Injected current
    pub current: f64,
    pub capacitance: f64,
    pub dt: f64,
    /// Number of stored samples, the initial one included
    pub steps: usize,
    pub v0: f64,
    /// May be infinite to disable the reset
    pub v_threshold: f64,
    pub v_reset: f64,
    pub leak: Option<Leak>,
}

impl Default for IfParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl IfParams {
    /// Also the keyword defaults of the Python `simulate_if`
    pub const DEFAULT: IfParams = IfParams {
        current: 1.0,
        capacitance: 1.0,
        dt: 0.01,
        steps: 1000,
        v0: 0.2,
        v_threshold: 1.0,
        v_reset: 0.0,
        leak: None,
    };

    pub fn validate(&self) -> Result<()> {
        require_finite("current", self.current)?;
        require_positive("capacitance", self.capacitance)?;
        require_positive("dt", self.dt)?;
        require_finite("v0", self.v0)?;
        require_finite("v_reset", self.v_reset)?;
        if self.v_threshold.is_nan() {
            return Err(SimError::NonFinite {
                parameter: "v_threshold",
                value: self.v_threshold,
            });
        }
        if self.steps == 0 {
            return Err(SimError::EmptyRun { parameter: "steps" });
        }
        if let Some(leak) = self.leak {
            require_finite("leak.g", leak.g)?;
            if leak.g < 0.0 {
                return Err(SimError::NonPositive {
                    parameter: "leak.g",
                    value: leak.g,
                });
            }
            require_finite("leak.e_rev", leak.e_rev)?;
        }
        Ok(())
    }

    fn derivative(&self, v: f64) -> f64 {
        match self.leak {
            None => self.current / self.capacitance,
            Some(leak) => (self.current - leak.g * (v - leak.e_rev)) / self.capacitance,
        }
    }

    pub fn run(&self) -> Result<IfTrace> {
        self.validate()?;

        let t = try_time_axis(self.steps, self.dt)?;
        let mut v = series_with_capacity(self.steps)?;
        v.push(self.v0);
        for k in 1..self.steps {
            let prev = v[k - 1];
            let mut next = self.euler_step(prev);
            if next > self.v_threshold {
                next = self.v_reset;
            }
            v.push(next);
        }

        Ok(IfTrace { v, t })
    }

    fn euler_step(&self, v: f64) -> f64 {
        v + self.dt * self.derivative(v)
    }

    /// Indices of `v` holding a post-reset value.
    ///
    /// Replays each Euler update from the stored sample before it, so it is exact for a
    /// trace produced by `run` with these parameters.
    pub fn reset_indices(&self, v: &[f64]) -> Vec<usize> {
        v.iter()
            .tuple_windows()
            .positions(|(prev, _)| self.euler_step(*prev) > self.v_threshold)
            .map(|k| k + 1)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfTrace {
    pub v: Vec<f64>,
    pub t: Vec<f64>,
}

impl IfTrace {
    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}

/// Perfect (leak-free) integrator
pub fn simulate_if(
    i: f64,
    c: f64,
    dt: f64,
    steps: usize,
    v0: f64,
    v_th: f64,
    v_reset: f64,
) -> Result<IfTrace> {
    IfParams {
        current: i,
        capacitance: c,
        dt,
        steps,
        v0,
        v_threshold: v_th,
        v_reset,
        leak: None,
    }
    .run()
}

#[allow(clippy::too_many_arguments)]
pub fn simulate_lif(
    i: f64,
    c: f64,
    leak: Leak,
    dt: f64,
    steps: usize,
    v0: f64,
    v_th: f64,
    v_reset: f64,
) -> Result<IfTrace> {
    IfParams {
        current: i,
        capacitance: c,
        dt,
        steps,
        v0,
        v_threshold: v_th,
        v_reset,
        leak: Some(leak),
    }
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn perfect(current: f64, dt: f64, steps: usize, v0: f64, v_threshold: f64, v_reset: f64) -> IfParams {
        IfParams {
            current,
            dt,
            steps,
            v0,
            v_threshold,
            v_reset,
            ..IfParams::DEFAULT
        }
    }

    #[test]
    fn test_linear_rise_without_threshold() {
        let params = perfect(1.0, 0.01, 1000, 0.2, f64::INFINITY, 0.0);
        let trace = params.run().unwrap();
        assert_eq!(trace.len(), 1000);
        assert_eq!(trace.v[0], 0.2);
        assert!((trace.v[1] - 0.21).abs() < 1e-12);
        for (k, v) in trace.v.iter().enumerate() {
            assert!((v - (0.2 + k as f64 * 0.01)).abs() < 1e-9, "sample {k}");
        }
        assert!(params.reset_indices(&trace.v).is_empty());
    }

    #[test]
    fn test_sawtooth() {
        let params = perfect(1.0, 0.01, 1000, 0.2, 1.0, 0.0);
        let trace = simulate_if(1.0, 1.0, 0.01, 1000, 0.2, 1.0, 0.0).unwrap();
        assert_eq!(trace, params.run().unwrap());

        let resets = params.reset_indices(&trace.v);
        assert_eq!(resets.first(), Some(&80));
        for &k in &resets {
            assert_eq!(trace.v[k], 0.0);
            assert!(trace.v[k - 1] <= 1.0);
        }
        for pair in resets.windows(2) {
            assert_eq!(pair[1] - pair[0], 100);
        }
        assert_eq!(resets.len(), 10);
        assert!(trace.v.iter().all(|v| *v <= 1.0));
        assert!((trace.t[resets[0]] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_no_current_holds_voltage() {
        for c in [0.5, 1.0, 20.0] {
            let params = IfParams {
                capacitance: c,
                ..perfect(0.0, 0.01, 1000, 0.2, 0.5, 0.0)
            };
            let trace = params.run().unwrap();
            assert!(trace.v.iter().all(|v| *v == 0.2));
            assert!(params.reset_indices(&trace.v).is_empty());
        }
    }

    #[test]
    fn test_negative_current_never_resets() {
        let params = perfect(-1.0, 0.01, 1000, 0.2, 1.0, 0.0);
        let trace = params.run().unwrap();
        assert!(params.reset_indices(&trace.v).is_empty());
        assert!(trace.v.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_reset_above_threshold_fires_every_step() {
        let params = perfect(1.0, 0.1, 50, 0.2, 1.0, 1.5);
        let trace = params.run().unwrap();
        let resets = params.reset_indices(&trace.v);
        let first = resets[0];
        assert_eq!(resets, (first..50).collect::<Vec<_>>());
        assert!(trace.v[first..].iter().all(|v| *v == 1.5));
    }

    #[test]
    fn test_reset_indices_without_samples_to_compare() {
        let params = IfParams::default();
        assert!(params.reset_indices(&[]).is_empty());
        assert!(params.reset_indices(&[5.0]).is_empty());
    }

    #[test]
    fn test_time_axis() {
        let trace = simulate_if(1.0, 1.0, 0.5, 4, 0.0, 10.0, 0.0).unwrap();
        assert_eq!(trace.t, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_leak_relaxes_to_steady_state() {
        // steady state is e_rev + I / g = 0.5, below threshold
        let params = IfParams {
            leak: Some(Leak { g: 2.0, e_rev: 0.0 }),
            ..perfect(1.0, 0.01, 1000, 0.0, 1.0, 0.0)
        };
        let trace = params.run().unwrap();
        assert!(params.reset_indices(&trace.v).is_empty());
        assert!((trace.v.last().unwrap() - 0.5).abs() < 1e-6);
        assert!(trace.v.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_leak_fires_when_drive_exceeds_threshold() {
        let leak = Leak { g: 0.5, e_rev: 0.0 };
        let leaky = IfParams {
            leak: Some(leak),
            ..perfect(1.0, 0.01, 1000, 0.0, 1.0, 0.0)
        };
        let trace = simulate_lif(1.0, 1.0, leak, 0.01, 1000, 0.0, 1.0, 0.0).unwrap();
        let resets = leaky.reset_indices(&trace.v);
        assert!(!resets.is_empty());
        for &k in &resets {
            assert_eq!(trace.v[k], 0.0);
        }
        // with a leak the charge-up is slower than the perfect integrator
        let plain = perfect(1.0, 0.01, 1000, 0.0, 1.0, 0.0);
        let plain_resets = plain.reset_indices(&plain.run().unwrap().v);
        assert!(resets[0] > plain_resets[0]);
    }

    #[test]
    fn test_zero_leak_matches_perfect_integrator() {
        let leak = Leak { g: 0.0, e_rev: -70.0 };
        let a = simulate_lif(1.0, 1.0, leak, 0.01, 500, 0.2, 1.0, 0.0).unwrap();
        let b = simulate_if(1.0, 1.0, 0.01, 500, 0.2, 1.0, 0.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(IfParams::default(), IfParams::DEFAULT);
        assert_eq!(IfParams::DEFAULT.v_threshold, 1.0);
        assert_eq!(IfParams::DEFAULT.v_reset, 0.0);
        assert_eq!(IfParams::DEFAULT.steps, 1000);
        assert!(IfParams::DEFAULT.leak.is_none());
    }

    #[test]
    fn test_invalid_configuration() {
        let base = IfParams::default();
        assert!(base.validate().is_ok());

        let cases = [
            IfParams { dt: 0.0, ..base },
            IfParams { dt: f64::NAN, ..base },
            IfParams { capacitance: 0.0, ..base },
            IfParams { steps: 0, ..base },
            IfParams { v_threshold: f64::NAN, ..base },
            IfParams { current: f64::INFINITY, ..base },
            IfParams { leak: Some(Leak { g: -1.0, e_rev: 0.0 }), ..base },
        ];
        for params in cases {
            assert!(params.run().is_err(), "{params:?}");
        }
        assert!(IfParams { v_threshold: f64::NEG_INFINITY, ..base }.run().is_ok());
    }

    #[test]
    fn test_oversized_run_is_a_configuration_error() {
        let params = IfParams {
            steps: usize::MAX,
            ..IfParams::default()
        };
        assert!(matches!(params.run(), Err(SimError::TooManySamples { .. })));
        assert!(simulate_if(1.0, 1.0, 0.01, usize::MAX / 2, 0.2, 1.0, 0.0).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_deterministic_and_bounded(
            i in -5.0f64..5.0,
            c in 0.1f64..10.0,
            v0 in -1.0f64..1.0,
            steps in 1usize..2000,
        ) {
            let params = IfParams { current: i, capacitance: c, v0, steps, ..IfParams::default() };
            let a = params.run().unwrap();
            let b = params.run().unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.v.len(), steps);
            prop_assert_eq!(a.t.len(), steps);
            prop_assert_eq!(a.v[0], v0);
            prop_assert!(a.v[1..].iter().all(|v| *v <= params.v_threshold));
            for k in params.reset_indices(&a.v) {
                prop_assert_eq!(a.v[k], params.v_reset);
            }
        }
    }
}
