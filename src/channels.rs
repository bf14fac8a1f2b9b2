///
/// The channels define the dynamics that take place within the membrane.
/// Classic squid-axon parameterisation, as in
/// https://nrn.readthedocs.io/en/9.0.0/tutorials/scripting-neuron-basics.html#Biophysical-mechanisms
///
/// Reported voltages sit around -70 mV; the rate functions and driving forces
/// work on the depolarisation `u = V + VOLTAGE_OFFSET`, which puts rest near 0.
///

/// Shift between reported voltage and the internal HH frame (mV)
pub const VOLTAGE_OFFSET: f64 = 65.0;

/// Below this |x / y| the vtrap expression switches to its series expansion
const VTRAP_EPSILON: f64 = 1e-6;

/// Maximal conductances (mS/cm^2) and reversal potentials (mV, HH frame)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HhConstants {
    pub g_na: f64,
    pub e_na: f64,
    pub g_k: f64,
    pub e_k: f64,
    pub g_l: f64,
    pub e_l: f64,
}

impl Default for HhConstants {
    fn default() -> Self {
        Self {
            g_na: 120.0,
            e_na: 115.0,
            g_k: 36.0,
            e_k: -12.0,
            g_l: 0.3,
            e_l: 10.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Sodium activation
    M,
    /// Sodium inactivation
    H,
    /// Potassium activation
    N,
}

impl Gate {
    pub const ALL: [Gate; 3] = [Gate::M, Gate::H, Gate::N];

    /// Opening rate (1/ms) at reported voltage `v`
    pub fn alpha(self, v: f64) -> f64 {
        let u = v + VOLTAGE_OFFSET;
        match self {
            Gate::M => 0.1 * vtrap(25.0 - u, 10.0),
            Gate::H => 0.07 * (-u / 20.0).exp(),
            Gate::N => 0.01 * vtrap(10.0 - u, 10.0),
        }
    }

    /// Closing rate (1/ms) at reported voltage `v`
    pub fn beta(self, v: f64) -> f64 {
        let u = v + VOLTAGE_OFFSET;
        match self {
            Gate::M => 4.0 * (-u / 18.0).exp(),
            Gate::H => 1.0 / (((30.0 - u) / 10.0).exp() + 1.0),
            Gate::N => 0.125 * (-u / 80.0).exp(),
        }
    }

    /// alpha / (alpha + beta)
    pub fn steady_state(self, v: f64) -> f64 {
        let alpha = self.alpha(v);
        alpha / (alpha + self.beta(v))
    }

    /// 1 / (alpha + beta), in ms
    pub fn time_constant(self, v: f64) -> f64 {
        1.0 / (self.alpha(v) + self.beta(v))
    }

    /// One explicit Euler step of dx/dt = alpha (1 - x) - beta x, rates taken at `v`
    pub fn euler_step(self, x: f64, v: f64, dt: f64) -> f64 {
        x + dt * (self.alpha(v) * (1.0 - x) - self.beta(v) * x)
    }
}

/// x / (exp(x / y) - 1), finite at x = 0 where it tends to y
fn vtrap(x: f64, y: f64) -> f64 {
    let ratio = x / y;
    if ratio.abs() < VTRAP_EPSILON {
        y * (1.0 - ratio / 2.0)
    } else {
        x / ratio.exp_m1()
    }
}

/// Per-channel conductances (mS/cm^2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conductances {
    pub na: f64,
    pub k: f64,
    pub leak: f64,
}

/// Per-channel currents (mA/cm^2), signed as they enter dV/dt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Currents {
    pub na: f64,
    pub k: f64,
    pub leak: f64,
}

impl Currents {
    pub fn total(&self) -> f64 {
        self.na + self.k + self.leak
    }
}

impl HhConstants {
    pub fn conductances(&self, m: f64, h: f64, n: f64) -> Conductances {
        Conductances {
            na: self.g_na * m.powi(3) * h,
            k: self.g_k * n.powi(4),
            leak: self.g_l,
        }
    }

    /// Ionic currents with the (E - (V + 65)) driving force used by the integrator
    pub fn currents(&self, v: f64, m: f64, h: f64, n: f64) -> Currents {
        let g = self.conductances(m, h, n);
        let u = v + VOLTAGE_OFFSET;
        Currents {
            na: g.na * (self.e_na - u),
            k: g.k * (self.e_k - u),
            leak: g.leak * (self.e_l - u),
        }
    }
}
