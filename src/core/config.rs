use crate::core::entity::EnergyLevel;
use crate::error::{Error, Result};
use rand::distr::Bernoulli;

/// Relative tolerance when turning `total_time / dt` into a tick count.
const TICK_ROUND_TOL: f64 = 1e-9;

/// Rate constants of the three-level scheme, per unit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Absorption rate of a ground-state atom with a photon in range.
    pub y_abs: f64,
    /// Spontaneous emission rate from E1.
    pub y_10: f64,
    /// Spontaneous part of the E2 → E1 decay.
    pub y_sp: f64,
    /// Non-radiative part of the E2 → E1 decay.
    pub y_nr: f64,
    /// Stimulated emission rate from E1 with a photon in range.
    pub b_10: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            y_abs: 5.0,
            y_10: 5.0,
            y_sp: 10.0,
            y_nr: 10.0,
            b_10: 20.0,
        }
    }
}

/// Initial configuration of a lasing cavity.
///
/// `Default` reproduces the classroom setup: 400 pumped atoms in a 10 × 5 box,
/// one seed photon at the centre, light speed 10 and `dt = 0.01` over 100 time units.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserConfig {
    /// Number of atoms placed uniformly at random (`N`).
    pub num_atoms: usize,
    /// Cavity half-width; x is reflecting on ±half_width.
    pub half_width: f64,
    /// Cavity half-height; y is open on ±half_height.
    pub half_height: f64,
    /// Capture radius `r_abs`.
    pub capture_radius: f64,
    pub rates: Rates,
    /// Photon speed shared by all photons.
    pub speed: f64,
    /// Fixed timestep.
    pub dt: f64,
    /// Total simulated time.
    pub total_time: f64,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Level of every randomly placed atom at t = 0.
    pub initial_level: EnergyLevel,
    /// Photons injected at the origin with random direction at t = 0.
    pub initial_photons: usize,
    /// Keep an event record of every transition and escape. Off by default, since the
    /// record grows with run length.
    pub record_events: bool,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            num_atoms: 400,
            half_width: 5.0,
            half_height: 2.5,
            capture_radius: 1.0,
            rates: Rates::default(),
            speed: 10.0,
            dt: 0.01,
            total_time: 100.0,
            seed: None,
            initial_level: EnergyLevel::E2,
            initial_photons: 1,
            record_events: false,
        }
    }
}

impl LaserConfig {
    /// Full validation, including `N > 0`.
    pub fn validate(&self) -> Result<()> {
        if self.num_atoms == 0 {
            return Err(Error::config("num_atoms", 0.0, "must be > 0"));
        }
        self.validate_dynamics()
    }

    /// Validation of everything except the atom count.
    ///
    /// Used by explicit layouts, where the atom list itself defines `N`.
    pub fn validate_dynamics(&self) -> Result<()> {
        positive("dt", self.dt)?;
        positive("half_width", self.half_width)?;
        positive("half_height", self.half_height)?;
        positive("speed", self.speed)?;
        non_negative("capture_radius", self.capture_radius)?;
        non_negative("total_time", self.total_time)?;
        TransitionProbabilities::new(&self.rates, self.dt)?;
        Ok(())
    }

    /// Number of ticks in a full run: ceil(total_time / dt).
    ///
    /// Quotients within floating-point noise of an integer are rounded to it,
    /// so `100 / 0.01` gives 10000 rather than 10001.
    pub fn total_ticks(&self) -> u64 {
        let raw = self.total_time / self.dt;
        let nearest = raw.round();
        let ticks = if (raw - nearest).abs() <= TICK_ROUND_TOL * nearest.max(1.0) {
            nearest
        } else {
            raw.ceil()
        };
        ticks.max(0.0) as u64
    }
}

/// Per-tick Bernoulli trials derived from the rates and `dt`.
#[derive(Debug, Clone, Copy)]
pub struct TransitionProbabilities {
    pub absorption: Bernoulli,
    pub spontaneous: Bernoulli,
    pub stimulated: Bernoulli,
    pub relaxation: Bernoulli,
}

impl TransitionProbabilities {
    /// Build the trials, rejecting any `rate * dt` outside [0, 1).
    pub fn new(rates: &Rates, dt: f64) -> Result<Self> {
        non_negative("y_sp", rates.y_sp)?;
        non_negative("y_nr", rates.y_nr)?;
        Ok(Self {
            absorption: trial("y_abs", rates.y_abs, dt)?,
            spontaneous: trial("y_10", rates.y_10, dt)?,
            stimulated: trial("B_10", rates.b_10, dt)?,
            relaxation: trial("y_sp+y_nr", rates.y_sp + rates.y_nr, dt)?,
        })
    }
}

fn trial(param: &'static str, rate: f64, dt: f64) -> Result<Bernoulli> {
    non_negative(param, rate)?;
    let p = rate * dt;
    if p >= 1.0 {
        return Err(Error::config(
            param,
            rate,
            "rate * dt must be < 1 for a per-tick probability",
        ));
    }
    Bernoulli::new(p).map_err(|_| Error::config(param, rate, "rate * dt is not a probability"))
}

fn positive(param: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::config(param, value, "must be finite and > 0"));
    }
    Ok(())
}

fn non_negative(param: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::config(param, value, "must be finite and >= 0"));
    }
    Ok(())
}
