use crate::core::config::{LaserConfig, TransitionProbabilities};
use crate::core::entity::{Atom, Direction, EnergyLevel, Photon, Positioned, DIM};
use crate::core::event::{Event, EventKind};
use crate::core::interaction::InteractionEngine;
use crate::core::kinematics::Cavity;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::fmt;

/// Small numeric tolerance for time comparisons.
const EPS_TIME: f64 = 1e-12;

/// Read-only view of a photon handed to snapshot consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonView {
    pub id: u64,
    pub position: [f64; DIM],
    pub direction: f64,
}

/// Read-only view of an atom handed to snapshot consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomView {
    pub position: [f64; DIM],
    pub level: EnergyLevel,
}

/// World state after a tick.
///
/// `photons` has variable length; `atoms` always has length N in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f64,
    pub photons: Vec<PhotonView>,
    pub atoms: Vec<AtomView>,
}

impl Snapshot {
    /// Photon positions in snapshot order.
    pub fn photon_positions(&self) -> Vec<[f64; DIM]> {
        self.photons.iter().map(|p| p.position).collect()
    }
}

/// Consumer of post-tick snapshots (renderers, recorders, loggers).
pub trait SnapshotSink {
    /// Called once after every tick of `Simulation::run`.
    fn on_tick(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> SnapshotSink for F {
    fn on_tick(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Number of atoms in each energy level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Populations {
    pub e0: usize,
    pub e1: usize,
    pub e2: usize,
}

impl Populations {
    /// Count for one level.
    pub fn get(&self, level: EnergyLevel) -> usize {
        match level {
            EnergyLevel::E0 => self.e0,
            EnergyLevel::E1 => self.e1,
            EnergyLevel::E2 => self.e2,
        }
    }

    /// Total number of atoms.
    pub fn total(&self) -> usize {
        self.e0 + self.e1 + self.e2
    }
}

impl fmt::Display for Populations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E0={} E1={} E2={}", self.e0, self.e1, self.e2)
    }
}

/// Lasing cavity: a fixed set of atoms, a changing set of photons and the
/// fixed-step driver that advances them.
///
/// Each tick runs the interaction pass over all atoms, then photon transport,
/// then replaces the photon set with the survivors.
#[derive(Debug)]
pub struct Simulation {
    config: LaserConfig,
    engine: InteractionEngine,
    cavity: Cavity,
    tick: u64,
    time_now: f64,
    num_atoms: usize,
    atoms: Vec<Atom>,
    photons: Vec<Photon>,
    next_photon_id: u64,
    events: Vec<Event>,
    rng: StdRng,
}

impl Simulation {
    /// Create a cavity with `config.num_atoms` atoms placed uniformly at random, all in
    /// `config.initial_level`, plus `config.initial_photons` photons at the origin.
    ///
    /// Errors: `Error::Config` if any option is out of range.
    pub fn new(config: LaserConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);

        let (hw, hh) = (config.half_width, config.half_height);
        let mut atoms = Vec::with_capacity(config.num_atoms);
        for _ in 0..config.num_atoms {
            let x = rng.random_range(-hw..hw);
            let y = rng.random_range(-hh..hh);
            atoms.push(Atom::new(x, y, config.initial_level)?);
        }
        Self::assemble(config, atoms, rng)
    }

    /// Create a cavity with an explicit atom layout.
    ///
    /// The layout defines N (zero is allowed, giving a photons-only cavity) and
    /// `config.num_atoms` is ignored. `config.initial_photons` are still injected.
    pub fn with_atoms(config: LaserConfig, atoms: Vec<Atom>) -> Result<Self> {
        config.validate_dynamics()?;
        let rng = seeded_rng(config.seed);
        Self::assemble(config, atoms, rng)
    }

    fn assemble(config: LaserConfig, atoms: Vec<Atom>, rng: StdRng) -> Result<Self> {
        let probabilities = TransitionProbabilities::new(&config.rates, config.dt)?;
        let engine = InteractionEngine::new(probabilities, config.capture_radius);
        let cavity = Cavity::new(config.half_width, config.half_height);
        let mut sim = Self {
            num_atoms: atoms.len(),
            atoms,
            photons: Vec::new(),
            next_photon_id: 0,
            events: Vec::new(),
            tick: 0,
            time_now: 0.0,
            engine,
            cavity,
            rng,
            config,
        };
        for _ in 0..sim.config.initial_photons {
            sim.add_photon(0.0, 0.0, Direction::Random)?;
        }
        log::info!(
            "cavity {}x{} with {} atoms, {} photons, {} ticks of dt={}",
            2.0 * sim.config.half_width,
            2.0 * sim.config.half_height,
            sim.num_atoms,
            sim.photons.len(),
            sim.config.total_ticks(),
            sim.config.dt
        );
        Ok(sim)
    }

    /// Inject a photon at `(x, y)`. Returns its id.
    pub fn add_photon(&mut self, x: f64, y: f64, direction: Direction) -> Result<u64> {
        let theta = direction.resolve(&mut self.rng);
        let id = self.next_photon_id;
        self.photons.push(Photon::new(id, [x, y], theta)?);
        self.next_photon_id += 1;
        Ok(id)
    }

    /// Configuration the simulation was built with.
    pub fn config(&self) -> &LaserConfig {
        &self.config
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks in a full run.
    pub fn total_ticks(&self) -> u64 {
        self.config.total_ticks()
    }

    /// Whether every tick of the configured run has been taken.
    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks()
    }

    /// Number of atoms.
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Number of photons currently in the cavity.
    pub fn num_photons(&self) -> usize {
        self.photons.len()
    }

    /// Atoms in their fixed order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Photons in collection order.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Atom count per energy level.
    pub fn populations(&self) -> Populations {
        let mut pops = Populations::default();
        for atom in &self.atoms {
            match atom.level {
                EnergyLevel::E0 => pops.e0 += 1,
                EnergyLevel::E1 => pops.e1 += 1,
                EnergyLevel::E2 => pops.e2 += 1,
            }
        }
        pops
    }

    /// Copy of the current world state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            time: self.time_now,
            photons: self
                .photons
                .iter()
                .map(|p| PhotonView {
                    id: p.id,
                    position: p.r,
                    direction: p.theta,
                })
                .collect(),
            atoms: self
                .atoms
                .iter()
                .map(|a| AtomView {
                    position: a.position(),
                    level: a.level,
                })
                .collect(),
        }
    }

    /// Advance by exactly one tick.
    ///
    /// Errors: `Error::StateInvariant` if the world is found inconsistent afterwards.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.dt;
        let kinds = self.engine.apply(
            &mut self.atoms,
            &mut self.photons,
            &mut self.next_photon_id,
            &mut self.rng,
        )?;

        let transport = self
            .cavity
            .advance(std::mem::take(&mut self.photons), self.config.speed, dt);
        self.photons = transport.retained;

        self.tick += 1;
        self.time_now = self.tick as f64 * dt;

        if self.config.record_events {
            let escapes = transport
                .escaped
                .into_iter()
                .map(|photon| EventKind::Escape { photon });
            for kind in kinds.into_iter().chain(escapes) {
                self.events.push(Event::new(self.time_now, self.tick, kind)?);
            }
        }

        self.check_invariants()?;
        log::trace!(
            "tick {} t={:.4}: {} photons, {} reflections, {}",
            self.tick,
            self.time_now,
            self.photons.len(),
            transport.reflections,
            self.populations()
        );
        Ok(())
    }

    /// Run the remaining ticks of the configured run, handing each post-tick
    /// snapshot to `sink`. Returns the sink so callers can read what it gathered.
    pub fn run<S: SnapshotSink>(&mut self, mut sink: S) -> Result<S> {
        while !self.is_finished() {
            self.step()?;
            sink.on_tick(&self.snapshot());
        }
        log::info!(
            "run finished at t={:.4}: {} photons, {}",
            self.time_now,
            self.photons.len(),
            self.populations()
        );
        Ok(sink)
    }

    /// Step until the simulation time reaches `target_time` (must be ≥ current time).
    pub fn advance_to(&mut self, target_time: f64) -> Result<()> {
        if !target_time.is_finite() {
            return Err(Error::InvalidParam("target_time must be finite".into()));
        }
        if target_time < self.time_now - EPS_TIME {
            return Err(Error::InvalidParam(
                "target_time cannot be earlier than current time".into(),
            ));
        }
        while self.time_now + EPS_TIME < target_time {
            self.step()?;
        }
        Ok(())
    }

    /// All recorded events since construction or the last drain.
    ///
    /// Empty unless `config.record_events` is set.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events with time ≥ now − window (all of them when `window` is `None`).
    pub fn event_history(&self, window: Option<f64>) -> Result<Vec<Event>> {
        let cutoff = match window {
            Some(w) if !w.is_finite() || w < 0.0 => {
                return Err(Error::InvalidParam(
                    "window must be a non-negative finite float".into(),
                ))
            }
            Some(w) => self.time_now - w,
            None => f64::NEG_INFINITY,
        };
        Ok(self
            .events
            .iter()
            .filter(|e| e.time_f64() >= cutoff - EPS_TIME)
            .copied()
            .collect())
    }

    /// Take the recorded events, leaving the record empty.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn check_invariants(&self) -> Result<()> {
        if self.atoms.len() != self.num_atoms {
            return Err(Error::StateInvariant(format!(
                "atom count {} drifted from {}",
                self.atoms.len(),
                self.num_atoms
            )));
        }
        if let Some(p) = self.photons.iter().find(|p| !p.r.iter().all(|c| c.is_finite())) {
            return Err(Error::StateInvariant(format!(
                "photon {} has non-finite position {:?}",
                p.id, p.r
            )));
        }
        Ok(())
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    }
}
