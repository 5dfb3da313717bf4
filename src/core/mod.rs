//! Simulation core: entities, transition rules, photon transport and the
//! fixed-step driver that ties them together.

pub mod config;
pub mod entity;
pub mod event;
pub mod interaction;
pub mod kinematics;
pub mod sim;
pub mod transition;

pub use config::{LaserConfig, Rates, TransitionProbabilities};
pub use entity::{Atom, Direction, EnergyLevel, Photon, Positioned, DIM};
pub use event::{Event, EventKind};
pub use interaction::InteractionEngine;
pub use kinematics::{Cavity, Transport};
pub use sim::{AtomView, PhotonView, Populations, Simulation, Snapshot, SnapshotSink};
pub use transition::Transition;
