//! Stochastic simulation of a two-dimensional lasing cavity.
//!
//! Stationary three-level atoms exchange photons with a dynamic photon
//! population through absorption, spontaneous and stimulated emission, while
//! photons bounce between two mirrors and leak out through the open edges.
//! The Python extension module is built with the `python` feature.

pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{LaserConfig, Simulation, Snapshot};
pub use crate::error::{Error, Result};
