//! Atom level transitions and the table that governs them.
//!
//! The only legal moves are E0 → E1 (absorption), E1 → E0 (spontaneous or
//! stimulated emission) and E2 → E1 (combined spontaneous + non-radiative
//! relaxation). There is no direct E2 → E0 path.

use crate::core::entity::EnergyLevel;
use crate::error::{Error, Result};

/// A single-step change of an atom's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Photon-triggered excitation, consuming the photon.
    Absorption,
    /// Unstimulated radiative decay, emitting a randomly directed photon.
    SpontaneousEmission,
    /// Photon-triggered decay, emitting a photon parallel to the trigger.
    StimulatedEmission,
    /// Pump level decay to the intermediate level; no photon.
    Relaxation,
}

impl Transition {
    /// Every transition in the table.
    pub const ALL: [Transition; 4] = [
        Transition::Absorption,
        Transition::SpontaneousEmission,
        Transition::StimulatedEmission,
        Transition::Relaxation,
    ];

    /// Level the transition departs from.
    pub fn source(self) -> EnergyLevel {
        match self {
            Transition::Absorption => EnergyLevel::E0,
            Transition::SpontaneousEmission | Transition::StimulatedEmission => EnergyLevel::E1,
            Transition::Relaxation => EnergyLevel::E2,
        }
    }

    /// Level the transition lands on.
    pub fn target(self) -> EnergyLevel {
        match self {
            Transition::Absorption => EnergyLevel::E1,
            Transition::SpontaneousEmission | Transition::StimulatedEmission => EnergyLevel::E0,
            Transition::Relaxation => EnergyLevel::E1,
        }
    }

    /// Net change in photon count caused by the transition.
    pub fn photon_delta(self) -> i64 {
        match self {
            Transition::Absorption => -1,
            Transition::SpontaneousEmission | Transition::StimulatedEmission => 1,
            Transition::Relaxation => 0,
        }
    }

    /// Transitions an atom in `level` may undergo, in evaluation order.
    pub fn from_level(level: EnergyLevel) -> &'static [Transition] {
        match level {
            EnergyLevel::E0 => &[Transition::Absorption],
            EnergyLevel::E1 => &[
                Transition::SpontaneousEmission,
                Transition::StimulatedEmission,
            ],
            EnergyLevel::E2 => &[Transition::Relaxation],
        }
    }
}

/// Apply `transition` to an atom observed in `current`.
///
/// The emission pair is evaluated against the level the atom held at the start of
/// the tick, so a spontaneous decay followed by a stimulated decay in the same tick
/// is accepted from E0 as well (the second emission leaves the atom in E0).
pub fn apply(
    current: EnergyLevel,
    tick_start: EnergyLevel,
    transition: Transition,
) -> Result<EnergyLevel> {
    if transition.source() == current || transition.source() == tick_start {
        Ok(transition.target())
    } else {
        Err(Error::StateInvariant(format!(
            "{transition:?} is not allowed from {current:?}"
        )))
    }
}
