//! Per-tick stochastic coupling between atoms and photons.
//!
//! Atoms are visited once per tick in index order. Photon removals and insertions
//! take effect immediately, so later atoms in the same tick see the photon set as
//! left by earlier ones.

use crate::core::config::TransitionProbabilities;
use crate::core::entity::{Atom, Direction, EnergyLevel, Photon, Positioned, DIM};
use crate::core::event::EventKind;
use crate::core::transition::{self, Transition};
use crate::error::Result;
use rand::distr::Distribution;
use rand::Rng;

/// Applies absorption, emission and relaxation rules to every atom.
#[derive(Debug, Clone, Copy)]
pub struct InteractionEngine {
    probabilities: TransitionProbabilities,
    capture_radius: f64,
}

impl InteractionEngine {
    /// Engine drawing from `probabilities` with photons strictly inside `capture_radius`.
    pub fn new(probabilities: TransitionProbabilities, capture_radius: f64) -> Self {
        Self {
            probabilities,
            capture_radius,
        }
    }

    /// Run one interaction pass.
    ///
    /// `next_id` supplies ids for emitted photons. Returns the events in the order
    /// they happened.
    pub fn apply<R: Rng>(
        &self,
        atoms: &mut [Atom],
        photons: &mut Vec<Photon>,
        next_id: &mut u64,
        rng: &mut R,
    ) -> Result<Vec<EventKind>> {
        let mut events = Vec::new();
        for (idx, atom) in atoms.iter_mut().enumerate() {
            let atom_id = idx as u32;
            let start = atom.level;
            match start {
                EnergyLevel::E0 => {
                    let Some(k) = self.first_in_range(atom, photons) else {
                        continue;
                    };
                    if self.probabilities.absorption.sample(rng) {
                        let absorbed = photons.remove(k);
                        atom.level =
                            transition::apply(atom.level, start, Transition::Absorption)?;
                        log::debug!("atom {atom_id} absorbed photon {}", absorbed.id);
                        events.push(EventKind::Absorption {
                            atom: atom_id,
                            photon: absorbed.id,
                        });
                    }
                }
                EnergyLevel::E1 => {
                    // Both checks run even if the first one already decayed the atom.
                    if self.probabilities.spontaneous.sample(rng) {
                        let theta = Direction::Random.resolve(rng);
                        let photon = emit(photons, next_id, atom.position(), theta)?;
                        atom.level = transition::apply(
                            atom.level,
                            start,
                            Transition::SpontaneousEmission,
                        )?;
                        log::debug!("atom {atom_id} spontaneously emitted photon {photon}");
                        events.push(EventKind::SpontaneousEmission {
                            atom: atom_id,
                            photon,
                        });
                    }

                    if let Some(k) = self.first_in_range(atom, photons) {
                        if self.probabilities.stimulated.sample(rng) {
                            let (trigger, theta) = (photons[k].id, photons[k].theta);
                            let photon = emit(photons, next_id, atom.position(), theta)?;
                            atom.level = transition::apply(
                                atom.level,
                                start,
                                Transition::StimulatedEmission,
                            )?;
                            log::debug!(
                                "photon {trigger} stimulated atom {atom_id} to emit photon {photon}"
                            );
                            events.push(EventKind::StimulatedEmission {
                                atom: atom_id,
                                trigger,
                                photon,
                            });
                        }
                    }
                }
                EnergyLevel::E2 => {
                    if self.probabilities.relaxation.sample(rng) {
                        atom.level =
                            transition::apply(atom.level, start, Transition::Relaxation)?;
                        events.push(EventKind::Relaxation { atom: atom_id });
                    }
                }
            }
        }
        Ok(events)
    }

    /// Index of the first photon, in collection order, strictly inside the capture radius.
    fn first_in_range(&self, atom: &Atom, photons: &[Photon]) -> Option<usize> {
        photons
            .iter()
            .position(|p| atom.distance_to(p) < self.capture_radius)
    }
}

fn emit(photons: &mut Vec<Photon>, next_id: &mut u64, r: [f64; DIM], theta: f64) -> Result<u64> {
    let id = *next_id;
    photons.push(Photon::new(id, r, theta)?);
    *next_id += 1;
    Ok(id)
}
