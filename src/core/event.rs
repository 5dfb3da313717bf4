use crate::core::transition::Transition;
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// Observable things that happen inside the cavity during a tick.
///
/// Ordering at equal times follows the tick's processing order: atom
/// interactions (by atom index) come before photon escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Ground-state atom `atom` absorbed photon `photon`.
    Absorption { atom: u32, photon: u64 },
    /// Atom `atom` decayed spontaneously and emitted photon `photon`.
    SpontaneousEmission { atom: u32, photon: u64 },
    /// Photon `trigger` stimulated atom `atom` to emit the parallel photon `photon`.
    StimulatedEmission { atom: u32, trigger: u64, photon: u64 },
    /// Pumped atom `atom` relaxed to the intermediate level.
    Relaxation { atom: u32 },
    /// Photon `photon` crossed the open boundary and left the cavity.
    Escape { photon: u64 },
}

impl EventKind {
    #[inline]
    fn order_key(&self) -> (u8, u64, u8) {
        match *self {
            EventKind::Absorption { atom, .. } => (0, atom as u64, 0),
            EventKind::SpontaneousEmission { atom, .. } => (0, atom as u64, 1),
            EventKind::StimulatedEmission { atom, .. } => (0, atom as u64, 2),
            EventKind::Relaxation { atom } => (0, atom as u64, 3),
            EventKind::Escape { photon } => (1, photon, 0),
        }
    }

    /// Atom transition behind the event, if any.
    pub fn transition(&self) -> Option<Transition> {
        match self {
            EventKind::Absorption { .. } => Some(Transition::Absorption),
            EventKind::SpontaneousEmission { .. } => Some(Transition::SpontaneousEmission),
            EventKind::StimulatedEmission { .. } => Some(Transition::StimulatedEmission),
            EventKind::Relaxation { .. } => Some(Transition::Relaxation),
            EventKind::Escape { .. } => None,
        }
    }

    /// Net change in photon count caused by the event.
    pub fn photon_delta(&self) -> i64 {
        match self.transition() {
            Some(t) => t.photon_delta(),
            None => -1,
        }
    }

    /// Small integer code used by array-based consumers.
    pub fn code(&self) -> u8 {
        match self {
            EventKind::Absorption { .. } => 0,
            EventKind::SpontaneousEmission { .. } => 1,
            EventKind::StimulatedEmission { .. } => 2,
            EventKind::Relaxation { .. } => 3,
            EventKind::Escape { .. } => 4,
        }
    }
}

/// A recorded event, stamped with the simulation time at the end of its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Simulation time, `tick * dt`.
    pub time: NotNan<f64>,
    /// Tick the event happened in (1-based).
    pub tick: u64,
    pub kind: EventKind,
}

impl Event {
    /// Create a new event, validating that time is finite and non-NaN.
    pub fn new(time: f64, tick: u64, kind: EventKind) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        Ok(Self { time, tick, kind })
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then(self.tick.cmp(&other.tick))
            .then_with(|| self.kind.order_key().cmp(&other.kind.order_key()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventKind::{Absorption, Escape, Relaxation, SpontaneousEmission};

    #[test]
    fn new_event_rejects_nan_time() {
        let err = Event::new(f64::NAN, 0, Escape { photon: 1 }).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn ordering_by_time() -> Result<()> {
        let e1 = Event::new(0.01, 1, Escape { photon: 4 })?;
        let e2 = Event::new(0.02, 2, Relaxation { atom: 0 })?;
        assert!(e1 < e2);
        Ok(())
    }

    #[test]
    fn interactions_precede_escapes_within_a_tick() -> Result<()> {
        let t = 0.5;
        let a = Event::new(t, 50, Absorption { atom: 9, photon: 2 })?;
        let b = Event::new(t, 50, Escape { photon: 1 })?;
        let c = Event::new(t, 50, SpontaneousEmission { atom: 3, photon: 7 })?;
        let mut v = vec![b, a, c];
        v.sort();
        assert_eq!(v, vec![c, a, b]);
        Ok(())
    }

    #[test]
    fn photon_deltas_match_event_kinds() {
        assert_eq!(Absorption { atom: 0, photon: 0 }.photon_delta(), -1);
        assert_eq!(Escape { photon: 0 }.photon_delta(), -1);
        assert_eq!(SpontaneousEmission { atom: 0, photon: 0 }.photon_delta(), 1);
        assert_eq!(Relaxation { atom: 0 }.photon_delta(), 0);
    }
}
