use crate::error::{Error, Result};
use std::f64::consts::TAU;

/// Fixed spatial dimension (2D cavity).
pub const DIM: usize = 2;

/// Discrete energy level of an atom in the lasing medium.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnergyLevel {
    /// Ground state.
    E0 = 0,
    /// Intermediate (upper lasing) level.
    E1 = 1,
    /// Pump-excited level.
    E2 = 2,
}

impl EnergyLevel {
    /// Every level, lowest first.
    pub const ALL: [EnergyLevel; 3] = [EnergyLevel::E0, EnergyLevel::E1, EnergyLevel::E2];

    /// Integer code 0, 1 or 2.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EnergyLevel {
    type Error = Error;

    /// Level codes outside {0, 1, 2} are a broken invariant, never clamped.
    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(EnergyLevel::E0),
            1 => Ok(EnergyLevel::E1),
            2 => Ok(EnergyLevel::E2),
            other => Err(Error::StateInvariant(format!(
                "energy level code {other} is not one of 0, 1, 2"
            ))),
        }
    }
}

/// Anything that sits at a point in the cavity.
pub trait Positioned {
    /// Current position (x, y).
    fn position(&self) -> [f64; DIM];

    /// Euclidean distance to another positioned entity.
    #[inline]
    fn distance_to<P: Positioned + ?Sized>(&self, other: &P) -> f64 {
        let a = self.position();
        let b = other.position();
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        (dx * dx + dy * dy).sqrt()
    }
}

/// Direction argument for photon creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    /// Caller-specified propagation angle in radians.
    Fixed(f64),
    /// Draw the angle uniformly from [0, 2π).
    Random,
}

impl Direction {
    /// Resolve to a concrete angle, drawing from `rng` only for `Random`.
    pub fn resolve<R: rand::Rng>(self, rng: &mut R) -> f64 {
        match self {
            Direction::Fixed(theta) => theta,
            Direction::Random => rng.random_range(0.0..TAU),
        }
    }
}

/// A stationary atom of the lasing medium.
///
/// The position is fixed at construction; only the level changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    r: [f64; DIM],
    /// Current energy level.
    pub level: EnergyLevel,
}

impl Atom {
    /// Create an atom at `(x, y)` in `level`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if a coordinate is NaN/inf.
    pub fn new(x: f64, y: f64, level: EnergyLevel) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidParam("atom position must be finite".into()));
        }
        Ok(Self { r: [x, y], level })
    }
}

impl Positioned for Atom {
    #[inline]
    fn position(&self) -> [f64; DIM] {
        self.r
    }
}

/// A photon travelling through the cavity at the shared speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    /// Stable identifier, unique within one simulation.
    pub id: u64,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Propagation angle in radians, measured from the +y axis towards +x.
    pub theta: f64,
}

impl Photon {
    /// Create photon `id` at `r` travelling along `theta`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the position or angle is NaN/inf.
    pub fn new(id: u64, r: [f64; DIM], theta: f64) -> Result<Self> {
        if !r.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParam("photon position must be finite".into()));
        }
        if !theta.is_finite() {
            return Err(Error::InvalidParam("photon direction must be finite".into()));
        }
        Ok(Self { id, r, theta })
    }

    /// Velocity for the given speed: (c·sin θ, c·cos θ).
    #[inline]
    pub fn velocity(&self, speed: f64) -> [f64; DIM] {
        [speed * self.theta.sin(), speed * self.theta.cos()]
    }
}

impl Positioned for Photon {
    #[inline]
    fn position(&self) -> [f64; DIM] {
        self.r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn level_codes_round_trip_and_reject_unknown() -> Result<()> {
        for level in EnergyLevel::ALL {
            assert_eq!(EnergyLevel::try_from(level.code())?, level);
        }
        let err = EnergyLevel::try_from(3).unwrap_err();
        assert!(matches!(err, Error::StateInvariant(_)));
        Ok(())
    }

    #[test]
    fn atom_rejects_non_finite_position() {
        let err = Atom::new(f64::NAN, 0.0, EnergyLevel::E0).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn distance_between_atom_and_photon() -> Result<()> {
        let a = Atom::new(0.0, 0.0, EnergyLevel::E0)?;
        let p = Photon::new(0, [3.0, 4.0], 0.0)?;
        assert!((a.distance_to(&p) - 5.0).abs() < 1e-12);
        assert!((p.distance_to(&a) - 5.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn velocity_components_follow_angle_convention() -> Result<()> {
        // theta = 0 points along +y
        let up = Photon::new(0, [0.0, 0.0], 0.0)?;
        let v = up.velocity(10.0);
        assert!(v[0].abs() < 1e-12);
        assert!((v[1] - 10.0).abs() < 1e-12);

        let right = Photon::new(1, [0.0, 0.0], std::f64::consts::FRAC_PI_2)?;
        let v = right.velocity(2.0);
        assert!((v[0] - 2.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn random_direction_lies_in_full_turn() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let theta = Direction::Random.resolve(&mut rng);
            assert!((0.0..TAU).contains(&theta));
        }
        assert_eq!(Direction::Fixed(1.25).resolve(&mut rng), 1.25);
    }
}
