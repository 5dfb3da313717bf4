use crate::core::entity::{Photon, DIM};

/// Rectangular cavity centred on the origin.
///
/// The vertical walls at x = ±half_width are mirrors; the horizontal edges at
/// y = ±half_height are open and photons crossing them leave for good.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cavity {
    pub half_width: f64,
    pub half_height: f64,
}

/// Result of one kinematic pass.
#[derive(Debug, Default)]
pub struct Transport {
    /// Photons still inside the cavity, in input order.
    pub retained: Vec<Photon>,
    /// Ids of photons that crossed the open boundary this tick.
    pub escaped: Vec<u64>,
    /// Number of mirror reflections applied.
    pub reflections: usize,
}

impl Cavity {
    /// Cavity spanning [-half_width, half_width] × [-half_height, half_height].
    pub fn new(half_width: f64, half_height: f64) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    #[inline]
    fn inside_x(&self, x: f64) -> bool {
        -self.half_width < x && x < self.half_width
    }

    #[inline]
    fn inside_y(&self, y: f64) -> bool {
        -self.half_height < y && y < self.half_height
    }

    /// Advance every photon by one tick.
    ///
    /// The mirror test looks at the prospective x from the pre-tick position and,
    /// if it falls outside, negates the stored angle. The translation itself still
    /// uses the pre-flip velocity, so a photon may sit past a mirror for one tick.
    pub fn advance(&self, photons: Vec<Photon>, speed: f64, dt: f64) -> Transport {
        let mut out = Transport {
            retained: Vec::with_capacity(photons.len()),
            ..Transport::default()
        };
        for mut photon in photons {
            let v = photon.velocity(speed);
            if !self.inside_x(photon.r[0] + v[0] * dt) {
                photon.theta = -photon.theta;
                out.reflections += 1;
            }
            let mut next = [0.0_f64; DIM];
            for (k, n) in next.iter_mut().enumerate() {
                *n = photon.r[k] + v[k] * dt;
            }
            if !self.inside_y(next[1]) {
                log::debug!("photon {} escaped at y = {:.4}", photon.id, next[1]);
                out.escaped.push(photon.id);
                continue;
            }
            photon.r = next;
            out.retained.push(photon);
        }
        out
    }
}
