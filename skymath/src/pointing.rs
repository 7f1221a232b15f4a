//! Directions on the celestial sphere.
//!
//! A [`Pointing`] stores a direction as colatitude/longitude in radians and
//! converts losslessly to and from Cartesian unit vectors. Astronomical
//! callers usually construct one from RA/Dec in degrees and hand the unit
//! vector to projection code.

use nalgebra::Vector3;

/// A direction on the unit sphere, stored as colatitude and longitude.
///
/// `theta` is the colatitude in radians (0 at the north pole, π at the
/// south pole); `phi` is the longitude in radians. For equatorial
/// coordinates, `theta = π/2 − dec` and `phi = ra`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    /// Colatitude in radians, in `[0, π]` for normalized directions.
    pub theta: f64,
    /// Longitude in radians.
    pub phi: f64,
}

impl Pointing {
    /// Create a pointing from colatitude and longitude in radians.
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Create a pointing from RA/Dec in degrees.
    pub fn from_radec_deg(ra: f64, dec: f64) -> Self {
        Self {
            theta: (90.0 - dec).to_radians(),
            phi: ra.to_radians(),
        }
    }

    /// Create a pointing from a Cartesian direction.
    ///
    /// The input does not need to be normalized; only its direction is
    /// used. The zero vector is rejected by debug assertion.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        debug_assert!(v.norm_squared() > 0.0, "zero direction vector");
        let r = v.norm();
        Self {
            theta: (v.z / r).clamp(-1.0, 1.0).acos(),
            phi: v.y.atan2(v.x),
        }
    }

    /// The Cartesian unit vector for this direction.
    pub fn to_vector(&self) -> Vector3<f64> {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Vector3::new(st * cp, st * sp, ct)
    }

    /// Right ascension in degrees.
    pub fn ra_deg(&self) -> f64 {
        self.phi.to_degrees()
    }

    /// Declination in degrees.
    pub fn dec_deg(&self) -> f64 {
        90.0 - self.theta.to_degrees()
    }
}
