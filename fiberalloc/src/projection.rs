//! Sky → focal-plane projection.
//!
//! Converts target coordinates from RA/Dec in degrees to PFI
//! millimeters, given a telescope pointing and a position angle. Targets
//! are projected onto the tangent plane of the pointing, rotated by the
//! position angle, then mapped through a fixed radial distortion
//! polynomial.

use crate::geom::Vec2;
use crate::target::Target;
use nalgebra::Vector3;
use skymath::Pointing;

// Radial distortion polynomial, tangent-plane degrees → PFI mm.
const DIST_A0: f64 = 0.0;
const DIST_A1: f64 = -3.2e2;
const DIST_A2: f64 = -1.37e1;
const DIST_A3: f64 = -7.45e0;

/// Overwrite every target's position with its PFI coordinates in mm.
///
/// `los` is the telescope line of sight, `posang` the position angle in
/// radians. The focal-plane basis has x̂ toward sky-up (the celestial
/// pole projected onto the plane normal to the line of sight).
pub fn project_to_pfi(targets: &mut [Target], los: &Pointing, posang: f64) {
    let z = los.to_vector();
    let sky = Vector3::new(0.0, 0.0, 1.0);
    let x = (sky - z * z.dot(&sky)).normalize();
    let y = z.cross(&x);
    let (spsi, cpsi) = posang.sin_cos();

    for t in targets {
        let dir = Pointing::from_radec_deg(t.pos.x, t.pos.y).to_vector();
        let tangent = Vec2::new(
            dir.dot(&x).atan2(dir.dot(&z)).to_degrees(),
            dir.dot(&y).atan2(dir.dot(&z)).to_degrees(),
        )
        .rotated(spsi, cpsi);
        let rsq = tangent.x * tangent.x + tangent.y * tangent.y;
        let radial = DIST_A3 * rsq * rsq + DIST_A2 * rsq + DIST_A1;
        t.pos = Vec2::new(radial * tangent.x + DIST_A0, -radial * tangent.y + DIST_A0);
    }
}
