//! Fiber positioner geometry of the prime focus instrument.
//!
//! The focal plane carries three 120°-rotated fields of 14 modules with
//! 57 cobras each. Fiber indices are zero-based throughout; the index
//! decomposes as `field = f / 798`, `module = (f mod 798) / 57`,
//! `cobra = f mod 57`.

use crate::geom::Vec2;

/// Number of science fibers on the focal plane (3 fields × 14 modules ×
/// 57 cobras).
pub const NFIBER: usize = 3 * 57 * 14;

/// Maximum radius of a fiber patrol area, in mm.
pub const RMAX: f64 = 4.75;

/// Radius of the density kernel used by the density-aware strategy, in mm.
pub const RKERN: f64 = 4.75;

/// Radius of the dot blocking area around each fiber's dot, in mm.
pub const DOTDIST: f64 = 1.375;

/// Minimum center-to-center distance between simultaneously positioned
/// fibers, in mm.
pub const COLLDIST: f64 = 2.0;

/// Plate radius: targets projecting outside this distance from the
/// focal-plane origin at the nominal pointing are discarded, in mm.
pub const RPLATE: f64 = 190.0;

/// Offset of a fiber's dot from the fiber center, in mm along +y.
const DOT_OFFSET_Y: f64 = 1.19;

/// Module spacing factor, cos(30°).
const VSPACE: f64 = 0.866_025_403_784_438_6; // sqrt(0.75)

/// Central position of a fiber in PFI coordinates, in mm.
///
/// `fiber` must be in `[0, NFIBER)`.
pub fn fiber_center(fiber: usize) -> Vec2 {
    debug_assert!(fiber < NFIBER, "fiber index {fiber} out of range");
    let field = fiber / (57 * 14);
    let rem = fiber % (57 * 14);
    let module = (rem / 57) as f64;
    let cobra = rem % 57;

    let local = Vec2::new(
        -VSPACE * (1.0 + 2.0 * module + (cobra & 1) as f64),
        0.5 + module - 0.5 * cobra as f64,
    );
    // Fields 1 and 2 are the same module layout rotated by ±120°
    let rotated = match field {
        1 => local.rotated(-VSPACE, -0.5),
        2 => local.rotated(VSPACE, -0.5),
        _ => local,
    };
    Vec2::new(rotated.x * 8.0, rotated.y * 8.0)
}

/// Position of the dot blocking a fiber, in PFI mm.
pub fn dot_center(fiber: usize) -> Vec2 {
    let mut pos = fiber_center(fiber);
    pos.y += DOT_OFFSET_Y;
    pos
}

/// Centers of all fibers, indexed by fiber id.
pub fn all_fiber_centers() -> Vec<Vec2> {
    (0..NFIBER).map(fiber_center).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fiber_count_decomposes() {
        assert_eq!(NFIBER, 2394);
        assert_eq!(NFIBER % (57 * 14), 0);
    }

    #[test]
    fn first_cobra_of_first_module() {
        let p = fiber_center(0);
        assert_relative_eq!(p.x, -VSPACE * 8.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn fields_are_rotated_copies() {
        // Rotating a field-0 center by -120° must give the field-1
        // center of the same module/cobra.
        for cobra in [0usize, 1, 13, 56] {
            let base = fiber_center(cobra);
            let f1 = fiber_center(57 * 14 + cobra);
            let expect = base.rotated(-VSPACE, -0.5);
            assert_relative_eq!(f1.x, expect.x, epsilon = 1e-9);
            assert_relative_eq!(f1.y, expect.y, epsilon = 1e-9);

            let f2 = fiber_center(2 * 57 * 14 + cobra);
            let expect2 = base.rotated(VSPACE, -0.5);
            assert_relative_eq!(f2.x, expect2.x, epsilon = 1e-9);
            assert_relative_eq!(f2.y, expect2.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn dot_sits_above_fiber() {
        for fiber in [0usize, 700, 1500, NFIBER - 1] {
            let f = fiber_center(fiber);
            let d = dot_center(fiber);
            assert_relative_eq!(d.x, f.x);
            assert_relative_eq!(d.y - f.y, 1.19, epsilon = 1e-12);
        }
    }

    #[test]
    fn centers_stay_near_the_plate() {
        // Outermost modules reach a bit past the plate radius; nothing
        // should be wildly off.
        let origin = Vec2::default();
        let bound = 240.0;
        for p in all_fiber_centers() {
            assert!(p.dsq(&origin) <= bound * bound);
        }
    }

    #[test]
    fn centers_are_distinct() {
        let centers = all_fiber_centers();
        for i in 0..200 {
            for j in (i + 1)..200 {
                assert!(
                    centers[i].dsq(&centers[j]) > 1e-9,
                    "fibers {i} and {j} coincide"
                );
            }
        }
    }
}
