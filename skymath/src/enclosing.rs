//! Smallest enclosing spherical cap.
//!
//! Given a set of unit vectors, finds the center and opening angle of the
//! smallest cap that contains all of them. Used to derive a default
//! telescope pointing that covers a whole target list.

use nalgebra::Vector3;

/// The smallest cap enclosing a set of directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cap {
    /// Unit vector at the cap center.
    pub center: Vector3<f64>,
    /// Cosine of the cap's opening angle; 1.0 for a single point.
    pub cos_radius: f64,
}

/// Compute the smallest enclosing cap of a non-empty set of unit vectors.
///
/// Incremental move-to-front construction: the cap is grown point by
/// point, re-seeding on the one, two or three support points found so
/// far. Runs in expected linear time for typical inputs.
///
/// # Panics
///
/// Panics if `points` is empty.
pub fn enclosing_cap(points: &[Vector3<f64>]) -> Cap {
    assert!(!points.is_empty(), "enclosing cap of an empty point set");
    if points.len() == 1 {
        return Cap {
            center: points[0],
            cos_radius: 1.0,
        };
    }

    let mut center = (points[0] + points[1]).normalize();
    let mut cos_radius = points[0].dot(&center);
    for i in 2..points.len() {
        if points[i].dot(&center) >= cos_radius {
            continue;
        }
        // points[i] lies outside the cap, so it is on the new boundary
        center = (points[0] + points[i]).normalize();
        cos_radius = points[i].dot(&center);
        for j in 1..i {
            if points[j].dot(&center) >= cos_radius {
                continue;
            }
            center = (points[j] + points[i]).normalize();
            cos_radius = points[i].dot(&center);
            for k in 0..j {
                if points[k].dot(&center) >= cos_radius {
                    continue;
                }
                // Cap through three boundary points: its center is the
                // normal of the plane through them, oriented inward.
                let v1 = points[i] - points[j];
                let v2 = points[k] - points[j];
                let mut c = v1.cross(&v2);
                if c.dot(&points[i]) < 0.0 {
                    c = -c;
                }
                center = c.normalize();
                cos_radius = points[i].dot(&center);
            }
        }
    }
    Cap { center, cos_radius }
}
