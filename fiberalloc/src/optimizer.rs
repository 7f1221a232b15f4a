//! Exposure optimization: grid search over pointing and position-angle
//! perturbations.
//!
//! Each candidate pointing projects the target list onto the focal
//! plane, drops targets outside the plate (with a kernel-radius safety
//! margin), runs the configured assignment strategy, and the candidate
//! committing the most fibers wins. Ties keep the first candidate, so
//! results are reproducible.

use crate::fibers::{RKERN, RPLATE};
use crate::geom::Vec2;
use crate::projection::project_to_pfi;
use crate::strategy::{Assignment, FiberAssigner};
use crate::target::Target;
use log::debug;
use nalgebra::Vector3;
use skymath::Pointing;

/// Indices of projected targets close enough to the plate to matter.
///
/// Keeps targets within `RPLATE + safety` of the focal-plane origin;
/// `safety` absorbs kernel-edge effects for the density strategy.
pub fn select_observable(targets: &[Target], safety: f64) -> Vec<usize> {
    let origin = Vec2::default();
    let reach = RPLATE + safety;
    (0..targets.len())
        .filter(|&i| targets[i].pos.dsq(&origin) <= reach * reach)
        .collect()
}

/// Project the targets for one candidate pointing and run the strategy.
///
/// Returned target indices refer to the *input* slice, not to the
/// filtered projection.
pub fn single_exposure(
    targets: &[Target],
    center: &Pointing,
    posang: f64,
    assigner: &dyn FiberAssigner,
) -> Assignment {
    let mut projected = targets.to_vec();
    project_to_pfi(&mut projected, center, posang);

    let idx = select_observable(&projected, RKERN);
    let subset: Vec<Target> = idx.iter().map(|&i| projected[i].clone()).collect();
    if subset.is_empty() {
        return Assignment::default();
    }

    let mut out = assigner.assign(&subset);
    for t in &mut out.targets {
        *t = idx[*t];
    }
    out
}

/// The winning candidate of a grid search.
#[derive(Debug, Clone)]
pub struct ExposureChoice {
    pub assignment: Assignment,
    pub center: Pointing,
    pub posang: f64,
}

/// Search an `nptg × nptg` pointing grid crossed with `nposang`
/// position-angle offsets and keep the assignment committing the most
/// fibers.
///
/// `dptg` and `dposang` are half-extents in radians; cells are sampled
/// at their centers. The pointing grid lives in the tangent plane of
/// `center0`, with x̂ along `center0 × ẑ` (or the x axis when `center0`
/// is a pole).
pub fn optimal_exposure(
    targets: &[Target],
    center0: &Pointing,
    dptg: f64,
    nptg: usize,
    posang0: f64,
    dposang: f64,
    nposang: usize,
    assigner: &dyn FiberAssigner,
) -> ExposureChoice {
    let vcenter = center0.to_vector();
    let vdx = vcenter.cross(&Vector3::new(0.0, 0.0, 1.0));
    let vdx = if vdx.norm_squared() == 0.0 {
        // Pointing at a celestial pole: any tangent direction works
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        vdx.normalize()
    };
    let vdy = vcenter.cross(&vdx);

    let mut best = ExposureChoice {
        assignment: Assignment::default(),
        center: *center0,
        posang: posang0,
    };
    for ix in 0..nptg {
        for iy in 0..nptg {
            for ia in 0..nposang {
                let dx = -dptg + 2.0 * dptg * (ix as f64 + 0.5) / nptg as f64;
                let dy = -dptg + 2.0 * dptg * (iy as f64 + 0.5) / nptg as f64;
                let da = -dposang + 2.0 * dposang * (ia as f64 + 0.5) / nposang as f64;
                let center = Pointing::from_vector(&(vcenter + vdx * dx + vdy * dy));
                let posang = posang0 + da;
                let candidate = single_exposure(targets, &center, posang, assigner);
                debug!(
                    "pointing candidate ({ix},{iy},{ia}): {} fibers",
                    candidate.len()
                );
                if candidate.len() > best.assignment.len() {
                    best = ExposureChoice {
                        assignment: candidate,
                        center,
                        posang,
                    };
                }
            }
        }
    }
    best
}
