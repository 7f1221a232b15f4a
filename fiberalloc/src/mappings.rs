//! Fiber↔target reachability mappings.
//!
//! `f2t[fiber]` lists the targets a fiber can currently reach; `t2f` is
//! the exact inverse. The two sides form a bipartite graph that is
//! edited symmetrically: every removal goes through [`strip_out`], which
//! asserts the edge existed exactly once. An inconsistent mapping would
//! silently corrupt every later greedy step, so violations abort.

use crate::fibers::{self, COLLDIST, DOTDIST, NFIBER, RMAX};
use crate::raster::FpRaster;
use crate::target::Target;

/// The fiber→target and target→fiber neighborhood lists for one
/// assignment pass.
#[derive(Debug, Clone)]
pub struct Mappings {
    /// Per fiber, the indices of reachable targets.
    pub f2t: Vec<Vec<usize>>,
    /// Per target, the indices of fibers that can reach it.
    pub t2f: Vec<Vec<usize>>,
}

impl Mappings {
    /// Compute reachability for every fiber over the projected targets.
    ///
    /// A target is reachable when it lies within [`RMAX`] of the fiber
    /// center and at least [`DOTDIST`] from the fiber's dot (boundary
    /// inclusive on both).
    pub fn build(targets: &[Target], raster: &FpRaster) -> Self {
        let mut f2t = vec![Vec::new(); NFIBER];
        for (fiber, reachable) in f2t.iter_mut().enumerate() {
            let fp = fibers::fiber_center(fiber);
            let dp = fibers::dot_center(fiber);
            for j in raster.query(fp, RMAX) {
                if dp.dsq(&targets[j].pos) >= DOTDIST * DOTDIST {
                    reachable.push(j);
                }
            }
        }
        let mut t2f = vec![Vec::new(); targets.len()];
        for (fiber, reachable) in f2t.iter().enumerate() {
            for &t in reachable {
                t2f[t].push(fiber);
            }
        }
        Self { f2t, t2f }
    }

    /// Remove all edges invalidated by committing `fiber` to `target`.
    ///
    /// The fiber leaves the pool (all its edges drop), the target and
    /// every other target within [`COLLDIST`] of it become unreachable
    /// for every fiber.
    pub fn cleanup(&mut self, targets: &[Target], raster: &FpRaster, fiber: usize, target: usize) {
        for &t in &self.f2t[fiber] {
            strip_out(&mut self.t2f[t], fiber);
        }
        self.f2t[fiber].clear();

        for blocked in raster.query(targets[target].pos, COLLDIST) {
            for &f in &self.t2f[blocked] {
                strip_out(&mut self.f2t[f], blocked);
            }
            self.t2f[blocked].clear();
        }
    }
}

/// Remove `val` from a neighborhood list.
///
/// # Panics
///
/// Panics unless exactly one occurrence was present; anything else means
/// the two mapping sides have diverged.
pub fn strip_out(v: &mut Vec<usize>, val: usize) {
    let before = v.len();
    v.retain(|&x| x != val);
    assert!(
        v.len() + 1 == before,
        "mapping edge {val} occurred {} times, expected once",
        before - v.len()
    );
}
