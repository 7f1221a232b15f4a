//! Assignment strategies.
//!
//! Three greedy policies that map targets to fibers for one exposure.
//! All of them rebuild the spatial index and the reachability mappings
//! from scratch, then commit (target, fiber) pairs one at a time,
//! running the mapping cleanup after each commit so the collision and
//! exclusivity constraints hold at every step.

use crate::fibers::RKERN;
use crate::mappings::Mappings;
use crate::pqueue::MutablePriorityQueue;
use crate::raster::FpRaster;
use crate::target::Target;
use std::cmp::Ordering;

/// Cells per axis of the per-exposure target raster.
const GRID_CELLS: usize = 100;

/// Priority value marking a target as exhausted in the density queue.
const EXHAUSTED_PRI: i32 = 1 << 30;

/// The (target, fiber) pairs committed for one exposure.
///
/// `targets[k]` is observed by `fibers[k]`; both columns are free of
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    pub targets: Vec<usize>,
    pub fibers: Vec<usize>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn push(&mut self, target: usize, fiber: usize) {
        self.targets.push(target);
        self.fibers.push(fiber);
    }
}

/// A per-exposure assignment policy.
///
/// Target indices in the result range over the input slice; fiber
/// indices over `0..NFIBER`.
pub trait FiberAssigner {
    fn assign(&self, targets: &[Target]) -> Assignment;
}

/// Look up a strategy by its configuration name.
pub fn assigner_by_name(name: &str) -> Option<Box<dyn FiberAssigner>> {
    match name {
        "naive" => Some(Box::new(NaiveAssigner)),
        "draining" => Some(Box::new(DrainingAssigner)),
        "new" => Some(Box::new(DensityAssigner)),
        _ => None,
    }
}

fn target_raster(targets: &[Target]) -> FpRaster {
    FpRaster::new(targets.iter().map(|t| t.pos).collect(), GRID_CELLS, GRID_CELLS)
}

/// The most urgent target reachable by `fiber`: smallest `pri` value,
/// ties broken by first occurrence in the neighborhood list.
///
/// # Panics
///
/// Panics when the fiber has no reachable target.
fn most_urgent_in_fiber(fiber: usize, targets: &[Target], f2t: &[Vec<usize>]) -> usize {
    assert!(!f2t[fiber].is_empty(), "searching in empty fiber {fiber}");
    let mut best = f2t[fiber][0];
    for &t in &f2t[fiber][1..] {
        if targets[t].pri < targets[best].pri {
            best = t;
        }
    }
    best
}

/// Iterate fibers in index order and give each its most urgent
/// reachable target.
pub struct NaiveAssigner;

impl FiberAssigner for NaiveAssigner {
    fn assign(&self, targets: &[Target]) -> Assignment {
        let raster = target_raster(targets);
        let mut maps = Mappings::build(targets, &raster);
        let mut out = Assignment::default();

        for fiber in 0..maps.f2t.len() {
            if maps.f2t[fiber].is_empty() {
                continue;
            }
            let itgt = most_urgent_in_fiber(fiber, targets, &maps.f2t);
            out.push(itgt, fiber);
            maps.cleanup(targets, &raster, fiber, itgt);
        }
        out
    }
}

/// Repeatedly serve the fiber with the fewest remaining reachable
/// targets (after Morales et al. 2012, MNRAS 419, 1187).
pub struct DrainingAssigner;

impl FiberAssigner for DrainingAssigner {
    fn assign(&self, targets: &[Target]) -> Assignment {
        let raster = target_raster(targets);
        let mut maps = Mappings::build(targets, &raster);
        let mut out = Assignment::default();

        loop {
            let mut pick: Option<(usize, usize)> = None; // (fiber, reachable)
            for (fiber, reachable) in maps.f2t.iter().enumerate() {
                if !reachable.is_empty()
                    && pick.map_or(true, |(_, count)| reachable.len() < count)
                {
                    pick = Some((fiber, reachable.len()));
                }
            }
            let Some((fiber, _)) = pick else {
                break; // assignment done
            };
            let itgt = most_urgent_in_fiber(fiber, targets, &maps.f2t);
            out.push(itgt, fiber);
            maps.cleanup(targets, &raster, fiber, itgt);
        }
        out
    }
}

/// Density queue entry: accumulated proximity score plus catalog
/// priority.
///
/// The ordering makes the queue's maximum the most attractive target:
/// the smallest `pri` value wins, and among equal `pri` the largest
/// `prox` wins.
#[derive(Debug, Clone, Copy)]
pub struct PqEntry {
    pub prox: f64,
    pub pri: i32,
}

impl PartialEq for PqEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PqEntry {}

impl PartialOrd for PqEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PqEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .pri
            .cmp(&self.pri)
            .then_with(|| self.prox.total_cmp(&other.prox))
    }
}

/// Parabolic density kernel over squared distance.
fn kernel_weight(rsq: f64) -> f64 {
    (RKERN * RKERN - rsq).max(0.0)
}

/// Build the initial density queue: each target's `prox` accumulates
/// time-weighted kernel contributions from every neighbor within
/// [`RKERN`], itself included. Off-diagonal pairs are visited once
/// (`j > i`) and added to both endpoints.
fn density_queue(targets: &[Target], raster: &FpRaster) -> MutablePriorityQueue<PqEntry> {
    let mut prox = vec![0.0; targets.len()];
    for i in 0..targets.len() {
        for j in raster.query(targets[i].pos, RKERN) {
            if i == j {
                prox[i] += targets[i].time * targets[i].time * kernel_weight(0.0);
            } else if i < j {
                let w = targets[i].time
                    * targets[j].time
                    * kernel_weight(targets[i].pos.dsq(&targets[j].pos));
                prox[i] += w;
                prox[j] += w;
            }
        }
    }
    let entries = targets
        .iter()
        .zip(prox)
        .map(|(t, prox)| PqEntry { prox, pri: t.pri })
        .collect();
    MutablePriorityQueue::from_priorities(entries)
}

/// After committing `itgt`, subtract its kernel contribution from every
/// still-live neighbor's density score.
fn relax_neighborhood(
    targets: &[Target],
    t2f: &[Vec<usize>],
    raster: &FpRaster,
    itgt: usize,
    queue: &mut MutablePriorityQueue<PqEntry>,
) {
    for j in raster.query(targets[itgt].pos, RKERN) {
        let entry = *queue.priority(j);
        if t2f[j].is_empty() && entry.prox == 0.0 {
            continue;
        }
        let w = targets[j].time
            * targets[itgt].time
            * kernel_weight(targets[itgt].pos.dsq(&targets[j].pos));
        queue.set_priority(
            j,
            PqEntry {
                prox: entry.prox - w,
                pri: entry.pri,
            },
        );
    }
}

/// Process targets in order of decreasing attractiveness, preferring
/// high-density regions so clusters are broken up gradually and later
/// exposures still find reachable work.
pub struct DensityAssigner;

impl FiberAssigner for DensityAssigner {
    fn assign(&self, targets: &[Target]) -> Assignment {
        let raster = target_raster(targets);
        let mut maps = Mappings::build(targets, &raster);
        let mut queue = density_queue(targets, &raster);
        let mut out = Assignment::default();

        loop {
            if queue.top_priority().pri == EXHAUSTED_PRI {
                break;
            }
            let itgt = queue.top();
            if maps.t2f[itgt].is_empty() {
                queue.set_priority(
                    itgt,
                    PqEntry {
                        prox: 0.0,
                        pri: EXHAUSTED_PRI,
                    },
                );
                continue;
            }
            // The least-loaded fiber that reaches this target, ties by
            // first occurrence.
            let mut pick = maps.t2f[itgt][0];
            for &fiber in &maps.t2f[itgt][1..] {
                if maps.f2t[fiber].len() < maps.f2t[pick].len() {
                    pick = fiber;
                }
            }
            out.push(itgt, pick);
            maps.cleanup(targets, &raster, pick, itgt);
            relax_neighborhood(targets, &maps.t2f, &raster, itgt, &mut queue);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibers::{self, COLLDIST, DOTDIST, RMAX};
    use crate::geom::Vec2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn target_at(pos: Vec2, id: i32, time: f64, pri: i32) -> Target {
        Target::new(pos.x, pos.y, time, id, pri)
    }

    fn all_strategies() -> Vec<(&'static str, Box<dyn FiberAssigner>)> {
        ["naive", "draining", "new"]
            .into_iter()
            .map(|name| (name, assigner_by_name(name).unwrap()))
            .collect()
    }

    /// A spot inside fiber 0's patrol area, clear of its dot.
    fn clear_spot() -> Vec2 {
        let f0 = fibers::fiber_center(0);
        Vec2::new(f0.x + 0.3, f0.y - 2.0)
    }

    #[test]
    fn unknown_assigner_name_is_rejected() {
        assert!(assigner_by_name("bogus").is_none());
        assert!(assigner_by_name("naive").is_some());
        assert!(assigner_by_name("draining").is_some());
        assert!(assigner_by_name("new").is_some());
    }

    #[test]
    fn single_target_gets_one_fiber() {
        let spot = clear_spot();
        let targets = vec![target_at(spot, 1, 900.0, 1)];
        for (name, strategy) in all_strategies() {
            let out = strategy.assign(&targets);
            assert_eq!(out.len(), 1, "{name}: expected one commitment");
            assert_eq!(out.targets, vec![0]);
            let fp = fibers::fiber_center(out.fibers[0]);
            assert!(fp.dsq(&spot) <= RMAX * RMAX, "{name}: unreachable fiber");
        }
    }

    #[test]
    fn collocated_equal_priority_commits_first_index() {
        // Two targets on the same spot, same priority: exactly one is
        // committed and every strategy resolves the tie to index 0.
        let spot = clear_spot();
        let targets = vec![
            target_at(spot, 1, 900.0, 1),
            target_at(spot, 2, 900.0, 1),
        ];
        for (name, strategy) in all_strategies() {
            let out = strategy.assign(&targets);
            assert_eq!(out.len(), 1, "{name}: expected a single commitment");
            assert_eq!(out.targets, vec![0], "{name}: tie not broken to first");
        }
    }

    #[test]
    fn colliding_pair_commits_at_most_one() {
        let spot = clear_spot();
        let other = Vec2::new(spot.x + 1.0, spot.y); // within COLLDIST
        let targets = vec![
            target_at(spot, 1, 900.0, 1),
            target_at(other, 2, 900.0, 1),
        ];
        // Both are genuinely reachable before assignment
        let raster = target_raster(&targets);
        let maps = Mappings::build(&targets, &raster);
        assert!(!maps.t2f[0].is_empty() && !maps.t2f[1].is_empty());

        for (name, strategy) in all_strategies() {
            let out = strategy.assign(&targets);
            assert_eq!(out.len(), 1, "{name}: colliding pair double-committed");
        }
    }

    #[test]
    fn smaller_pri_value_wins_within_a_fiber() {
        let spot = clear_spot();
        let other = Vec2::new(spot.x, spot.y - 2.5); // same patrol, no collision
        let targets = vec![
            target_at(spot, 1, 900.0, 5),
            target_at(other, 2, 900.0, 2),
        ];
        let out = NaiveAssigner.assign(&targets);
        // Fiber 0 serves the pri=2 target first
        assert_eq!(out.targets[0], 1);
    }

    #[test]
    fn density_strategy_prefers_larger_prox_on_equal_pri() {
        // Same fiber reaches both; the longer-integration target has the
        // larger self-contribution, so it is served first and the other
        // becomes unreachable.
        let spot = clear_spot();
        let other = Vec2::new(spot.x, spot.y - 2.5);
        let targets = vec![
            target_at(spot, 1, 100.0, 1),
            target_at(other, 2, 400.0, 1),
        ];
        let out = DensityAssigner.assign(&targets);
        assert!(!out.is_empty());
        assert_eq!(out.targets[0], 1);
    }

    #[test]
    fn random_field_satisfies_commit_constraints() {
        let mut rng = StdRng::seed_from_u64(31415);
        let targets: Vec<Target> = (0..250)
            .map(|i| {
                target_at(
                    Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0)),
                    i as i32,
                    rng.gen_range(300.0..1800.0),
                    rng.gen_range(1..10),
                )
            })
            .collect();

        for (name, strategy) in all_strategies() {
            let out = strategy.assign(&targets);
            assert!(!out.is_empty(), "{name}: nothing assigned");

            // Exclusivity: no fiber or target appears twice
            let mut fibs = out.fibers.clone();
            fibs.sort_unstable();
            fibs.dedup();
            assert_eq!(fibs.len(), out.fibers.len(), "{name}: fiber reused");
            let mut tids = out.targets.clone();
            tids.sort_unstable();
            tids.dedup();
            assert_eq!(tids.len(), out.targets.len(), "{name}: target reused");

            // Reachability and dot blocking at commit time
            for (&t, &f) in out.targets.iter().zip(&out.fibers) {
                let pos = targets[t].pos;
                assert!(
                    fibers::fiber_center(f).dsq(&pos) <= RMAX * RMAX,
                    "{name}: target out of patrol area"
                );
                assert!(
                    fibers::dot_center(f).dsq(&pos) >= DOTDIST * DOTDIST,
                    "{name}: target inside dot shadow"
                );
            }

            // No two committed targets collide
            for a in 0..out.len() {
                for b in (a + 1)..out.len() {
                    let d = targets[out.targets[a]].pos.dsq(&targets[out.targets[b]].pos);
                    assert!(d > COLLDIST * COLLDIST, "{name}: committed pair collides");
                }
            }
        }
    }

    #[test]
    fn density_queue_ordering_matches_contract() {
        // Build by hand: pri 3 beats pri 5 regardless of prox; among
        // equal pri the larger prox wins after an update.
        let entries = vec![
            PqEntry { prox: 1.0, pri: 5 },
            PqEntry { prox: 2.0, pri: 5 },
            PqEntry { prox: 0.0, pri: 3 },
        ];
        let mut queue = MutablePriorityQueue::from_priorities(entries);
        assert_eq!(queue.top(), 2);
        queue.set_priority(2, PqEntry { prox: 0.0, pri: 10 });
        assert_eq!(queue.top(), 1);
    }

    #[test]
    fn kernel_is_a_clamped_parabola() {
        assert_eq!(kernel_weight(RKERN * RKERN), 0.0);
        assert_eq!(kernel_weight(RKERN * RKERN + 1.0), 0.0);
        assert!(kernel_weight(0.0) > kernel_weight(1.0));
        assert_eq!(kernel_weight(0.0), RKERN * RKERN);
    }
}
