//! Multi-exposure observation driver.
//!
//! Repeatedly asks the exposure optimizer for the best pointing, records
//! the assignment, subtracts the achieved integration time from every
//! observed target, and stops once the requested coverage fraction is
//! reached or no fiber can be assigned anymore.

use crate::fibers::RPLATE;
use crate::geom::Vec2;
use crate::optimizer::optimal_exposure;
use crate::projection::project_to_pfi;
use crate::report::{ReportError, ReportRow, ReportWriter};
use crate::strategy::FiberAssigner;
use crate::target::Target;
use log::info;
use skymath::Pointing;

/// Residual integration time below which a target counts as done.
const TIME_EPSILON: f64 = 1e-7;

/// Pointing search configuration for a whole observation run.
#[derive(Debug, Clone)]
pub struct ObservationConfig {
    /// Nominal telescope pointing.
    pub center: Pointing,
    /// Nominal position angle, radians.
    pub posang: f64,
    /// Half-extent of the pointing search grid, radians on the sky.
    pub dptg: f64,
    /// Pointing grid cells per axis.
    pub nptg: usize,
    /// Half-extent of the position-angle search, radians.
    pub dposang: f64,
    /// Position-angle cells.
    pub nposang: usize,
    /// Stop once the accumulated fraction of requested time exceeds
    /// this.
    pub fract: f64,
}

/// Accounting for a finished observation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Number of exposures taken.
    pub exposures: usize,
    /// Total requested integration time over the input catalog.
    pub total_requested: f64,
    /// Accumulated fiber-seconds: Σ (assigned fibers × duration).
    pub accumulated: f64,
    /// Summed exposure durations.
    pub elapsed: f64,
}

impl RunSummary {
    /// Fraction of the requested integration collected so far.
    pub fn coverage(&self) -> f64 {
        if self.total_requested > 0.0 {
            self.accumulated / self.total_requested
        } else {
            0.0
        }
    }
}

/// Drop targets whose projection at the nominal pointing falls outside
/// the plate radius. Run once, before the exposure loop.
pub fn discard_off_plate(targets: &mut Vec<Target>, center: &Pointing, posang: f64) {
    let mut projected = targets.clone();
    project_to_pfi(&mut projected, center, posang);
    let origin = Vec2::default();
    let mut keep = projected
        .iter()
        .map(|t| t.pos.dsq(&origin) < RPLATE * RPLATE);
    targets.retain(|_| keep.next().unwrap_or(false));
}

/// Observe the target list until coverage is met or progress stops.
///
/// Each iteration finds the best pointing/PA perturbation, records the
/// exposure (optionally to `report`), and strips the common exposure
/// duration from every observed target. Targets whose remaining time
/// drops below a small epsilon leave the list.
pub fn run(
    mut targets: Vec<Target>,
    cfg: &ObservationConfig,
    assigner: &dyn FiberAssigner,
    mut report: Option<&mut ReportWriter>,
) -> Result<RunSummary, ReportError> {
    let mut summary = RunSummary {
        total_requested: targets.iter().map(|t| t.time).sum(),
        ..RunSummary::default()
    };
    info!("total requested observation time: {}s", summary.total_requested);

    loop {
        let choice = optimal_exposure(
            &targets,
            &cfg.center,
            cfg.dptg,
            cfg.nptg,
            cfg.posang,
            cfg.dposang,
            cfg.nposang,
            assigner,
        );
        if choice.assignment.is_empty() {
            break; // no more fibers can be assigned
        }

        let duration = choice
            .assignment
            .targets
            .iter()
            .map(|&i| targets[i].time)
            .fold(f64::INFINITY, f64::min);

        if let Some(writer) = report.as_deref_mut() {
            // Report rows carry the winning projection's PFI positions
            let mut projected = targets.clone();
            project_to_pfi(&mut projected, &choice.center, choice.posang);
            let rows: Vec<ReportRow> = choice
                .assignment
                .targets
                .iter()
                .zip(&choice.assignment.fibers)
                .map(|(&t, &f)| ReportRow {
                    target_id: targets[t].id,
                    fiber: f,
                    pos: projected[t].pos,
                })
                .collect();
            writer.write_exposure(
                summary.exposures,
                duration,
                &choice.center,
                choice.posang,
                &rows,
            )?;
        }

        summary.accumulated += choice.assignment.len() as f64 * duration;
        summary.elapsed += duration;
        info!(
            "exposure {}: {} fibers allocated ({:.5} of array), coverage {:.5}, elapsed {}s",
            summary.exposures,
            choice.assignment.len(),
            choice.assignment.len() as f64 / crate::fibers::NFIBER as f64,
            summary.coverage(),
            summary.elapsed
        );
        summary.exposures += 1;

        if summary.coverage() > cfg.fract {
            break;
        }
        strip_observed(&mut targets, &choice.assignment.targets, duration);
    }
    Ok(summary)
}

/// Subtract `duration` from every observed target, dropping the ones
/// that are done.
fn strip_observed(targets: &mut Vec<Target>, observed: &[usize], duration: f64) {
    let mut was_observed = vec![false; targets.len()];
    for &i in observed {
        was_observed[i] = true;
    }
    let mut keep = Vec::with_capacity(targets.len());
    for (i, target) in targets.drain(..).enumerate() {
        if !was_observed[i] {
            keep.push(target);
        } else if target.time > duration + TIME_EPSILON {
            let mut target = target;
            target.time -= duration;
            keep.push(target);
        }
    }
    *targets = keep;
}
