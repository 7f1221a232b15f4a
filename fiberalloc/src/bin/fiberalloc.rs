//! Fiber assignment planner CLI.
//!
//! Parameters are flat `key=value` words:
//!
//! ```text
//! fiberalloc assigner=new input=targets.txt fract=0.8 output=report.txt
//! ```
//!
//! Recognized keys: `assigner` (naive|draining|new), `input`, `output`,
//! `fract`, `ra`, `dec`, `posang`, `dptg`, `nptg`, `dposang`, `nposang`.
//! Angles are degrees on the command line. When neither `ra` nor `dec`
//! is given, the pointing defaults to the center of the smallest circle
//! enclosing the catalog.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fiberalloc::catalog::read_targets;
use fiberalloc::driver::{self, ObservationConfig};
use fiberalloc::params::ParamMap;
use fiberalloc::report::ReportWriter;
use fiberalloc::strategy::assigner_by_name;
use fiberalloc::target::Target;
use log::info;
use skymath::{enclosing_cap, Pointing};
use std::path::PathBuf;

/// Command line arguments: free-form key=value parameter words.
#[derive(Parser, Debug)]
#[command(
    name = "fiberalloc",
    about = "Assign spectrograph fibers to observation targets over a sequence of exposures",
    long_about = None
)]
struct Args {
    /// Run parameters as key=value words (e.g. assigner=new fract=0.8)
    #[arg(required = true)]
    params: Vec<String>,
}

fn nominal_pointing(params: &ParamMap, targets: &[Target]) -> Result<Pointing> {
    if params.contains("ra") || params.contains("dec") {
        let ra: f64 = params.get("ra")?;
        let dec: f64 = params.get("dec")?;
        return Ok(Pointing::from_radec_deg(ra, dec));
    }
    if targets.is_empty() {
        bail!("cannot derive a pointing from an empty catalog; give ra= and dec=");
    }
    let directions: Vec<_> = targets
        .iter()
        .map(|t| Pointing::from_radec_deg(t.pos.x, t.pos.y).to_vector())
        .collect();
    let cap = enclosing_cap(&directions);
    let center = Pointing::from_vector(&cap.center);
    info!(
        "center of data set: RA {}, DEC {}",
        center.ra_deg(),
        center.dec_deg()
    );
    Ok(center)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let params = ParamMap::from_args(&args.params)?;

    let assigner_name: String = params.get("assigner")?;
    let assigner = assigner_by_name(&assigner_name)
        .with_context(|| format!("unknown assigner '{assigner_name}'"))?;

    let input: PathBuf = params.get("input")?;
    let mut targets = read_targets(&input)?;
    info!("read {} targets from {}", targets.len(), input.display());

    let center = nominal_pointing(&params, &targets)?;
    let posang = params.get_or::<f64>("posang", 0.0)?.to_radians();
    let cfg = ObservationConfig {
        center,
        posang,
        // dptg default corresponds to roughly 4 mm in the PFI plane
        dptg: params.get_or::<f64>("dptg", 4.0 / 320.0)?.to_radians(),
        nptg: params.get_or("nptg", 5)?,
        dposang: params.get_or::<f64>("dposang", 4.0)?.to_radians(),
        nposang: params.get_or("nposang", 5)?,
        fract: params.get("fract")?,
    };

    driver::discard_off_plate(&mut targets, &cfg.center, cfg.posang);
    info!("{} targets remain inside the plate radius", targets.len());

    let output: String = params.get_or("output", String::new())?;
    let mut report = if output.is_empty() {
        None
    } else {
        Some(ReportWriter::create(output.as_ref())?)
    };

    let summary = driver::run(targets, &cfg, assigner.as_ref(), report.as_mut())?;
    info!(
        "done: {} exposures, coverage {:.5}, elapsed {}s",
        summary.exposures,
        summary.coverage(),
        summary.elapsed
    );
    Ok(())
}
