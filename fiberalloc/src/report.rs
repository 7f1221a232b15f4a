//! Per-exposure assignment report.
//!
//! Appends one block per exposure: a header with the exposure index,
//! duration, pointing and position angle, then one fixed-width row per
//! assigned fiber. The coordinate columns are labeled RA/DEC for
//! historical reasons but carry the projected PFI (x, y) in millimeters;
//! consumers read them by position. Field widths are a stable interface.

use crate::geom::Vec2;
use skymath::Pointing;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors raised by the report writer.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("error opening output file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error writing report: {0}")]
    Write(#[from] std::io::Error),
}

/// One assigned fiber in an exposure: target id, fiber index and the
/// target's projected position.
#[derive(Debug, Clone, Copy)]
pub struct ReportRow {
    pub target_id: i32,
    pub fiber: usize,
    pub pos: Vec2,
}

/// Streaming writer for the exposure report file.
#[derive(Debug)]
pub struct ReportWriter {
    out: BufWriter<File>,
}

impl ReportWriter {
    /// Create (truncate) the report file at `path`.
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let file = File::create(path).map_err(|source| ReportError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Append one exposure block.
    ///
    /// Fiber ids are written 1-based; everything else is passed through.
    pub fn write_exposure(
        &mut self,
        index: usize,
        duration: f64,
        center: &Pointing,
        posang_rad: f64,
        rows: &[ReportRow],
    ) -> Result<(), ReportError> {
        writeln!(
            self.out,
            "Exposure {}: duration {}s, RA: {}, DEC {}, PA: {}",
            index,
            duration,
            center.ra_deg(),
            center.dec_deg(),
            posang_rad.to_degrees()
        )?;
        writeln!(self.out, "  Target     Fiber        RA       DEC")?;
        for row in rows {
            writeln!(
                self.out,
                "{:>8}{:>10}{:>10.5}{:>10.5}",
                row.target_id,
                row.fiber + 1,
                row.pos.x,
                row.pos.y
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_fixed_width_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let mut writer = ReportWriter::create(&path).unwrap();

        let rows = vec![
            ReportRow {
                target_id: 17,
                fiber: 0,
                pos: Vec2::new(1.5, -2.25),
            },
            ReportRow {
                target_id: 20001,
                fiber: 2393,
                pos: Vec2::new(-10.0, 0.125),
            },
        ];
        let center = Pointing::from_radec_deg(34.0, -4.5);
        writer
            .write_exposure(0, 900.0, &center, 0.0, &rows)
            .unwrap();
        drop(writer);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Exposure 0: duration 900s, RA: "));
        assert_eq!(lines[1], "  Target     Fiber        RA       DEC");
        assert_eq!(lines[2], "      17         1   1.50000  -2.25000");
        assert_eq!(lines[3], "   20001      2394 -10.00000   0.12500");
    }

    #[test]
    fn appends_successive_exposures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let mut writer = ReportWriter::create(&path).unwrap();
        let center = Pointing::from_radec_deg(0.0, 0.0);
        writer.write_exposure(0, 450.0, &center, 0.1, &[]).unwrap();
        writer.write_exposure(1, 450.0, &center, 0.1, &[]).unwrap();
        drop(writer);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Exposure").count(), 2);
        assert!(text.contains("Exposure 1:"));
    }

    #[test]
    fn unwritable_path_is_open_error() {
        let path = Path::new("/nonexistent-dir/report.txt");
        assert!(matches!(
            ReportWriter::create(path),
            Err(ReportError::Open { .. })
        ));
    }
}
