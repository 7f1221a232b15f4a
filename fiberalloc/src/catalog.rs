//! ASCII target catalog reader.
//!
//! One record per line: `IDxxxx ra dec time pri`, whitespace separated,
//! RA/Dec in degrees, time in seconds, priority an integer (lower is
//! more urgent). `#` starts a comment; blank lines are skipped.
//! Malformed records are warned about and skipped, but an identifier
//! that does not start with `ID` aborts the read.

use crate::target::Target;
use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a target catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened or read.
    #[error("could not open target file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An identifier token did not start with `ID<integer>`.
    #[error("{path}:{line}: identifier '{token}' not starting with 'ID'")]
    BadIdentifier {
        path: String,
        line: usize,
        token: String,
    },
}

/// Read all targets from the ASCII catalog at `path`.
///
/// Returned coordinates are RA/Dec in degrees. Lines that do not parse
/// as `id x y time pri` are logged via `warn!` and skipped.
pub fn read_targets(path: &Path) -> Result<Vec<Target>, CatalogError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: display.clone(),
        source,
    })?;

    let mut targets = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let lineno = lineno + 1;
        let line = line.map_err(|source| CatalogError::Io {
            path: display.clone(),
            source,
        })?;
        // Strip carriage returns and trailing comments
        let line = line.trim_end_matches('\r');
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match parse_record(line) {
            Some(Record::Ok { id, x, y, time, pri }) => {
                targets.push(Target::new(x, y, time, id, pri));
            }
            Some(Record::BadId(token)) => {
                return Err(CatalogError::BadIdentifier {
                    path: display,
                    line: lineno,
                    token,
                });
            }
            None => {
                warn!("unrecognized format in '{display}', line {lineno}: {line}");
            }
        }
    }
    Ok(targets)
}

enum Record {
    Ok {
        id: i32,
        x: f64,
        y: f64,
        time: f64,
        pri: i32,
    },
    BadId(String),
}

fn parse_record(line: &str) -> Option<Record> {
    let mut tokens = line.split_whitespace();
    let id_token = tokens.next()?;
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    let time: f64 = tokens.next()?.parse().ok()?;
    let pri: i32 = tokens.next()?.parse().ok()?;

    // A well-formed numeric record with a broken identifier is fatal,
    // not skippable: the catalog itself is suspect.
    let id = match id_token
        .strip_prefix("ID")
        .filter(|rest| !rest.is_empty())
        .and_then(|rest| rest.parse::<i32>().ok())
    {
        Some(id) => id,
        None => return Some(Record::BadId(id_token.to_string())),
    };
    Some(Record::Ok { id, x, y, time, pri })
}
