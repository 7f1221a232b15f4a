//! Calendar and sidereal-time conversions.
//!
//! Gregorian/Julian date arithmetic, Greenwich mean and apparent sidereal
//! time, and hour angles. Accuracy is at the level of the classical
//! almanac formulas, which is sufficient for telescope pre-pointing.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised when parsing date-time strings.
#[derive(Debug, Error)]
pub enum TimeParseError {
    /// Input did not match `YYYY-MM-DDThh:mm:ssZ`.
    #[error("unrecognized date-time format '{0}', expected YYYY-MM-DDThh:mm:ssZ")]
    Format(String),
}

/// Julian date of the J2000.0 epoch.
pub const JD_J2000: f64 = 2_451_545.0;

/// Convert a Gregorian calendar date to a Julian date at 0h UT.
///
/// Standard Fliegel/van Flandern-style arithmetic; valid for dates in the
/// Gregorian calendar.
pub fn greg_to_julian(year: i32, month: i32, day: i32) -> f64 {
    let (mut y, mut m) = (year, month);
    if m <= 2 {
        // January and February count as months 13/14 of the prior year
        y -= 1;
        m += 12;
    }
    let a = y / 100;
    let b = a / 4;
    let c = 2 - a + b;
    let e = (365.25 * (y + 4716) as f64) as i64;
    let f = (30.6001 * (m + 1) as f64) as i64;
    (c as i64 + day as i64 + e + f) as f64 - 1524.5
}

/// Convert a Julian date back to a Gregorian calendar date.
///
/// The time-of-day fraction is discarded; the returned day is the civil
/// date containing the instant.
pub fn julian_to_greg(jd: f64) -> (i32, i32, i32) {
    let q = jd + 0.5;
    let z = q as i64;
    let w = ((z as f64 - 1_867_216.25) / 36_524.25) as i64;
    let x = w / 4;
    let a = z + 1 + w - x;
    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25) as i64;
    let d = (365.25 * c as f64) as i64;
    let e = ((b - d) as f64 / 30.6001) as i64;
    let f = (30.6001 * e as f64) as i64;
    let day = (b - d - f) as i32;
    let mut month = (e - 1) as i32;
    if month > 12 {
        month -= 12;
    }
    let mut year = (c - 4716) as i32;
    if month <= 2 {
        year += 1;
    }
    (year, month, day)
}

/// Greenwich mean sidereal time in hours for a Julian date.
pub fn jd_to_gmst(jd: f64) -> f64 {
    let jd0 = (jd + 0.5).floor() - 0.5;
    let h = (jd - jd0) * 24.0;
    let d = jd - JD_J2000;
    let d0 = jd0 - JD_J2000;
    let t = d / 36_525.0;
    let gmst = 6.697374558 + 0.06570982441908 * d0 + 1.00273790935 * h + 0.000026 * t * t;
    gmst.rem_euclid(24.0)
}

/// Greenwich apparent sidereal time in hours for a Julian date.
///
/// GMST corrected by the equation of the equinoxes (short nutation
/// series).
pub fn jd_to_gast(jd: f64) -> f64 {
    let gmst = jd_to_gmst(jd);
    let d = jd - JD_J2000;
    let omega = 125.04 - 0.052954 * d;
    let l = 280.47 + 0.98565 * d;
    let eps = 23.4393 - 0.0000004 * d;
    let dpsi = -0.000319 * omega.to_radians().sin() - 0.000024 * (2.0 * l).to_radians().sin();
    (gmst + dpsi * eps.to_radians().cos()).rem_euclid(24.0)
}

/// Low-precision GMST in hours, good to a few seconds over decades.
pub fn jd_to_gmst_approx(jd: f64) -> f64 {
    (18.697374558 + 24.06570982441908 * (jd - JD_J2000)).rem_euclid(24.0)
}

/// Hour angle in radians from sidereal time (hours), site longitude and
/// right ascension (radians, east positive).
pub fn gmst_to_hour_angle(gmst: f64, lon: f64, ra: f64) -> f64 {
    (gmst * 15.0_f64.to_radians() + lon - ra).rem_euclid(std::f64::consts::TAU)
}

/// Parse an ISO-8601 UTC timestamp (`YYYY-MM-DDThh:mm:ssZ`) to a Julian
/// date.
pub fn iso8601_to_jd(datetime: &str) -> Result<f64, TimeParseError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})Z$")
            .expect("date-time pattern is a valid regex")
    });
    let caps = re
        .captures(datetime)
        .ok_or_else(|| TimeParseError::Format(datetime.to_string()))?;
    // The pattern guarantees every group is a short digit run.
    let field = |i: usize| caps[i].parse::<f64>().expect("digit group");
    let jd0 = greg_to_julian(field(1) as i32, field(2) as i32, field(3) as i32);
    Ok(jd0 + field(4) / 24.0 + field(5) / (24.0 * 60.0) + field(6) / (24.0 * 3600.0))
}
