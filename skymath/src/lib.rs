//! Astrometry support for telescope pointing and scheduling.
//!
//! This crate collects the coordinate and time machinery that sits
//! around an observation planner: directions on the celestial sphere,
//! calendar and sidereal-time conversions, precession/nutation of
//! equatorial coordinates, and smallest enclosing caps for deriving a
//! pointing from a target list. It performs no I/O.

pub mod enclosing;
pub mod pointing;
pub mod precess;
pub mod time;

// Re-exports for easier access
pub use enclosing::{enclosing_cap, Cap};
pub use pointing::Pointing;
pub use precess::{nutate, precess};
pub use time::{
    greg_to_julian, iso8601_to_jd, jd_to_gast, jd_to_gmst, julian_to_greg, TimeParseError,
};
