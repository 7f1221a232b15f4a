//! Precession and nutation of equatorial coordinates.
//!
//! Classical almanac-grade reductions: a rigorous rotation-matrix
//! precession between two equinoxes and the 1980-style 63-term nutation
//! series. Angles are radians throughout.

use crate::pointing::Pointing;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Evaluate a polynomial `c[0] + c[1] x + c[2] x² + …`.
fn poly(x: f64, c: &[f64]) -> f64 {
    let mut res = 0.0;
    let mut v = 1.0;
    for &ci in c {
        res += ci * v;
        v *= x;
    }
    res
}

fn unit_vector(ra: f64, dec: f64) -> Vector3<f64> {
    Pointing::new(FRAC_PI_2 - dec, ra).to_vector()
}

fn radec_of(v: &Vector3<f64>) -> (f64, f64) {
    let p = Pointing::from_vector(v);
    (p.phi, FRAC_PI_2 - p.theta)
}

// Multiples of the five fundamental arguments for each periodic term.
const D_LNG: [f64; 63] = [
    0., -2., 0., 0., 0., 0., -2., 0., 0., -2., -2., -2., 0., 2., 0., 2., 0., 0., -2., 0., 2., 0.,
    0., -2., 0., -2., 0., 0., 2., -2., 0., -2., 0., 0., 2., 2., 0., -2., 0., 2., 2., -2., -2., 2.,
    2., 0., -2., -2., 0., -2., -2., 0., -1., -2., 1., 0., 0., -1., 0., 0., 2., 0., 2.,
];
const M_LNG: [f64; 63] = [
    0., 0., 0., 0., 1., 0., 1., 0., 0., -1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
    0., 0., 0., 0., 2., 0., 2., 1., 0., -1., 0., 0., 0., 1., 1., -1., 0., 0., 0., 0., 0., 0., -1.,
    -1., 0., 0., 0., 1., 0., 0., 1., 0., 0., 0., -1., 1., -1., -1., 0., -1.,
];
const MP_LNG: [f64; 63] = [
    0., 0., 0., 0., 0., 1., 0., 0., 1., 0., 1., 0., -1., 0., 1., -1., -1., 1., 2., -2., 0., 2.,
    2., 1., 0., 0., -1., 0., -1., 0., 0., 1., 0., 2., -1., 1., 0., 1., 0., 0., 1., 2., 1., -2.,
    0., 1., 0., 0., 2., 2., 0., 1., 1., 0., 0., 1., -2., 1., 1., 1., -1., 3., 0.,
];
const F_LNG: [f64; 63] = [
    0., 2., 2., 0., 0., 0., 2., 2., 2., 2., 0., 2., 2., 0., 0., 2., 0., 2., 0., 2., 2., 2., 0.,
    2., 2., 2., 2., 0., 0., 2., 0., 0., 0., -2., 2., 2., 2., 0., 2., 2., 0., 2., 2., 0., 0., 0.,
    2., 0., 2., 0., 2., -2., 0., 0., 0., 2., 2., 0., 0., 2., 2., 2., 2.,
];
const OM_LNG: [f64; 63] = [
    1., 2., 2., 2., 0., 0., 2., 1., 2., 2., 0., 1., 2., 0., 1., 2., 1., 1., 0., 1., 2., 2., 0.,
    2., 0., 0., 1., 0., 1., 2., 1., 1., 1., 0., 1., 2., 2., 0., 2., 1., 0., 2., 1., 1., 1., 0.,
    1., 1., 1., 1., 1., 0., 0., 0., 0., 0., 2., 0., 0., 2., 2., 2., 2.,
];
// Longitude (sin) amplitudes in 0.1 mas, with secular corrections.
const SIN_LNG: [f64; 63] = [
    -171996., -13187., -2274., 2062., 1426., 712., -517., -386., -301., 217., -158., 129., 123.,
    63., 63., -59., -58., -51., 48., 46., -38., -31., 29., 29., 26., -22., 21., 17., 16., -16.,
    -15., -13., -12., 11., -10., -8., 7., -7., -7., -7., 6., 6., 6., -6., -6., 5., -5., -5., -5.,
    4., 4., 4., -4., -4., -4., 3., -3., -3., -3., -3., -3., -3., -3.,
];
const SDELT: [f64; 63] = [
    -174.2, -1.6, -0.2, 0.2, -3.4, 0.1, 1.2, -0.4, 0., -0.5, 0., 0.1, 0., 0., 0.1, 0., -0.1, 0.,
    0., 0., 0., 0., 0., 0., 0., 0., 0., -0.1, 0., 0.1, 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
    0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
];
// Obliquity (cos) amplitudes in 0.1 mas, with secular corrections.
const COS_LNG: [f64; 63] = [
    92025., 5736., 977., -895., 54., -7., 224., 200., 129., -95., 0., -70., -53., 0., -33., 26.,
    32., 27., 0., -24., 16., 13., 0., -12., 0., 0., -10., 0., -8., 7., 9., 7., 6., 0., 5., 3.,
    -3., 0., 3., 3., 0., -3., -3., 3., 3., 0., 3., 3., 3., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
    0., 0., 0., 0., 0.,
];
const CDELT: [f64; 63] = [
    8.9, -3.1, -0.5, 0.5, -0.1, 0.0, -0.6, 0.0, -0.1, 0.3, 0., 0., 0., 0., 0., 0., 0., 0., 0.,
    0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
    0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
];

/// Apply nutation to equatorial coordinates at a Julian date.
///
/// Returns the nutated `(ra, dec)` in radians.
pub fn nutate(jd: f64, ra: f64, dec: f64) -> (f64, f64) {
    // Julian centuries from J2000.0
    let t = (jd - crate::time::JD_J2000) / 36_525.0;

    // Mean elongation of the Moon
    let coeff1 = [297.85036, 445_267.111480, -0.0019142, 1.0 / 189_474.0];
    let d = (poly(t, &coeff1).to_radians()).rem_euclid(TAU);

    // Sun's mean anomaly
    let coeff2 = [357.52772, 35_999.050340, -0.0001603, -1.0 / 3.0e5];
    let m = (poly(t, &coeff2).to_radians()).rem_euclid(TAU);

    // Moon's mean anomaly
    let coeff3 = [134.96298, 477_198.867398, 0.0086972, 1.0 / 5.625e4];
    let mprime = (poly(t, &coeff3).to_radians()).rem_euclid(TAU);

    // Moon's argument of latitude
    let coeff4 = [93.27191, 483_202.017538, -0.0036825, -1.0 / 3.272_70e5];
    let f = (poly(t, &coeff4).to_radians()).rem_euclid(TAU);

    // Longitude of the ascending node of the Moon's mean orbit
    let coeff5 = [125.04452, -1934.136261, 0.0020708, 1.0 / 4.5e5];
    let omega = (poly(t, &coeff5).to_radians()).rem_euclid(TAU);

    let mut d_psi = 0.0;
    let mut d_eps = 0.0;
    for n in 0..D_LNG.len() {
        let arg = D_LNG[n] * d + M_LNG[n] * m + MP_LNG[n] * mprime + F_LNG[n] * f + OM_LNG[n] * omega;
        d_psi += 0.0001 * (SDELT[n] * t + SIN_LNG[n]) * arg.sin();
        d_eps += 0.0001 * (CDELT[n] * t + COS_LNG[n]) * arg.cos();
    }

    // True obliquity of the ecliptic in radians
    let eps0 = 23.4392911 * 3600.0 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    let eps = ((eps0 + d_eps) / 3600.0).to_radians();

    let ce = eps.cos();
    let se = eps.sin();

    // Apply the corrections in equatorial rectangular coordinates
    let d2as = std::f64::consts::PI / (180.0 * 3600.0);
    let p1 = unit_vector(ra, dec);
    let p2 = Vector3::new(
        p1.x - (p1.y * ce + p1.z * se) * d_psi * d2as,
        p1.y + (p1.x * ce * d_psi - p1.z * d_eps) * d2as,
        p1.z + (p1.x * se * d_psi + p1.y * d_eps) * d2as,
    );
    let (ra2, dec2) = radec_of(&p2);
    (ra2, dec2)
}

/// Precess equatorial coordinates from one equinox to another.
///
/// `equinox1`/`equinox2` are Julian epochs (e.g. 2000.0). Returns the
/// precessed `(ra, dec)` in radians, with `ra` normalized to `[0, 2π)`.
pub fn precess(ra: f64, dec: f64, equinox1: f64, equinox2: f64) -> (f64, f64) {
    let sec2rad = 1.0_f64.to_radians() / 3600.0;
    let x = unit_vector(ra, dec);
    let t = 1e-3 * (equinox2 - equinox1);
    let st = 1e-3 * (equinox1 - 2000.0);
    let a = sec2rad * t * (23_062.181 + st * (139.656 + 0.0139 * st) + t * (30.188 - 0.344 * st + 17.998 * t));
    let b = sec2rad * t * t * (79.280 + 0.410 * st + 0.205 * t) + a;
    let c = sec2rad * t * (20_043.109 - st * (85.33 + 0.217 * st) + t * (-42.665 - 0.217 * st - 41.833 * t));

    let (sina, cosa) = a.sin_cos();
    let (sinb, cosb) = b.sin_cos();
    let (sinc, cosc) = c.sin_cos();

    let r = Matrix3::from_columns(&[
        Vector3::new(
            cosa * cosb * cosc - sina * sinb,
            sina * cosb + cosa * sinb * cosc,
            cosa * sinc,
        ),
        Vector3::new(
            -cosa * sinb - sina * cosb * cosc,
            cosa * cosb - sina * sinb * cosc,
            -sina * sinc,
        ),
        Vector3::new(-cosb * sinc, -sinb * sinc, cosc),
    ]);

    let x2 = r * x;
    let (mut ra2, dec2) = radec_of(&x2);
    if ra2 < 0.0 {
        ra2 += TAU;
    }
    (ra2, dec2)
}
