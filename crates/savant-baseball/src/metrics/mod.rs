// Sabermetric formula library: rate stats, weighted stats, run prevention,
// estimated stats, park/conference adjustments, and league calibration.
//
// Every function here is total. Divisions go through `ratio`, and results
// pass through `sanitize`, so NaN and infinities never escape as values.

pub mod batting;
pub mod calibration;
pub mod estimated;
pub mod lines;
pub mod pitching;

/// Map NaN and +/-Infinity to 0.0; finite values pass through unchanged.
pub fn sanitize(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// `num / den`, or 0.0 when the denominator is not positive.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        sanitize(num / den)
    } else {
        0.0
    }
}

/// Clamp after sanitizing, so a NaN input lands on 0 before clamping.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    sanitize(x).clamp(lo, hi)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    sanitize((sanitize(x) * factor).round() / factor)
}

/// Convert innings stored as outs (thirds) to decimal innings.
///
/// `19` -> 6.333..., `18` -> 6.0.
pub fn thirds_to_ip(thirds: u32) -> f64 {
    (thirds / 3) as f64 + (thirds % 3) as f64 / 3.0
}
