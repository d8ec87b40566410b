//! Latency percentiles over completed runs
//!
//! ## Method
//!
//! Linear interpolation between order statistics. For `n` sorted latencies
//! and percentile `p`, the rank is `p / 100 * (n - 1)`; the result is the
//! weighted mean of the two neighbouring order statistics. No rounding is
//! applied, so p50 of `{100, 300}` is exactly `200.0`.
//!
//! With no latencies every requested percentile reports `latency: None`.
//! That is a valid "no data" result, never zero.

use runscope_core::LatencyPercentile;

/// Percentiles reported when none are configured
pub const DEFAULT_PERCENTILES: [f64; 4] = [50.0, 90.0, 95.0, 99.0];

/// Compute the requested percentiles over a latency population
///
/// Output order follows `requested`. Input order does not matter.
pub fn latency_percentiles(latencies_ms: &[u64], requested: &[f64]) -> Vec<LatencyPercentile> {
    let mut sorted: Vec<f64> = latencies_ms.iter().map(|&l| l as f64).collect();
    sorted.sort_by(f64::total_cmp);

    requested
        .iter()
        .map(|&percentile| LatencyPercentile {
            percentile,
            latency: interpolate(&sorted, percentile),
        })
        .collect()
}

/// Interpolated value at percentile `p` of an ascending slice
///
/// `p` is clamped to `[0, 100]`. Returns `None` for an empty slice or a
/// NaN percentile.
pub fn interpolate(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || p.is_nan() {
        return None;
    }
    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}
