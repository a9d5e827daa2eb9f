// Descriptive statistics used by the projection pipeline.

/// Mean and sample standard deviation of a set of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub mean: f64,
    pub std: f64,
    pub n: usize,
}

/// Compute mean and sample standard deviation (n - 1 denominator).
///
/// An empty slice has mean 0. Fewer than two observations have std 0.
pub fn sample_stats(values: &[f64]) -> SampleStats {
    let n = values.len();
    if n == 0 {
        return SampleStats {
            mean: 0.0,
            std: 0.0,
            n,
        };
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };
    SampleStats { mean, std, n }
}

/// Standard deviations at or below this are treated as zero.
const STD_EPSILON: f64 = 1e-9;

/// Replace a zero (or non-finite) standard deviation with 1 so it can be
/// used as a divisor.
pub fn usable_std(std: f64) -> f64 {
    if !std.is_finite() || std <= STD_EPSILON {
        1.0
    } else {
        std
    }
}

/// Round to one decimal place, judged on the exact binary value, with exact
/// halves going to the even digit. `0.15` (stored just below) gives `0.1`,
/// `12.25` (an exact half) gives `12.2`.
pub fn round_tenth(v: f64) -> f64 {
    let scaled = v * 10.0;
    let floor = scaled.floor();
    if scaled - floor != 0.5 {
        return scaled.round() / 10.0;
    }
    // `scaled` may have rounded onto the midpoint; the fused sign is exact.
    let rounded = match v.mul_add(20.0, -(2.0 * floor + 1.0)) {
        d if d > 0.0 => floor + 1.0,
        d if d < 0.0 => floor,
        _ if floor % 2.0 == 0.0 => floor,
        _ => floor + 1.0,
    };
    rounded / 10.0
}
