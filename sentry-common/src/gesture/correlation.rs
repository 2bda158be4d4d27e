use super::sample::Sample;

pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchDecision {
    Accept,
    Reject,
}

/// Pearson correlation coefficient of each axis, in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CorrelationResult {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CorrelationResult {
    /// Correlates the common prefix of `a` and `b`; the tail of the longer
    /// sequence is ignored. An axis that is constant in either sequence
    /// correlates as 0.
    pub fn compute(a: &[Sample], b: &[Sample]) -> Self {
        let len = a.len().min(b.len());
        let (a, b) = (&a[..len], &b[..len]);
        Self {
            x: pearson(a, b, |s| s.x),
            y: pearson(a, b, |s| s.y),
            z: pearson(a, b, |s| s.z),
        }
    }

    pub const fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Accepts only when every axis is strictly above `threshold`.
    pub fn decide(&self, threshold: f32) -> MatchDecision {
        if self.axes().iter().all(|r| *r > threshold) {
            MatchDecision::Accept
        } else {
            MatchDecision::Reject
        }
    }
}

/// `a` and `b` must have the same length.
fn pearson(a: &[Sample], b: &[Sample], axis: impl Fn(&Sample) -> f32) -> f32 {
    let n = a.len();
    if n == 0 {
        return 0.0;
    }

    // sums of f32 values are exact in f64 for any realistic capture length, so
    // a constant axis gives deviations of exactly zero
    let mean = |seq: &[Sample]| seq.iter().map(|s| axis(s) as f64).sum::<f64>() / n as f64;
    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut numerator = 0.0f64;
    let mut sum_sq_a = 0.0f64;
    let mut sum_sq_b = 0.0f64;
    for (sample_a, sample_b) in a.iter().zip(b) {
        let diff_a = axis(sample_a) as f64 - mean_a;
        let diff_b = axis(sample_b) as f64 - mean_b;
        numerator += diff_a * diff_b;
        sum_sq_a += diff_a * diff_a;
        sum_sq_b += diff_b * diff_b;
    }

    let denominator = libm::sqrt(sum_sq_a * sum_sq_b);
    if denominator == 0.0 {
        return 0.0;
    }

    ((numerator / denominator) as f32).clamp(-1.0, 1.0)
}
