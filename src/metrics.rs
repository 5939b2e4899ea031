/// Compute metrics (mean, median, 25th percentile, 75th percentile) from samples
pub fn compute_metrics(samples: &[f64]) -> Option<(f64, f64, f64, f64)> {
    if samples.len() < 2 {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let median = sorted[n / 2];
    let p25 = sorted[n / 4];
    let p75 = sorted[3 * n / 4];
    Some((mean, median, p25, p75))
}

/// Largest absolute deviation from `expected`, e.g. how late the worst tick was.
pub fn max_deviation(samples: &[f64], expected: f64) -> Option<f64> {
    samples
        .iter()
        .map(|s| (s - expected).abs())
        .max_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_at_least_two_samples() {
        assert_eq!(compute_metrics(&[]), None);
        assert_eq!(compute_metrics(&[100.0]), None);
    }

    #[test]
    fn quartiles_of_unsorted_samples() {
        let (mean, median, p25, p75) =
            compute_metrics(&[104.0, 100.0, 98.0, 102.0]).unwrap();
        assert_eq!(mean, 101.0);
        assert_eq!(median, 102.0);
        assert_eq!(p25, 100.0);
        assert_eq!(p75, 104.0);
    }

    #[test]
    fn deviation_from_nominal_interval() {
        assert_eq!(max_deviation(&[100.0, 97.5, 103.0], 100.0), Some(3.0));
        assert_eq!(max_deviation(&[], 100.0), None);
    }
}
