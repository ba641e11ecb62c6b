// Small numeric helpers shared across the analysis stages.

/// Round to one decimal place (half away from zero).
pub fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Median of `values`; the mean of the two middle values for an even count.
/// Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_count() {
        assert_eq!(median(&[35.0, 40.0, 45.0]), 40.0);
        assert_eq!(median(&[45.0, 35.0, 40.0]), 40.0);
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        assert_eq!(median(&[10.0, 40.0, 20.0, 30.0]), 25.0);
        assert_eq!(median(&[1.0, 2.0]), 1.5);
    }

    #[test]
    fn median_edge_cases() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[7.5]), 7.5);
    }

    #[test]
    fn round_tenth_behaviour() {
        assert_eq!(round_tenth(55.56), 55.6);
        assert_eq!(round_tenth(-2.04), -2.0);
        assert_eq!(round_tenth(3.0), 3.0);
    }
}
