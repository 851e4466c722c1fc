//! PERT three-point duration estimation.

/// Round `x` to one decimal place, ties away from zero.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Estimate an activity's duration from a three-point (low, likely, high)
/// estimate.
///
/// When both `likely` and `high` are positive, the standard PERT weighting
/// `(low + 4*likely + high) / 6` applies (`low` may legitimately be zero).
/// When exactly one of `likely`/`high` is missing (represented as `0.0`),
/// the estimate falls back to the mean of `low` and whichever of the two is
/// positive. When all three inputs are zero the duration is zero.
pub fn estimate_duration(low: f64, likely: f64, high: f64) -> f64 {
    if likely > 0.0 && high > 0.0 {
        return round1((low + 4.0 * likely + high) / 6.0);
    }
    if likely == 0.0 && high == 0.0 {
        return 0.0;
    }
    let mut values = vec![low];
    if likely > 0.0 {
        values.push(likely);
    }
    if high > 0.0 {
        values.push(high);
    }
    round1(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pert_weighting() {
        assert_eq!(estimate_duration(10.0, 20.0, 30.0), 20.0);
        assert_eq!(estimate_duration(40.0, 80.0, 90.0), 75.0);
    }

    #[test]
    fn zero_low_is_allowed_in_standard_case() {
        assert_eq!(estimate_duration(0.0, 20.0, 30.0), round1((0.0 + 80.0 + 30.0) / 6.0));
    }

    #[test]
    fn missing_high_falls_back_to_mean() {
        assert_eq!(estimate_duration(2.0, 4.0, 0.0), 3.0);
    }

    #[test]
    fn missing_likely_falls_back_to_mean() {
        assert_eq!(estimate_duration(2.0, 0.0, 6.0), 4.0);
    }

    #[test]
    fn all_zero_is_zero_duration() {
        assert_eq!(estimate_duration(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn rounds_to_one_decimal_half_away_from_zero() {
        assert_eq!(round1(1.05), 1.1);
        assert_eq!(round1(-1.05), -1.1);
        assert_eq!(round1(1.049), 1.0);
    }
}
