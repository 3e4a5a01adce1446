//! Small numeric helpers shared by calibration and refinement.

/// Median of integer samples, truncated toward zero.
///
/// Even-length inputs average the two middle values before truncation.
/// Returns `None` for an empty slice.
pub(crate) fn median_truncated(values: &[usize]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    }
}

/// Offsets `value` by `delta` and clamps the result to `[0, max]`.
pub(crate) fn offset_clamped(value: usize, delta: i64, max: usize) -> usize {
    let shifted = value as i64 + delta;
    shifted.clamp(0, max as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::{median_truncated, offset_clamped};

    #[test]
    fn median_of_odd_count_is_middle_value() {
        assert_eq!(median_truncated(&[27, 24, 25]), Some(25));
    }

    #[test]
    fn median_of_even_count_truncates_mean() {
        assert_eq!(median_truncated(&[24, 25]), Some(24));
        assert_eq!(median_truncated(&[26, 24, 28, 29]), Some(27));
    }

    #[test]
    fn median_of_empty_is_none() {
        assert_eq!(median_truncated(&[]), None);
    }

    #[test]
    fn offset_clamps_both_ends() {
        assert_eq!(offset_clamped(3, -10, 100), 0);
        assert_eq!(offset_clamped(95, 10, 100), 100);
        assert_eq!(offset_clamped(50, -4, 100), 46);
    }
}
