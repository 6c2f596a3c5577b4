//! Median of a set of samples

/// Median of `values`, or `None` when there are none
///
/// An even count yields the mean of the two middle values. Values must not
/// be NaN; masking removes them beforehand.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    let count = values.len();
    if count == 0 {
        return None;
    }

    let middle = count / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(middle, f64::total_cmp);
    let upper = *upper;

    if count % 2 == 1 {
        return Some(upper);
    }

    // Everything left of the partition point is <= upper; its maximum is
    // the other middle value.
    let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((below + upper) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_count() {
        assert_eq!(median(vec![0.9, 0.3, 0.6]), Some(0.6));
        assert_eq!(median(vec![42.0]), Some(42.0));
    }

    #[test]
    fn test_even_count_interpolates() {
        assert_eq!(median(vec![0.8, 0.2, 0.6, 0.4]), Some(0.5));
        assert_eq!(median(vec![1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_duplicates() {
        assert_eq!(median(vec![5.0, 5.0, 1.0, 5.0]), Some(5.0));
    }

    #[test]
    fn test_empty_is_undefined() {
        assert_eq!(median(Vec::new()), None);
    }
}
