/// Counts of values between consecutive thresholds.
///
/// With thresholds `t0 < t1 < ... < tk`, `counts` has `k + 2` entries:
/// values below `t0`, values in `[t0, t1)`, ..., and values `>= tk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdCounts {
    pub counts: Vec<usize>,
}

impl ThresholdCounts {
    /// # Panics
    ///
    /// Panics if `thresholds` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use floodit_stats::threshold::ThresholdCounts;
    /// let counts = ThresholdCounts::new([-3.0, 0.0, 0.5, 2.0, 7.0], &[0.0, 1.0, 2.0]);
    /// assert_eq!(counts.counts, vec![1, 2, 0, 2]);
    /// assert_eq!(counts.total(), 5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I, thresholds: &[f32]) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        assert!(
            thresholds.is_sorted_by(|a, b| a <= b),
            "thresholds must be sorted in ascending order"
        );
        let mut counts = vec![0; thresholds.len() + 1];
        for value in values {
            let bucket = thresholds.partition_point(|t| *t <= value);
            counts[bucket] += 1;
        }
        Self { counts }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
