/// Descriptive statistics summarizing a dataset of `f32` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values.
    pub count: usize,
    pub min: f32,
    pub max: f32,
    /// Arithmetic mean.
    pub mean: f32,
    /// Middle value; the average of the two middle values for even counts.
    pub median: f32,
    /// Population variance.
    pub variance: f32,
    pub std_dev: f32,
    /// Fraction of values strictly greater than zero.
    pub positive_fraction: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// Returns `None` for an empty dataset.
    ///
    /// # Examples
    ///
    /// ```
    /// # use floodit_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 4.0);
    /// assert_eq!(stats.mean, 2.5);
    /// assert_eq!(stats.median, 2.5);
    /// assert_eq!(stats.positive_fraction, 1.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from values sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let mean = sorted_values.iter().copied().sum::<f32>() / n;
        let half = count / 2;
        let median = if count % 2 == 0 {
            (sorted_values[half - 1] + sorted_values[half]) / 2.0
        } else {
            sorted_values[half]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let positive = sorted_values.iter().filter(|v| **v > 0.0).count();

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
            positive_fraction: positive as f32 / n,
        })
    }
}
