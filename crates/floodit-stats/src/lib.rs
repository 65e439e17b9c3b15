//! Statistics used to summarize training runs.
//!
//! - [`descriptive`]: min, max, mean, median and spread of a dataset
//! - [`threshold`]: counts of values falling between fixed thresholds
//!
//! # Examples
//!
//! ```
//! use floodit_stats::{descriptive::DescriptiveStats, threshold::ThresholdCounts};
//!
//! let values = [-1.0, 0.5, 1.5, 3.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.median, 1.0);
//!
//! let counts = ThresholdCounts::new(values, &[0.0, 1.0, 2.0]);
//! assert_eq!(counts.counts, vec![1, 1, 1, 1]);
//! ```

pub mod descriptive;
pub mod threshold;
