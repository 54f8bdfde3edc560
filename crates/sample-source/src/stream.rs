//! Paced Sample Replay

use crate::table::{FeatureTable, Sample};
use std::time::Duration;
use tracing::debug;

/// Bounded replay of a feature table
pub struct SampleSource {
    table: FeatureTable,
    max_samples: usize,
    delay: Duration,
}

impl SampleSource {
    /// Replay at most `max_samples` rows of `table`, without pacing
    pub fn new(table: FeatureTable, max_samples: usize) -> Self {
        Self {
            table,
            max_samples,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before yielding each sample after the first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of samples the replay will produce
    pub fn len(&self) -> usize {
        self.max_samples.min(self.table.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the paced replay
    pub fn stream(self) -> SampleStream {
        let limit = self.len();
        debug!("Streaming {} samples with {:?} delay", limit, self.delay);
        SampleStream {
            table: self.table,
            limit,
            next_index: 0,
            delay: self.delay,
        }
    }
}

impl IntoIterator for SampleSource {
    type Item = (usize, Sample);
    type IntoIter = Samples;

    /// Unpaced replay; the configured delay is ignored
    fn into_iter(self) -> Samples {
        let limit = self.len();
        Samples {
            table: self.table,
            limit,
            next_index: 0,
        }
    }
}

/// Single-use async replay produced by [`SampleSource::stream`]
pub struct SampleStream {
    table: FeatureTable,
    limit: usize,
    next_index: usize,
    delay: Duration,
}

impl SampleStream {
    /// Yield the next (index, sample) pair, sleeping first unless it is
    /// the first one. Returns `None` once the bound is reached.
    pub async fn next_sample(&mut self) -> Option<(usize, Sample)> {
        if self.next_index >= self.limit {
            return None;
        }

        if self.next_index > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let index = self.next_index;
        self.next_index += 1;
        self.table.sample(index).map(|s| (index, s))
    }

    /// Samples not yet yielded
    pub fn remaining(&self) -> usize {
        self.limit - self.next_index
    }

    /// Total samples this stream yields
    pub fn total(&self) -> usize {
        self.limit
    }
}

/// Unpaced iterator over a bounded replay
pub struct Samples {
    table: FeatureTable,
    limit: usize,
    next_index: usize,
}

impl Iterator for Samples {
    type Item = (usize, Sample);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.limit {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.table.sample(index).map(|s| (index, s))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.limit - self.next_index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Samples {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::time::Instant;

    fn table(rows: usize) -> FeatureTable {
        FeatureTable::new(
            vec!["x".to_string(), "y".to_string()],
            (0..rows).map(|i| vec![i as f64, -(i as f64)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_bounded_by_max_samples() {
        let indices: Vec<usize> = SampleSource::new(table(10), 4)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bounded_by_table_length() {
        let source = SampleSource::new(table(3), 150);
        assert_eq!(source.len(), 3);
        let samples: Vec<_> = source.into_iter().collect();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].1.get("x"), Some(2.0));
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let source = SampleSource::new(table(0), 50);
        assert!(source.is_empty());
        assert_eq!(source.into_iter().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_samples_only() {
        let mut stream = SampleSource::new(table(3), 3)
            .with_delay(Duration::from_millis(500))
            .stream();

        let start = Instant::now();
        let (first, _) = stream.next_sample().await.unwrap();
        assert_eq!(first, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);

        stream.next_sample().await.unwrap();
        stream.next_sample().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1000));

        // Exhaustion does not wait
        assert!(stream.next_sample().await.is_none());
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
        assert_eq!(stream.remaining(), 0);
    }

    proptest! {
        #[test]
        fn prop_count_is_min_of_bound_and_length(rows in 0usize..40, max in 0usize..60) {
            let produced = SampleSource::new(table(rows), max).into_iter().count();
            prop_assert_eq!(produced, rows.min(max));
        }
    }
}
