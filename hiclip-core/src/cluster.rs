//! Burst detection over keyword timestamps
//!
//! Timestamps are grouped by gap: after sorting, a new cluster starts wherever
//! two neighbours are more than `distance_threshold` seconds apart. In one
//! dimension this is exactly single-linkage clustering cut at the threshold.
//!
//! ```text
//! 10 12 15 ........ 70 71 73 ................ 200
//! └──────── gaps ≤ 60 ──────┘   gap 127 > 60   └─ alone
//! ```
//!
//! Clusters smaller than `min_reports` are dropped. Each survivor is reduced to
//! a [`HighlightEvent`] whose representative time is its **second-smallest**
//! member, so a single early outlier does not pull the clip start forward.

use crate::error::{Error, Result};
use crate::types::{HighlightEvent, Timestamp};

/// Default maximum gap between neighbouring hits of one burst.
pub const DEFAULT_DISTANCE_THRESHOLD: Timestamp = 60;

/// Default minimum number of hits for a burst to count.
pub const DEFAULT_MIN_REPORTS: usize = 3;

/// Gap-threshold clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeClusterer {
    distance_threshold: Timestamp,
    min_reports: usize,
}

impl Default for TimeClusterer {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            min_reports: DEFAULT_MIN_REPORTS,
        }
    }
}

impl TimeClusterer {
    /// Create a clusterer.
    ///
    /// `min_reports` must be at least 1 and the threshold non-negative.
    pub fn new(distance_threshold: Timestamp, min_reports: usize) -> Result<Self> {
        if min_reports == 0 {
            return Err(Error::Config("min_reports must be at least 1".to_string()));
        }
        if distance_threshold < 0 {
            return Err(Error::Config(
                "distance_threshold_secs must not be negative".to_string(),
            ));
        }
        Ok(Self {
            distance_threshold,
            min_reports,
        })
    }

    pub fn distance_threshold(&self) -> Timestamp {
        self.distance_threshold
    }

    pub fn min_reports(&self) -> usize {
        self.min_reports
    }

    /// Threshold as an unsigned gap; the constructor keeps it non-negative.
    fn max_gap(&self) -> u64 {
        self.distance_threshold.unsigned_abs()
    }

    /// Split timestamps into maximal runs with every neighbour gap within the threshold.
    ///
    /// Each cluster is sorted and clusters are in ascending order. The result
    /// covers every input exactly once; empty input gives no clusters.
    pub fn partition(&self, timestamps: &[Timestamp]) -> Vec<Vec<Timestamp>> {
        let mut sorted = timestamps.to_vec();
        sorted.sort_unstable();

        let mut clusters: Vec<Vec<Timestamp>> = Vec::new();
        for t in sorted {
            match clusters.last_mut() {
                Some(current)
                    if current
                        .last()
                        .is_some_and(|&prev| t.abs_diff(prev) <= self.max_gap()) =>
                {
                    current.push(t)
                }
                _ => clusters.push(vec![t]),
            }
        }
        clusters
    }

    /// Find highlight events, sorted by representative time.
    ///
    /// Empty input is [`Error::NoMatchingEvents`]; input where no cluster
    /// reaches `min_reports` gives an empty list.
    pub fn highlights(&self, timestamps: &[Timestamp]) -> Result<Vec<HighlightEvent>> {
        if timestamps.is_empty() {
            return Err(Error::NoMatchingEvents { matcher: None });
        }

        let clusters = self.partition(timestamps);
        let total_clusters = clusters.len();

        let mut events: Vec<HighlightEvent> = clusters
            .into_iter()
            .filter(|c| c.len() >= self.min_reports)
            .map(|c| HighlightEvent {
                representative_time: representative(&c),
                member_count: c.len(),
            })
            .collect();
        events.sort();

        tracing::info!(
            timestamps = timestamps.len(),
            clusters = total_clusters,
            highlights = events.len(),
            distance_threshold = self.distance_threshold,
            min_reports = self.min_reports,
            "Clustered keyword timestamps"
        );
        Ok(events)
    }
}

/// Second-smallest member of a sorted, non-empty cluster.
///
/// A single-member cluster (only kept when `min_reports == 1`) is its own
/// representative.
fn representative(sorted_cluster: &[Timestamp]) -> Timestamp {
    sorted_cluster
        .get(1)
        .or_else(|| sorted_cluster.first())
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusterer(threshold: Timestamp, min_reports: usize) -> TimeClusterer {
        TimeClusterer::new(threshold, min_reports).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let c = clusterer(60, 3);
        let ts = [10, 12, 15, 70, 71, 73, 200];

        assert_eq!(
            c.partition(&ts),
            vec![vec![10, 12, 15, 70, 71, 73], vec![200]]
        );
        assert_eq!(
            c.highlights(&ts).unwrap(),
            vec![HighlightEvent {
                representative_time: 12,
                member_count: 6
            }]
        );
    }

    #[test]
    fn test_partition_sorts_unordered_input() {
        let c = clusterer(5, 1);
        assert_eq!(
            c.partition(&[30, 1, 100, 3, 28]),
            vec![vec![1, 3], vec![28, 30], vec![100]]
        );
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_together() {
        let c = clusterer(60, 1);
        assert_eq!(c.partition(&[0, 60, 121]), vec![vec![0, 60], vec![121]]);
    }

    #[test]
    fn test_zero_threshold_groups_duplicates_only() {
        let c = clusterer(0, 1);
        assert_eq!(
            c.partition(&[5, 5, 6, 6, 6]),
            vec![vec![5, 5], vec![6, 6, 6]]
        );
    }

    #[test]
    fn test_partition_property() {
        let ts: Vec<Timestamp> = vec![900, 3, 5, 61, 400, 401, 402, 460, 2000, 1999, 7, 7];
        let c = clusterer(50, 1);
        let clusters = c.partition(&ts);

        // Union is the input, each element once
        let mut flat: Vec<Timestamp> = clusters.iter().flatten().copied().collect();
        let mut sorted = ts.clone();
        sorted.sort();
        flat.sort();
        assert_eq!(flat, sorted);

        for cluster in &clusters {
            assert!(!cluster.is_empty());
            for pair in cluster.windows(2) {
                assert!(pair[1] - pair[0] <= 50);
            }
        }
        for pair in clusters.windows(2) {
            let gap = pair[1].first().unwrap() - pair[0].last().unwrap();
            assert!(gap > 50);
        }
    }

    #[test]
    fn test_threshold_guarantee_and_monotonicity() {
        let ts: Vec<Timestamp> = vec![
            1000, 1001, 1002, // 3
            10, 11, // 2
            5000, 5010, 5020, 5030, // 4
            300, 301, 302, 303, 304, // 5
        ];
        let events = clusterer(30, 3).highlights(&ts).unwrap();

        assert_eq!(
            events.iter().map(|e| e.member_count).collect::<Vec<_>>(),
            vec![5, 3, 4]
        );
        assert!(events.iter().all(|e| e.member_count >= 3));
        assert_eq!(
            events
                .iter()
                .map(|e| e.representative_time)
                .collect::<Vec<_>>(),
            vec![301, 1001, 5010]
        );
    }

    #[test]
    fn test_no_surviving_cluster_is_empty_not_error() {
        let events = clusterer(60, 3).highlights(&[10, 500, 1000]).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let err = clusterer(60, 3).highlights(&[]).unwrap_err();
        assert!(matches!(err, Error::NoMatchingEvents { matcher: None }));
        assert_eq!(err.to_string(), "no chat messages matched");
        assert!(clusterer(60, 3).partition(&[]).is_empty());
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let c = clusterer(60, 1);
        let ts = [Timestamp::MAX, -Timestamp::MAX, Timestamp::MIN, 0];

        assert_eq!(
            c.partition(&ts),
            vec![
                vec![Timestamp::MIN, -Timestamp::MAX],
                vec![0],
                vec![Timestamp::MAX]
            ]
        );
        assert_eq!(c.highlights(&ts).unwrap().len(), 3);
    }

    #[test]
    fn test_extreme_parsed_times_cluster_apart() {
        let far_future = crate::timecode::parse_duration("9223372036854775807").unwrap();
        let far_past = crate::timecode::parse_duration("-9223372036854775807").unwrap();

        let events = clusterer(60, 1).highlights(&[far_future, far_past]).unwrap();
        assert_eq!(
            events.iter().map(|e| e.representative_time).collect::<Vec<_>>(),
            vec![far_past, far_future]
        );
    }

    #[test]
    fn test_single_member_cluster_with_min_reports_one() {
        let events = clusterer(60, 1).highlights(&[42]).unwrap();
        assert_eq!(
            events,
            vec![HighlightEvent {
                representative_time: 42,
                member_count: 1
            }]
        );
    }

    #[test]
    fn test_representative_is_second_smallest_with_duplicates() {
        let events = clusterer(60, 2).highlights(&[20, 20, 25]).unwrap();
        assert_eq!(events[0].representative_time, 20);
    }

    #[test]
    fn test_deterministic_under_input_order() {
        let c = clusterer(60, 2);
        let a = c.highlights(&[400, 10, 20, 401, 30]).unwrap();
        let b = c.highlights(&[30, 401, 20, 10, 400]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_new_validates() {
        assert!(matches!(TimeClusterer::new(60, 0), Err(Error::Config(_))));
        assert!(matches!(TimeClusterer::new(-1, 3), Err(Error::Config(_))));
        let c = TimeClusterer::default();
        assert_eq!(c.distance_threshold(), 60);
        assert_eq!(c.min_reports(), 3);
    }
}
