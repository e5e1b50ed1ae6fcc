//! Cumulative growth curves over a fixed discrete timeline.

use serde::{Deserialize, Serialize};

/// Number of timeline points every simulator comparison uses.
pub const DEFAULT_TIMELINE_LEN: usize = 600;

/// Threshold step between consecutive timeline points.
pub const DEFAULT_BUCKET_WIDTH_MS: i64 = 1000;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    points: Vec<i64>,
}

impl Timeline {
    pub fn new(len: usize) -> Self {
        Self {
            points: (0..len as i64).collect(),
        }
    }

    pub fn points(&self) -> &[i64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_LEN)
    }
}

/// One value per timeline point.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Deref, From, Into)]
pub struct GrowthSeries(Vec<u64>);

/// Count events before each timeline threshold, then scale.
///
/// Point `n` holds `scale * |{ t : t < bucket_width_ms * n }|`. The comparison
/// is strict, so an event at time 0 is never counted at point 0. Scaled
/// counts saturate at `u64::MAX`, which keeps the curve non-decreasing.
pub fn aggregate(
    series: &[i64],
    scale: u64,
    timeline: &Timeline,
    bucket_width_ms: i64,
) -> GrowthSeries {
    let mut sorted = series.to_vec();
    sorted.sort_unstable();

    timeline
        .points()
        .iter()
        .map(|&n| {
            let threshold = bucket_width_ms.saturating_mul(n);
            let below = sorted.partition_point(|&t| t < threshold);
            scale.saturating_mul(below as u64)
        })
        .collect::<Vec<_>>()
        .into()
}

/// The expected-growth reference line: `value` at every point.
pub fn baseline(value: u64, timeline: &Timeline) -> GrowthSeries {
    GrowthSeries(vec![value; timeline.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{normalize_values, MILLIS_PER_SECOND};

    fn is_non_decreasing(values: &[u64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn default_timeline() {
        let timeline = Timeline::default();
        assert_eq!(timeline.len(), 600);
        assert_eq!(timeline.points()[0], 0);
        assert_eq!(timeline.points()[599], 599);
    }

    #[test]
    fn first_point_is_zero_after_normalization() {
        let series = normalize_values(vec![1000, 2500, 4000], MILLIS_PER_SECOND).unwrap();
        let growth = aggregate(series.times(), 1, &Timeline::new(5), DEFAULT_BUCKET_WIDTH_MS);
        assert_eq!(growth.len(), 5);
        assert_eq!(growth[0], 0);
        // {0, 1, 3} all fall below the 1000 threshold of point 1.
        assert_eq!(&growth[..], &[0, 3, 3, 3, 3]);
    }

    #[test]
    fn strict_threshold() {
        let growth = aggregate(&[0, 10, 20, 20, 35], 1, &Timeline::new(5), 10);
        assert_eq!(&growth[..], &[0, 1, 2, 4, 5]);
    }

    #[test]
    fn monotonic_and_bounded() {
        let times: Vec<i64> = (0..2000).map(|i| (i * 7919) % 500_000).collect();
        let growth = aggregate(&times, 1, &Timeline::default(), DEFAULT_BUCKET_WIDTH_MS);
        assert!(is_non_decreasing(&growth));
        assert_eq!(*growth.last().unwrap(), 2000);
    }

    #[test]
    fn scaling_is_linear() {
        let times = [0, 400, 1200, 1300, 2999, 4000];
        let timeline = Timeline::new(8);
        let once = aggregate(&times, 3, &timeline, 500);
        let scaled = aggregate(&times, 4 * 3, &timeline, 500);
        let expected: Vec<u64> = once.iter().map(|v| v * 4).collect();
        assert_eq!(&scaled[..], &expected[..]);
        assert!(is_non_decreasing(&scaled));
    }

    #[test]
    fn huge_scale_saturates() {
        let growth = aggregate(&[0, 0, 1500], u64::MAX, &Timeline::new(3), DEFAULT_BUCKET_WIDTH_MS);
        assert_eq!(&growth[..], &[0, u64::MAX, u64::MAX]);
        assert!(is_non_decreasing(&growth));

        let growth = aggregate(&[0, 1500], u64::MAX / 2 + 1, &Timeline::new(3), DEFAULT_BUCKET_WIDTH_MS);
        assert_eq!(&growth[..], &[0, u64::MAX / 2 + 1, u64::MAX]);
    }

    #[test]
    fn order_does_not_matter() {
        let timeline = Timeline::new(10);
        let a = aggregate(&[5, 1, 9, 0, 3], 1, &timeline, 2);
        let b = aggregate(&[0, 1, 3, 5, 9], 1, &timeline, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_series_gives_zeros() {
        let growth = aggregate(&[], 4, &Timeline::new(6), DEFAULT_BUCKET_WIDTH_MS);
        assert_eq!(Vec::from(growth), vec![0; 6]);
    }

    #[test]
    fn baseline_is_constant() {
        let line = baseline(500, &Timeline::new(5));
        assert_eq!(Vec::from(line), vec![500; 5]);
        assert!(baseline(400, &Timeline::new(0)).is_empty());
    }
}
