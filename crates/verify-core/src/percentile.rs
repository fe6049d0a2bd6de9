//! 最近接順位間の線形補間によるパーセンタイル
//!
//! 過去のレポートと数値互換を保つため、nearest-rank など他の方式には変えないこと。

/// サンプルが無いときの表示
pub const NOT_APPLICABLE: &str = "N/A";

/// 昇順ソート済みの `sorted` に対する `p` パーセンタイル（0..=100）。
///
/// 空なら `None`。`p` は 0..=100 にクランプする。
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = *sorted.last()?;
    let k = (sorted.len() - 1) as f64 * (p.clamp(0.0, 100.0) / 100.0);
    let f = k.floor();
    let c = f + 1.0;
    let lower = f as usize;
    let upper = lower + 1;
    if upper >= sorted.len() {
        return Some(last);
    }
    Some(sorted[lower] * (c - k) + sorted[upper] * (k - f))
}

/// 任意順のサンプルを昇順に並べ替えて返す
pub fn sorted_samples(samples: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = samples.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values
}

/// p50 / p90 / p99
pub fn standard_percentiles(sorted: &[f64]) -> [Option<f64>; 3] {
    [50.0, 90.0, 99.0].map(|p| percentile(sorted, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_interpolates_between_middle_ranks() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 50.0), Some(2.0));
    }

    #[test]
    fn empty_samples_are_not_applicable() {
        for p in [0.0, 50.0, 99.0, 100.0] {
            assert_eq!(percentile(&[], p), None);
        }
    }

    #[test]
    fn single_sample_is_returned_for_any_percentile() {
        for p in [0.0, 1.0, 50.0, 90.0, 100.0] {
            assert_eq!(percentile(&[7.5], p), Some(7.5));
        }
    }

    #[test]
    fn upper_edge_returns_last_sample() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&sorted, 100.0), Some(50.0));
        assert_eq!(percentile(&sorted, 0.0), Some(10.0));
        // k = 4 * 0.9 = 3.6 → 40 * 0.4 + 50 * 0.6
        let p90 = percentile(&sorted, 90.0).unwrap();
        assert!((p90 - 46.0).abs() < 1e-9);
    }

    #[test]
    fn sorted_samples_orders_ascending_without_touching_input() {
        let raw = vec![3.0, -1.0, 2.5];
        let sorted = sorted_samples(raw.iter().copied());
        assert_eq!(sorted, vec![-1.0, 2.5, 3.0]);
        assert_eq!(raw, vec![3.0, -1.0, 2.5]);

        let [p50, p90, p99] = standard_percentiles(&sorted);
        assert_eq!(p50, Some(2.5));
        assert!(p90.unwrap() > 2.5 && p99.unwrap() <= 3.0);
    }
}
