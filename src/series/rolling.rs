//! Trailing moving averages.

use crate::series::SeriesMap;

/// Trailing moving average over `values`.
///
/// Index `i` averages `values[max(0, i + 1 - window)..=i]`: the window expands
/// over the first `window - 1` points and rolls afterwards. The output has the
/// input's length; a zero window yields all `None`.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let n = (i + 1).min(window);
        out.push(Some(sum / n as f64));
    }
    out
}

/// Rolling average of a series, keyed by the source dates.
pub fn rolling_average_series(series: &SeriesMap, window: usize) -> SeriesMap {
    let averaged = rolling_average(&series.values(), window);
    series
        .dates()
        .zip(averaged)
        .filter_map(|(d, v)| v.map(|v| (d, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn expanding_then_rolling() {
        let out = rolling_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out, vec![Some(1.0), Some(1.5), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn window_larger_than_input_is_cumulative_mean() {
        let out = rolling_average(&[2.0, 4.0], 10);
        assert_eq!(out, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn zero_window_and_empty_input() {
        assert_eq!(rolling_average(&[1.0, 2.0], 0), vec![None, None]);
        assert!(rolling_average(&[], 5).is_empty());
    }

    #[test]
    fn series_average_keeps_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let map: SeriesMap = [(d(2), 10.0), (d(3), 20.0), (d(5), 30.0)].into_iter().collect();
        let avg = rolling_average_series(&map, 2);
        assert_eq!(avg.iter().collect::<Vec<_>>(), vec![(d(2), 10.0), (d(3), 15.0), (d(5), 25.0)]);
    }

    proptest! {
        #[test]
        fn matches_naive_window_mean(
            values in prop::collection::vec(-1_000.0f64..1_000.0, 0..60),
            window in 1usize..12,
        ) {
            let out = rolling_average(&values, window);
            prop_assert_eq!(out.len(), values.len());
            for (i, got) in out.iter().enumerate() {
                let start = (i + 1).saturating_sub(window);
                let slice = &values[start..=i];
                let want = slice.iter().sum::<f64>() / slice.len() as f64;
                prop_assert!((got.unwrap() - want).abs() < 1e-6);
            }
        }
    }
}
