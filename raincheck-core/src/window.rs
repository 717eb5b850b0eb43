//! Clipping an hourly series to a symmetric window around "now".

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::model::{HourlySeries, Metric};

/// Hours shown on each side of "now".
pub const DEFAULT_RADIUS: usize = 12;

/// A clipped view of an [`HourlySeries`].
///
/// `start_index`/`end_index` are absolute (half-open) positions in the source
/// series; every vector in `series` and `labels` has `end_index - start_index`
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
    /// Absolute index treated as "now". Zero when `now_pinpointed` is false.
    pub now_index: usize,
    /// Position of the "now" marker within the window.
    pub relative_now_index: usize,
    /// False when no timestamp matched the current hour and `now_index` is
    /// only the fallback. The marker is still placed at `relative_now_index`.
    pub now_pinpointed: bool,
    pub labels: Vec<String>,
    pub series: BTreeMap<Metric, Vec<Option<f64>>>,
}

/// Which chart the presentation layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Rain,
    Temp,
    Wind,
}

impl ChartKind {
    /// Primary metric (bars or main line) followed by an optional overlay.
    pub fn metrics(&self) -> (Metric, Option<Metric>) {
        match self {
            ChartKind::Rain => (Metric::Precipitation, Some(Metric::PrecipitationProbability)),
            ChartKind::Temp => (Metric::Temperature, None),
            ChartKind::Wind => (Metric::WindSpeed, None),
        }
    }
}

/// One plotted line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset<'a> {
    pub metric: Metric,
    pub unit: &'static str,
    pub values: &'a [Option<f64>],
}

impl Window {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn values(&self, metric: Metric) -> Option<&[Option<f64>]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    /// The datasets a chart of `kind` shows. Metrics the feed did not return
    /// are left out.
    pub fn dataset(&self, kind: ChartKind) -> Vec<Dataset<'_>> {
        let (primary, overlay) = kind.metrics();
        std::iter::once(primary)
            .chain(overlay)
            .filter_map(|metric| {
                self.values(metric).map(|values| Dataset { metric, unit: metric.unit(), values })
            })
            .collect()
    }
}

/// Build the window of at most `2 * radius` hours around `now`.
///
/// `now` must be expressed in the series' own local time; no timezone
/// conversion happens here. Never fails: if no timestamp matches the current
/// hour the window is anchored at index 0 and `now_pinpointed` is false.
/// Precipitation after "now" is blanked so forecast rain is never drawn as
/// observed rain; the other metrics pass through untouched.
pub fn align(series: &HourlySeries, now: NaiveDateTime, radius: usize) -> Window {
    let located = series.index_of_hour(now);
    let now_index = located.unwrap_or(0);

    let start_index = now_index.saturating_sub(radius);
    let end_index = series.len().min(now_index.saturating_add(radius)).max(start_index);

    let labels: Vec<String> = series.timestamps()[start_index..end_index]
        .iter()
        .map(|t| format!("{}:00", t.hour()))
        .collect();

    let windowed: BTreeMap<Metric, Vec<Option<f64>>> = series
        .metrics()
        .map(|(metric, values)| {
            let slice = values[start_index..end_index].iter().enumerate();
            let clipped: Vec<Option<f64>> = match metric {
                Metric::Precipitation => slice
                    .map(|(j, v)| if start_index + j > now_index { None } else { *v })
                    .collect(),
                _ => slice.map(|(_, v)| *v).collect(),
            };
            (metric, clipped)
        })
        .collect();

    Window {
        start_index,
        end_index,
        now_index,
        relative_now_index: now_index - start_index,
        now_pinpointed: located.is_some(),
        labels,
        series: windowed,
    }
}

/// Precipitation recorded for the hour containing `now`.
///
/// Falls back to 0 when the hour is not in the series or has no value, the
/// way the "rain in the last hour" tile reads it.
pub fn rain_in_current_hour(series: &HourlySeries, now: NaiveDateTime) -> f64 {
    series
        .index_of_hour(now)
        .and_then(|i| series.metric(Metric::Precipitation).and_then(|rain| rain[i]))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, hours, series};
    use chrono::Duration;

    #[test]
    fn centred_window_on_72_hour_series() {
        let s = series(72);
        let window = align(&s, at(2, 0), DEFAULT_RADIUS);

        assert_eq!(window.start_index, 12);
        assert_eq!(window.end_index, 36);
        assert_eq!(window.now_index, 24);
        assert_eq!(window.relative_now_index, 12);
        assert!(window.now_pinpointed);
        assert_eq!(window.len(), 24);
        assert_eq!(window.labels.len(), 24);
        for values in window.series.values() {
            assert_eq!(values.len(), 24);
        }
    }

    #[test]
    fn minutes_within_the_hour_still_match() {
        let s = series(72);
        let window = align(&s, at(2, 7) + Duration::minutes(59), DEFAULT_RADIUS);
        assert_eq!(window.now_index, 31);
    }

    #[test]
    fn labels_are_unpadded_hours() {
        let s = series(72);
        let window = align(&s, at(2, 0), DEFAULT_RADIUS);

        assert_eq!(window.labels.first().map(String::as_str), Some("12:00"));
        assert_eq!(window.labels[12], "0:00");
        assert_eq!(window.labels.last().map(String::as_str), Some("11:00"));
    }

    #[test]
    fn future_precipitation_is_blanked() {
        let s = series(72);
        let window = align(&s, at(2, 0), DEFAULT_RADIUS);
        let rain = window.values(Metric::Precipitation).expect("rain present");

        for (j, value) in rain.iter().enumerate() {
            if window.start_index + j > window.now_index {
                assert_eq!(*value, None, "index {j} should be hidden");
            } else {
                assert_eq!(*value, Some((window.start_index + j) as f64));
            }
        }
    }

    #[test]
    fn other_metrics_pass_through() {
        let s = series(72);
        let window = align(&s, at(2, 0), DEFAULT_RADIUS);

        for metric in [Metric::PrecipitationProbability, Metric::Temperature, Metric::WindSpeed] {
            let expected: Vec<Option<f64>> = (12..36).map(|i| Some(i as f64)).collect();
            assert_eq!(window.values(metric), Some(expected.as_slice()));
        }
    }

    #[test]
    fn clips_at_start_of_series() {
        let s = series(72);
        let window = align(&s, at(1, 3), DEFAULT_RADIUS);

        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, 15);
        assert_eq!(window.relative_now_index, 3);
    }

    #[test]
    fn clips_at_end_of_series() {
        let s = series(72);
        let window = align(&s, at(3, 20), DEFAULT_RADIUS);

        assert_eq!(window.now_index, 68);
        assert_eq!(window.start_index, 56);
        assert_eq!(window.end_index, 72);
        assert_eq!(window.len(), 16);
    }

    #[test]
    fn unmatched_now_falls_back_to_first_index() {
        let s = series(72);
        let window = align(&s, at(20, 12), DEFAULT_RADIUS);

        assert!(!window.now_pinpointed);
        assert_eq!(window.now_index, 0);
        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, 12);
        assert_eq!(window.relative_now_index, 0);
    }

    #[test]
    fn empty_series_gives_empty_window() {
        let window = align(&HourlySeries::default(), at(1, 0), DEFAULT_RADIUS);

        assert!(window.is_empty());
        assert!(window.labels.is_empty());
        assert!(!window.now_pinpointed);
    }

    #[test]
    fn absent_metrics_stay_absent() {
        let s = HourlySeries::new(hours(48))
            .with_metric(Metric::Temperature, vec![Some(20.0); 48])
            .expect("aligned");
        let window = align(&s, at(1, 20), DEFAULT_RADIUS);

        assert!(window.values(Metric::Precipitation).is_none());
        assert_eq!(window.series.len(), 1);
    }

    #[test]
    fn huge_radius_covers_whole_series() {
        let s = series(72);
        let window = align(&s, at(2, 0), usize::MAX);

        assert_eq!(window.start_index, 0);
        assert_eq!(window.end_index, 72);
        assert_eq!(window.relative_now_index, 24);
        assert_eq!(window.labels.len(), 72);
    }

    #[test]
    fn align_is_idempotent() {
        let s = series(72);
        assert_eq!(align(&s, at(2, 9), 6), align(&s, at(2, 9), 6));
    }

    #[test]
    fn index_invariants_hold_for_every_hour() {
        let s = series(72);
        for offset in 0..80 {
            let now = at(1, 0) + Duration::hours(offset);
            let window = align(&s, now, DEFAULT_RADIUS);

            assert!(window.start_index <= window.now_index);
            assert!(window.now_index <= window.end_index);
            assert!(window.end_index <= s.len());
            assert!(window.len() <= 2 * DEFAULT_RADIUS);
            for values in window.series.values() {
                assert_eq!(values.len(), window.len());
            }
        }
    }

    #[test]
    fn rain_dataset_overlays_probability() {
        let s = series(72);
        let window = align(&s, at(2, 0), DEFAULT_RADIUS);

        let rain = window.dataset(ChartKind::Rain);
        assert_eq!(rain.len(), 2);
        assert_eq!(rain[0].metric, Metric::Precipitation);
        assert_eq!(rain[0].unit, "mm");
        assert_eq!(rain[1].unit, "%");

        let wind = window.dataset(ChartKind::Wind);
        assert_eq!(wind.len(), 1);
        assert_eq!(wind[0].unit, "km/h");
    }

    #[test]
    fn current_hour_rain_defaults_to_zero() {
        let s = HourlySeries::new(hours(3))
            .with_metric(Metric::Precipitation, vec![Some(0.2), None, Some(1.5)])
            .expect("aligned");

        assert_eq!(rain_in_current_hour(&s, at(1, 2)), 1.5);
        assert_eq!(rain_in_current_hour(&s, at(1, 1)), 0.0);
        assert_eq!(rain_in_current_hour(&s, at(5, 1)), 0.0);
        assert_eq!(rain_in_current_hour(&HourlySeries::new(hours(3)), at(1, 0)), 0.0);
    }
}
