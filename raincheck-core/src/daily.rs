use std::ops::Range;

use crate::model::{HourlySeries, Metric};

/// Hours summed as "today".
///
/// The forecast request asks for one past day followed by today and tomorrow,
/// so today is always hours 24..48 of the series. This is a positional
/// approximation, not a calendar-aware day boundary.
pub const TODAY: Range<usize> = 24..48;

/// Total precipitation expected today.
///
/// Missing hourly values count as no rain. Returns `None` only when the series
/// carries no precipitation metric at all.
pub fn daily_total(series: &HourlySeries) -> Option<f64> {
    let rain = series.metric(Metric::Precipitation)?;
    let end = TODAY.end.min(rain.len());
    let start = TODAY.start.min(end);

    Some(rain[start..end].iter().map(|v| v.unwrap_or(0.0)).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::hours;

    fn rain_series(values: Vec<Option<f64>>) -> HourlySeries {
        HourlySeries::new(hours(values.len()))
            .with_metric(Metric::Precipitation, values)
            .expect("aligned")
    }

    #[test]
    fn sums_the_second_day() {
        let mut values = vec![Some(5.0); 24];
        values.extend(vec![Some(1.0); 24]);

        assert_eq!(daily_total(&rain_series(values)), Some(24.0));
    }

    #[test]
    fn ignores_yesterday_and_tomorrow() {
        let mut values = vec![Some(9.0); 24];
        values.extend(vec![Some(0.5); 24]);
        values.extend(vec![Some(9.0); 24]);

        assert_eq!(daily_total(&rain_series(values)), Some(12.0));
    }

    #[test]
    fn missing_values_count_as_zero() {
        let mut values = vec![None; 24];
        values.extend((0..24).map(|i| if i % 2 == 0 { Some(1.0) } else { None }));

        assert_eq!(daily_total(&rain_series(values)), Some(12.0));
    }

    #[test]
    fn short_series_is_clipped() {
        assert_eq!(daily_total(&rain_series(vec![Some(1.0); 30])), Some(6.0));
        assert_eq!(daily_total(&rain_series(vec![Some(1.0); 10])), Some(0.0));
    }

    #[test]
    fn absent_metric_cannot_be_totalled() {
        assert_eq!(daily_total(&HourlySeries::new(hours(48))), None);
    }

    #[test]
    fn non_negative_input_gives_non_negative_total() {
        let values = (0..72).map(|i| Some(f64::from(i % 7) * 0.3)).collect();
        let total = daily_total(&rain_series(values)).expect("rain present");
        assert!(total >= 0.0);
    }
}
