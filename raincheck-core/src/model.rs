use std::{collections::BTreeMap, fmt};

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    /// "Name, Country", or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Hourly metrics the forecast feed can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Precipitation,
    PrecipitationProbability,
    Temperature,
    WindSpeed,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Precipitation => "precipitation",
            Metric::PrecipitationProbability => "precipitation_probability",
            Metric::Temperature => "temperature",
            Metric::WindSpeed => "wind_speed",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Precipitation => "mm",
            Metric::PrecipitationProbability => "%",
            Metric::Temperature => "°C",
            Metric::WindSpeed => "km/h",
        }
    }

    pub const fn all() -> &'static [Metric] {
        &[
            Metric::Precipitation,
            Metric::PrecipitationProbability,
            Metric::Temperature,
            Metric::WindSpeed,
        ]
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index-aligned hourly measurements.
///
/// Every metric vector has exactly one entry per timestamp; the only way to
/// add a metric is through [`HourlySeries::with_metric`], which checks this.
/// A metric the feed did not return is absent, not zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlySeries {
    timestamps: Vec<NaiveDateTime>,
    metrics: BTreeMap<Metric, Vec<Option<f64>>>,
}

impl HourlySeries {
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self { timestamps, metrics: BTreeMap::new() }
    }

    pub fn with_metric(
        mut self,
        metric: Metric,
        values: Vec<Option<f64>>,
    ) -> Result<Self, SeriesError> {
        if values.len() != self.timestamps.len() {
            return Err(SeriesError::LengthMismatch {
                metric,
                expected: self.timestamps.len(),
                found: values.len(),
            });
        }
        self.metrics.insert(metric, values);
        Ok(self)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn metric(&self, metric: Metric) -> Option<&[Option<f64>]> {
        self.metrics.get(&metric).map(Vec::as_slice)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (Metric, &[Option<f64>])> {
        self.metrics.iter().map(|(m, v)| (*m, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// First index whose timestamp falls on the same date and hour as `now`.
    pub fn index_of_hour(&self, now: NaiveDateTime) -> Option<usize> {
        self.timestamps
            .iter()
            .position(|t| t.date() == now.date() && t.hour() == now.hour())
    }

    /// Parse the feed's local timestamps ("2024-03-01T13:00").
    pub fn parse_timestamps(raw: &[String]) -> Result<Vec<NaiveDateTime>, SeriesError> {
        raw.iter()
            .map(|s| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                    .map_err(|_| SeriesError::Timestamp(s.clone()))
            })
            .collect()
    }
}

/// The "current conditions" block of one forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

/// One forecast response: current conditions plus the hourly series they came with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    /// Offset of the series' local timestamps from UTC.
    pub utc_offset_seconds: i32,
}

impl Forecast {
    /// Express a UTC instant in the series' own local time.
    pub fn local_time(&self, now: chrono::DateTime<chrono::Utc>) -> NaiveDateTime {
        now.naive_utc() + Duration::seconds(i64::from(self.utc_offset_seconds))
    }
}
