use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Endpoints,
    error::{Error, FetchError, Result},
    model::{CurrentConditions, Forecast, HourlySeries, Metric, Place},
};

use super::{ForecastSource, Geocoder, get_json};

const CURRENT_FIELDS: &str = "temperature_2m,is_day,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,rain,precipitation_probability,wind_speed_10m";

/// Open-Meteo geocoding and forecast APIs. Neither needs an API key.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
}

impl OpenMeteo {
    pub fn new(http: Client, endpoints: &Endpoints, language: &str) -> Self {
        Self {
            http,
            geocoding_url: endpoints.geocoding.clone(),
            forecast_url: endpoints.forecast.clone(),
            language: language.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    is_day: u8,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Option<Vec<Option<f64>>>,
    rain: Option<Vec<Option<f64>>>,
    precipitation_probability: Option<Vec<Option<f64>>>,
    wind_speed_10m: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    current: OmCurrent,
    hourly: OmHourly,
}

impl OmHourly {
    fn into_series(self) -> std::result::Result<HourlySeries, crate::error::SeriesError> {
        let timestamps = HourlySeries::parse_timestamps(&self.time)?;
        let columns = [
            (Metric::Precipitation, self.rain),
            (Metric::PrecipitationProbability, self.precipitation_probability),
            (Metric::Temperature, self.temperature_2m),
            (Metric::WindSpeed, self.wind_speed_10m),
        ];

        columns
            .into_iter()
            .filter_map(|(metric, values)| values.map(|v| (metric, v)))
            .try_fold(HourlySeries::new(timestamps), |series, (metric, values)| {
                series.with_metric(metric, values)
            })
    }
}

#[async_trait]
impl Geocoder for OpenMeteo {
    async fn search(&self, query: &str) -> Result<Place> {
        let url = self.geocoding_url.as_str();
        let parsed: OmSearchResponse = get_json(
            &self.http,
            url,
            &[
                ("name", query),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ],
        )
        .await?;

        let first = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound { query: query.to_string() })?;

        let place = Place {
            name: first.name,
            country: first.country.unwrap_or_default(),
            latitude: first.latitude,
            longitude: first.longitude,
        };

        if !place.has_valid_coordinates() {
            return Err(FetchError::Malformed {
                url: url.to_string(),
                reason: format!(
                    "coordinates out of range: {}, {}",
                    place.latitude, place.longitude
                ),
            }
            .into());
        }

        tracing::debug!(query, place = %place.label(), "geocoded");
        Ok(place)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteo {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast> {
        let url = self.forecast_url.as_str();
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();

        // One past day plus today and tomorrow, so any hour of today has at
        // least 12 hours on either side.
        let parsed: OmForecastResponse = get_json(
            &self.http,
            url,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("timezone", "auto"),
                ("past_days", "1"),
                ("forecast_days", "2"),
            ],
        )
        .await?;

        let hourly = parsed
            .hourly
            .into_series()
            .map_err(|source| FetchError::Series { url: url.to_string(), source })?;

        Ok(Forecast {
            current: CurrentConditions {
                temperature: parsed.current.temperature_2m,
                wind_speed: parsed.current.wind_speed_10m,
                weather_code: parsed.current.weather_code,
                is_day: parsed.current.is_day != 0,
            },
            hourly,
            utc_offset_seconds: parsed.utc_offset_seconds,
        })
    }
}
