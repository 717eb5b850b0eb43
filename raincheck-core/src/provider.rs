use crate::{
    Config,
    error::{FetchError, Result},
    model::{Forecast, Place},
    provider::{nominatim::NominatimGeocoder, open_meteo::OpenMeteo},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

pub mod nominatim;
pub mod open_meteo;

const USER_AGENT: &str = concat!("raincheck/", env!("CARGO_PKG_VERSION"));

/// Forward geocoding: free text to the best matching place.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Place>;
}

/// Reverse geocoding: coordinates to a locality name.
///
/// `Ok(None)` means the service answered but named no locality.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}

/// Source of forecast records.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast>;
}

/// Upstream services wired from config.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub reverse: Box<dyn ReverseGeocoder>,
    pub forecast: Box<dyn ForecastSource>,
}

/// HTTP client shared by all providers. Nominatim rejects requests without a
/// User-Agent.
pub fn http_client() -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the default providers from config.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Providers> {
    let http = http_client()?;
    let open_meteo = OpenMeteo::new(http.clone(), &config.endpoints, config.language());

    Ok(Providers {
        geocoder: Box::new(open_meteo.clone()),
        reverse: Box::new(NominatimGeocoder::new(http, &config.endpoints.reverse)),
        forecast: Box::new(open_meteo),
    })
}

/// GET `url` with `query` and decode the JSON body.
pub(crate) async fn get_json<T, Q>(
    http: &Client,
    url: &str,
    query: &Q,
) -> std::result::Result<T, FetchError>
where
    T: DeserializeOwned,
    Q: Serialize + ?Sized,
{
    tracing::debug!(url, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| FetchError::Decode { url: url.to_string(), source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
