use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{FetchError, Result};

use super::{ReverseGeocoder, get_json};

/// Reverse geocoding through Nominatim (OpenStreetMap). No API key required.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, url: &str) -> Self {
        Self { http, url: url.to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
}

impl NominatimAddress {
    /// Most specific populated locality: city > town > village > municipality.
    fn locality(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .filter(|name| !name.trim().is_empty())
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let parsed: NominatimResponse = get_json(
            &self.http,
            &self.url,
            &[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())],
        )
        .await?;

        // Nominatim reports failures such as "Unable to geocode" as a 200
        // with an `error` field and no address.
        let address = parsed.address.ok_or_else(|| FetchError::Malformed {
            url: self.url.clone(),
            reason: parsed.error.unwrap_or_else(|| "response has no address".to_string()),
        })?;

        Ok(address.locality())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(body: serde_json::Value) -> (MockServer, NominatimGeocoder) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let url = format!("{}/reverse", server.uri());
        (server, NominatimGeocoder::new(Client::new(), &url))
    }

    #[tokio::test]
    async fn prefers_city_over_town() {
        let (_server, geocoder) = serve(serde_json::json!({
            "display_name": "Plasencia, Cáceres, Extremadura, España",
            "address": { "town": "Jaraíz", "city": "Plasencia", "country": "España" }
        }))
        .await;

        let name = geocoder.reverse(40.03, -6.09).await.expect("answered");
        assert_eq!(name.as_deref(), Some("Plasencia"));
    }

    #[tokio::test]
    async fn falls_through_to_village() {
        let (_server, geocoder) = serve(serde_json::json!({
            "address": { "village": "Madrigal de la Vera", "county": "Cáceres" }
        }))
        .await;

        let name = geocoder.reverse(40.15, -5.36).await.expect("answered");
        assert_eq!(name.as_deref(), Some("Madrigal de la Vera"));
    }

    #[tokio::test]
    async fn no_locality_is_none() {
        let (_server, geocoder) = serve(serde_json::json!({
            "address": { "county": "Pacific Ocean", "country_code": "um" }
        }))
        .await;

        let name = geocoder.reverse(0.0, -160.0).await.expect("answered");
        assert_eq!(name, None);
    }

    #[tokio::test]
    async fn error_body_is_an_error() {
        let (_server, geocoder) = serve(serde_json::json!({ "error": "Unable to geocode" })).await;

        let err = geocoder.reverse(0.0, -160.0).await.unwrap_err();
        assert!(err.to_string().contains("Unable to geocode"), "{err}");
    }

    #[tokio::test]
    async fn error_body_resolves_to_fallback_label() {
        use crate::location::{FALLBACK_LABEL, LocationResolver, fakes::TableGeocoder};

        let (_server, geocoder) = serve(serde_json::json!({ "error": "Unable to geocode" })).await;
        let resolver = LocationResolver::new(Box::new(TableGeocoder::default()), Box::new(geocoder));

        let label = resolver.resolve_from_coordinates(0.0, -160.0).await;
        assert_eq!(label, FALLBACK_LABEL);
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(Client::new(), &format!("{}/reverse", server.uri()));
        assert!(geocoder.reverse(1.0, 1.0).await.is_err());
    }
}
