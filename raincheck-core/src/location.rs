//! Turning place names and coordinates into displayable places.

use crate::{
    error::Result,
    model::Place,
    provider::{Geocoder, ReverseGeocoder},
};

/// Label used when reverse geocoding fails outright.
pub const FALLBACK_LABEL: &str = "current location";

/// Label used when the reverse service answers without naming a locality.
pub const UNKNOWN_LABEL: &str = "unknown location";

#[derive(Debug)]
pub struct LocationResolver {
    forward: Box<dyn Geocoder>,
    reverse: Box<dyn ReverseGeocoder>,
}

impl LocationResolver {
    pub fn new(forward: Box<dyn Geocoder>, reverse: Box<dyn ReverseGeocoder>) -> Self {
        Self { forward, reverse }
    }

    /// Resolve a place name. Fails with [`crate::Error::NotFound`] when nothing
    /// matches. The caller is expected to have rejected blank queries.
    pub async fn resolve(&self, query: &str) -> Result<Place> {
        self.forward.search(query).await
    }

    /// Best-effort name for a pair of coordinates. Never fails.
    pub async fn resolve_from_coordinates(&self, latitude: f64, longitude: f64) -> String {
        match self.reverse.reverse(latitude, longitude).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_LABEL.to_string(),
            Err(e) => {
                tracing::warn!(latitude, longitude, error = %e, "reverse geocoding failed");
                FALLBACK_LABEL.to_string()
            }
        }
    }
}
