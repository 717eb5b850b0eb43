//! The dashboard controller and the state it owns between update cycles.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    Config,
    comparison::{ComparisonEstimate, synthesize},
    condition::Condition,
    daily::daily_total,
    error::{Error, Result},
    location::{FALLBACK_LABEL, LocationResolver, UNKNOWN_LABEL},
    model::{CurrentConditions, Forecast, Place},
    provider::{ForecastSource, Providers, providers_from_config},
    window::{Window, align, rain_in_current_hour},
};

/// Label shown in place of the location after a failed update.
pub const ERROR_LABEL: &str = "Error";

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub place: Place,
    pub current: CurrentConditions,
    pub condition: Condition,
    /// Precipitation recorded for the current hour, in mm.
    pub rain_now: f64,
    pub window: Window,
    /// `None` when the feed returned no precipitation series.
    pub daily_total: Option<f64>,
    pub comparison: Vec<ComparisonEstimate>,
    /// "Now" in the forecast's local time.
    pub local_time: NaiveDateTime,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn build<R: Rng>(
        place: Place,
        forecast: &Forecast,
        now: DateTime<Utc>,
        radius: usize,
        rng: &mut R,
    ) -> Self {
        let local_time = forecast.local_time(now);
        let total = daily_total(&forecast.hourly);

        Self {
            place,
            current: forecast.current.clone(),
            condition: Condition::classify(forecast.current.weather_code),
            rain_now: rain_in_current_hour(&forecast.hourly, local_time),
            window: align(&forecast.hourly, local_time, radius),
            daily_total: total,
            comparison: total.map(|t| synthesize(t, rng)).unwrap_or_default(),
            local_time,
            updated_at: now,
        }
    }
}

/// State that survives between update cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Query repeated by [`Dashboard::refresh`].
    pub current_query: String,
    /// Text of the location field: the place label, or [`ERROR_LABEL`].
    pub label: String,
    /// Last successful snapshot. Kept when a later update fails.
    pub snapshot: Option<Snapshot>,
}

/// Result of one update cycle that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Box<Snapshot>),
    /// Blank query; nothing was requested.
    Skipped,
    /// A newer cycle started before this one finished; its result was dropped.
    Superseded,
}

/// Top-level controller.
///
/// Each update cycle takes a generation number when it starts and may only
/// publish its result if no newer cycle has started since. Overlapping
/// auto-refresh and manual updates therefore never leave stale data on screen.
#[derive(Debug)]
pub struct Dashboard {
    resolver: LocationResolver,
    forecast: Box<dyn ForecastSource>,
    radius: usize,
    rng: Mutex<StdRng>,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl Dashboard {
    pub fn new(providers: Providers, initial_query: &str, radius: usize) -> Self {
        Self {
            resolver: LocationResolver::new(providers.geocoder, providers.reverse),
            forecast: providers.forecast,
            radius,
            rng: Mutex::new(StdRng::from_entropy()),
            state: Mutex::new(SessionState {
                current_query: initial_query.trim().to_string(),
                ..SessionState::default()
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let providers = providers_from_config(config)?;
        Ok(Self::new(providers, config.default_place(), config.window_radius()))
    }

    /// Replace the random source with a seeded one, for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn current_query(&self) -> String {
        self.state.lock().await.current_query.clone()
    }

    /// Search by place name. Blank queries are skipped without any request.
    pub async fn update_by_name(&self, query: &str, now: DateTime<Utc>) -> Result<UpdateOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(UpdateOutcome::Skipped);
        }

        let generation = self.begin();
        let result = async {
            let place = self.resolver.resolve(query).await?;
            let forecast = self.forecast.fetch(place.latitude, place.longitude).await?;
            Ok::<_, Error>((place, forecast))
        }
        .await;

        match result {
            Ok((place, forecast)) => {
                let label = place.label();
                self.commit(generation, Some(query.to_string()), label, place, &forecast, now).await
            }
            Err(e) => self.fail(generation, e).await,
        }
    }

    /// Update from device coordinates. The forecast fetch is fatal; the
    /// place name is best-effort.
    ///
    /// A resolved locality becomes the query repeated by [`Self::refresh`].
    /// When only a fallback label is available the previous query is kept.
    pub async fn update_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome> {
        let generation = self.begin();

        let forecast = match self.forecast.fetch(latitude, longitude).await {
            Ok(forecast) => forecast,
            Err(e) => return self.fail(generation, e).await,
        };
        let name = self.resolver.resolve_from_coordinates(latitude, longitude).await;

        let query = (name != FALLBACK_LABEL && name != UNKNOWN_LABEL).then(|| name.clone());
        let place = Place { name: name.clone(), country: String::new(), latitude, longitude };
        self.commit(generation, query, name, place, &forecast, now).await
    }

    /// Repeat the last successful query (auto-refresh, manual refresh).
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<UpdateOutcome> {
        let query = self.current_query().await;
        tracing::debug!(query = %query, "refreshing");
        self.update_by_name(&query, now).await
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn commit(
        &self,
        generation: u64,
        query: Option<String>,
        label: String,
        place: Place,
        forecast: &Forecast,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome> {
        let snapshot = {
            let mut rng = self.rng.lock().await;
            Snapshot::build(place, forecast, now, self.radius, &mut *rng)
        };

        let mut state = self.state.lock().await;
        if !self.is_latest(generation) {
            tracing::info!(generation, "discarding superseded update");
            return Ok(UpdateOutcome::Superseded);
        }

        if !snapshot.window.now_pinpointed {
            tracing::warn!(local_time = %snapshot.local_time, "current hour not found in series");
        }
        tracing::info!(place = %label, "weather updated");

        if let Some(query) = query {
            state.current_query = query;
        }
        state.label = label;
        state.snapshot = Some(snapshot.clone());
        Ok(UpdateOutcome::Updated(Box::new(snapshot)))
    }

    async fn fail(&self, generation: u64, error: Error) -> Result<UpdateOutcome> {
        let mut state = self.state.lock().await;
        if !self.is_latest(generation) {
            tracing::info!(generation, error = %error, "discarding superseded failure");
            return Ok(UpdateOutcome::Superseded);
        }

        tracing::error!(error = %error, "update failed");
        state.label = ERROR_LABEL.to_string();
        Err(error)
    }
}
