//! Core library for the `raincheck` dashboard.
//!
//! This crate defines:
//! - Location resolution and forecast fetching (Open-Meteo, Nominatim)
//! - The hourly window aligner and daily rain aggregation
//! - The simulated provider comparison and weather-code classification
//! - The dashboard controller that owns session state between updates
//!
//! It is used by `raincheck-cli`, but can also be reused by other front-ends.

pub mod comparison;
pub mod condition;
pub mod config;
pub mod daily;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod session;
pub mod window;

pub use comparison::{ComparisonEstimate, synthesize};
pub use condition::Condition;
pub use config::{Config, Endpoints};
pub use daily::daily_total;
pub use error::{Error, FetchError, Result, SeriesError};
pub use location::LocationResolver;
pub use model::{CurrentConditions, Forecast, HourlySeries, Metric, Place};
pub use provider::{ForecastSource, Geocoder, Providers, ReverseGeocoder};
pub use session::{Dashboard, SessionState, Snapshot, UpdateOutcome};
pub use window::{ChartKind, Dataset, Window, align};
