use thiserror::Error;

use crate::model::Metric;

/// Failure of a forward-path step (geocoding or forecast fetch).
///
/// Both variants abort the current update cycle. Degraded paths (reverse
/// geocoding, now-alignment) never produce an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No place found matching '{query}'")]
    NotFound { query: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Transport or decoding failure talking to an upstream service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Malformed hourly series from {url}")]
    Series {
        url: String,
        #[source]
        source: SeriesError,
    },
}

/// Violations of the index-alignment invariant of [`crate::HourlySeries`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("{metric} has {found} values but the series has {expected} timestamps")]
    LengthMismatch {
        metric: Metric,
        expected: usize,
        found: usize,
    },

    #[error("Unparsable timestamp '{0}'")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_query() {
        let err = Error::NotFound { query: "Atlantis".into() };
        assert_eq!(err.to_string(), "No place found matching 'Atlantis'");
    }

    #[test]
    fn fetch_error_is_transparent() {
        let err: Error = FetchError::Malformed {
            url: "http://x".into(),
            reason: "no results".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Malformed response from http://x: no results");
    }

    #[test]
    fn length_mismatch_message() {
        let err = SeriesError::LengthMismatch {
            metric: Metric::Temperature,
            expected: 72,
            found: 71,
        };
        assert_eq!(err.to_string(), "temperature has 71 values but the series has 72 timestamps");
    }
}
