//! Current conditions at the dive site.
//!
//! A [`ForecastSource`] answers with the latest reading; [`ForecastCache`]
//! keeps one reading for its TTL and shares a single request between
//! concurrent callers. Failures are not cached.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ForecastConfig;

#[cfg(feature = "http")]
mod open_meteo;

#[cfg(feature = "http")]
pub use open_meteo::OpenMeteo;

/// A point-in-time reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
}

impl Forecast {
    /// Expected underwater visibility, estimated from surface wind.
    pub fn visibility(&self) -> &'static str {
        if self.wind_speed_kmh < 10.0 {
            "30m+"
        } else if self.wind_speed_kmh < 20.0 {
            "20m+"
        } else {
            "15m+"
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Request(String),
    #[error("forecast response malformed: {0}")]
    Decode(String),
    #[error("forecast timed out after {0}ms")]
    Timeout(u64),
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn current(&self) -> Result<Forecast, ForecastError>;
}

type SharedReading = Shared<BoxFuture<'static, Result<Forecast, ForecastError>>>;

#[derive(Default)]
struct State {
    reading: Option<(Forecast, Instant)>,
    pending: Option<SharedReading>,
}

/// TTL cache in front of a [`ForecastSource`].
#[derive(Clone)]
pub struct ForecastCache {
    source: Arc<dyn ForecastSource>,
    ttl: Duration,
    timeout: Duration,
    state: Arc<Mutex<State>>,
}

impl ForecastCache {
    pub fn new(source: Arc<dyn ForecastSource>, config: &ForecastConfig) -> Self {
        Self {
            source,
            ttl: config.ttl,
            timeout: config.timeout,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached reading if still fresh, otherwise a new one.
    pub async fn current(&self) -> Result<Forecast, ForecastError> {
        let pending = {
            let mut state = Self::lock(&self.state);
            if let Some((forecast, at)) = state.reading {
                if at.elapsed() < self.ttl {
                    debug!("forecast cache hit");
                    return Ok(forecast);
                }
            }
            match state.pending.clone() {
                Some(pending) => pending,
                None => {
                    let pending = self.start_fetch();
                    state.pending = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// The last successful reading, fresh or not.
    pub fn last(&self) -> Option<Forecast> {
        Self::lock(&self.state).reading.map(|(forecast, _)| forecast)
    }

    fn start_fetch(&self) -> SharedReading {
        let source = self.source.clone();
        let state = self.state.clone();
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, source.current()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ForecastError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };

            let mut state = Self::lock(&state);
            state.pending = None;
            match &outcome {
                Ok(forecast) => state.reading = Some((*forecast, Instant::now())),
                Err(err) => warn!(error = %err, "forecast fetch failed"),
            }
            outcome
        });

        let state = self.state.clone();
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "forecast fetch task died");
                    Self::lock(&state).pending = None;
                    Err(ForecastError::Request(format!("fetch task failed: {e}")))
                }
            }
        }
        .boxed()
        .shared()
    }
}
