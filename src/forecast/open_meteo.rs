use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{Forecast, ForecastError, ForecastSource};
use crate::config::ForecastConfig;

const ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo current conditions for a fixed location.
#[derive(Clone)]
pub struct OpenMeteo {
    client: Client,
    endpoint: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct Response {
    current: Current,
}

#[derive(Deserialize)]
struct Current {
    temperature_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
}

impl OpenMeteo {
    pub fn new(config: &ForecastConfig) -> Self {
        Self::with_endpoint(Client::new(), ENDPOINT, config)
    }

    pub fn with_endpoint(client: Client, endpoint: &str, config: &ForecastConfig) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            latitude: config.latitude,
            longitude: config.longitude,
        }
    }

    fn url(&self) -> Result<Url, ForecastError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,wind_speed_10m,wind_direction_10m".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ],
        )
        .map_err(|e| ForecastError::Request(format!("invalid endpoint: {e}")))
    }
}

#[async_trait]
impl ForecastSource for OpenMeteo {
    async fn current(&self) -> Result<Forecast, ForecastError> {
        let response = self
            .client
            .get(self.url()?)
            .send()
            .await
            .map_err(|e| ForecastError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ForecastError::Request(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| ForecastError::Decode(e.to_string()))?;

        Ok(Forecast {
            temperature_c: body.current.temperature_2m,
            wind_speed_kmh: body.current.wind_speed_10m,
            wind_direction_deg: body.current.wind_direction_10m,
        })
    }
}
