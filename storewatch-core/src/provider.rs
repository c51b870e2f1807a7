use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Config, error::FetchError, model::ForecastReading, provider::openweather::OpenWeatherClient};

pub mod openweather;

/// Source of the nearest 3-hour forecast bucket for a coordinate.
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    /// One request, no retries. `credential` is passed to the provider as is.
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        credential: &str,
    ) -> Result<ForecastReading, FetchError>;
}

/// Construct the OpenWeather client, honoring a configured base URL.
pub fn client_from_config(config: &Config) -> Box<dyn ForecastClient> {
    match config.provider_url.as_deref() {
        Some(url) => Box::new(OpenWeatherClient::with_base_url(url)),
        None => Box::new(OpenWeatherClient::new()),
    }
}
