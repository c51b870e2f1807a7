use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::FetchError, model::ForecastReading};

use super::ForecastClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Provider wind speeds are in m/s with `units=metric`.
const MPS_TO_KMH: f64 = 3.6;

/// Client for the OpenWeather 5 day / 3 hour forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn forecast_url(&self) -> String {
        format!("{}/data/2.5/forecast", self.base_url)
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    wind: OwWind,
    rain: Option<OwRain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Turn a forecast body into the reading for its first bucket.
fn parse_forecast(body: &str) -> Result<ForecastReading, FetchError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)?;

    let entry = parsed
        .list
        .into_iter()
        .next()
        .ok_or(FetchError::EmptyForecast)?;

    Ok(ForecastReading {
        date: entry.dt_txt,
        wind_kmh: entry.wind.speed * MPS_TO_KMH,
        rain_mm: entry.rain.map(|r| r.three_hours).unwrap_or(0.0),
        description: entry.weather.into_iter().next().map(|w| w.description),
    })
}

#[async_trait]
impl ForecastClient for OpenWeatherClient {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        credential: &str,
    ) -> Result<ForecastReading, FetchError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", credential),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reading = parse_forecast(&body)?;
        debug!(%lat, %lon, date = %reading.date, "fetched forecast bucket");
        Ok(reading)
    }
}
