use serde::{Deserialize, Serialize};

/// A shop as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub store_name: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// A validated shop record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShop {
    pub store_name: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// Identity and coordinates of a catalog shop, as iterated by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopLocation {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Nearest 3-hour forecast bucket, normalized to km/h and mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReading {
    /// Provider bucket timestamp, passed through untouched.
    pub date: String,
    pub wind_kmh: f64,
    pub rain_mm: f64,
    pub description: Option<String>,
}

/// A row of the forecast ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForecast {
    pub id: i64,
    pub shop_id: i64,
    pub date: String,
    pub rain_forecast: f64,
    pub wind_forecast: f64,
    pub warning: bool,
}
