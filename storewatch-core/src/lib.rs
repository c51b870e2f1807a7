//! Core library for `storewatch`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The SQLite storage handle, shop catalog and forecast ledger
//! - Reading the shop list from CSV
//! - The forecast client abstraction and its OpenWeather implementation
//! - The ingestion pipeline tying them together
//!
//! It is used by `storewatch-cli`, but can also be reused by other binaries or services.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod source;

pub use catalog::{StoreCatalog, SyncSummary};
pub use config::Config;
pub use db::Database;
pub use error::{Error, FetchError, ValidationError};
pub use ledger::{ForecastLedger, is_warning};
pub use model::{ForecastReading, NewShop, Shop, ShopLocation, StoredForecast};
pub use pipeline::{FetchErrorPolicy, Pipeline, PipelineOptions, RunReport, SkippedShop};
pub use provider::{ForecastClient, client_from_config, openweather::OpenWeatherClient};
pub use source::{ShopRecord, read_shop_records, read_shop_records_from};
