use rusqlite::{Connection, params};
use tracing::debug;

use crate::model::StoredForecast;

/// Rain above this many millimeters in the bucket raises a warning.
pub const RAIN_WARNING_MM: f64 = 0.0;

/// Wind above this speed raises a warning.
pub const WIND_WARNING_KMH: f64 = 35.0;

/// Warning rule: any rain, or wind strictly above 35 km/h.
pub fn is_warning(rain_forecast: f64, wind_forecast_kmh: f64) -> bool {
    rain_forecast > RAIN_WARNING_MM || wind_forecast_kmh > WIND_WARNING_KMH
}

/// Append-only store of per-shop forecast readings.
pub struct ForecastLedger<'c> {
    conn: &'c Connection,
}

impl<'c> ForecastLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a reading and its derived warning flag. Never updates.
    ///
    /// `shop_id` must name an existing shop; otherwise the foreign key
    /// constraint fails.
    pub fn record(
        &self,
        shop_id: i64,
        date: &str,
        rain_forecast: f64,
        wind_forecast: f64,
    ) -> Result<StoredForecast, rusqlite::Error> {
        let warning = is_warning(rain_forecast, wind_forecast);

        self.conn.execute(
            "INSERT INTO weather_forecast (shop_id, date, rain_forecast, wind_forecast, warning)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![shop_id, date, rain_forecast, wind_forecast, warning],
        )?;

        let stored = StoredForecast {
            id: self.conn.last_insert_rowid(),
            shop_id,
            date: date.to_string(),
            rain_forecast,
            wind_forecast,
            warning,
        };
        debug!(shop_id, id = stored.id, warning, "recorded forecast");

        Ok(stored)
    }

    pub fn list(&self) -> Result<Vec<StoredForecast>, rusqlite::Error> {
        self.query(
            "SELECT id, shop_id, date, rain_forecast, wind_forecast, warning
             FROM weather_forecast ORDER BY id",
            [],
        )
    }

    pub fn list_for_shop(&self, shop_id: i64) -> Result<Vec<StoredForecast>, rusqlite::Error> {
        self.query(
            "SELECT id, shop_id, date, rain_forecast, wind_forecast, warning
             FROM weather_forecast WHERE shop_id = ?1 ORDER BY id",
            [shop_id],
        )
    }

    fn query<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<StoredForecast>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(StoredForecast {
                id: row.get(0)?,
                shop_id: row.get(1)?,
                date: row.get(2)?,
                rain_forecast: row.get(3)?,
                wind_forecast: row.get(4)?,
                warning: row.get(5)?,
            })
        })?;
        rows.collect()
    }
}
