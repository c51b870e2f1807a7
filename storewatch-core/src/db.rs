use rusqlite::{Connection, Transaction};
use std::path::Path;

/// Explicit storage handle owning the single SQLite connection.
///
/// Catalog and ledger borrow the connection (or a transaction on it) instead
/// of reaching for shared state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", true)?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create tables if absent. Safe to call any number of times.
    pub fn init_schema(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS shops (
                id INTEGER PRIMARY KEY,
                store_name TEXT NOT NULL,
                province TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                address TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_shops_key ON shops(store_name, latitude, longitude);

            CREATE TABLE IF NOT EXISTS weather_forecast (
                id INTEGER PRIMARY KEY,
                shop_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                rain_forecast REAL NOT NULL,
                wind_forecast REAL NOT NULL,
                warning BOOLEAN NOT NULL,
                FOREIGN KEY (shop_id) REFERENCES shops(id)
            );

            CREATE INDEX IF NOT EXISTS idx_weather_forecast_shop ON weather_forecast(shop_id);",
        )
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin the run-wide transaction. Dropping it without commit rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, rusqlite::Error> {
        self.conn.transaction()
    }
}
