use rusqlite::{Connection, params};
use tracing::info;

use crate::{
    error::Error,
    model::{NewShop, Shop, ShopLocation},
    source::ShopRecord,
};

/// Outcome of a [`StoreCatalog::sync`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub unchanged: usize,
}

/// Shop identity and location records.
///
/// Shops are keyed by `(store_name, latitude, longitude)`; they are inserted
/// once and never updated or removed.
pub struct StoreCatalog<'c> {
    conn: &'c Connection,
}

impl<'c> StoreCatalog<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert every record whose key is not in the catalog yet.
    ///
    /// All records are validated first; a malformed record fails the whole
    /// call before anything is written. Existing shops are left as they are,
    /// even when the province or address differ.
    pub fn sync(&self, records: &[ShopRecord]) -> Result<SyncSummary, Error> {
        let shops = records
            .iter()
            .enumerate()
            .map(|(idx, record)| record.validate(idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = SyncSummary::default();
        for shop in &shops {
            if self.insert_if_absent(shop)? {
                info!(store_name = %shop.store_name, "added new shop");
                summary.added += 1;
            } else {
                summary.unchanged += 1;
            }
        }

        Ok(summary)
    }

    fn insert_if_absent(&self, shop: &NewShop) -> Result<bool, rusqlite::Error> {
        let inserted = self.conn.execute(
            "INSERT INTO shops (store_name, province, latitude, longitude, address)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (store_name, latitude, longitude) DO NOTHING",
            params![
                shop.store_name,
                shop.province,
                shop.latitude,
                shop.longitude,
                shop.address
            ],
        )?;
        Ok(inserted == 1)
    }

    /// Id and coordinates of every shop, in id order.
    pub fn list_shops(&self) -> Result<Vec<ShopLocation>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, latitude, longitude FROM shops ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ShopLocation {
                id: row.get(0)?,
                latitude: row.get(1)?,
                longitude: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    /// Full shop rows, in id order.
    pub fn shops(&self) -> Result<Vec<Shop>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, store_name, province, latitude, longitude, address FROM shops ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Shop {
                id: row.get(0)?,
                store_name: row.get(1)?,
                province: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
                address: row.get(5)?,
            })
        })?;
        rows.collect()
    }
}
