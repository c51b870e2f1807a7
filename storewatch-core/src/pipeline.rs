//! Ingestion pipeline: sync the catalog, then fetch and record one forecast
//! per shop, all inside a single transaction.
//!
//! The run moves through init, sync, fetch loop and commit. Any error
//! rolls the transaction back, so a failed run leaves neither new shops nor
//! new readings behind.

use futures_util::{StreamExt, stream};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    catalog::StoreCatalog,
    db::Database,
    error::{Error, FetchError},
    ledger::ForecastLedger,
    provider::ForecastClient,
    source::ShopRecord,
};

/// What to do when the provider fails for one shop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorPolicy {
    /// Fail the whole run and roll back.
    #[default]
    Abort,
    /// Log the failure, leave that shop without a reading and keep going.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub on_fetch_error: FetchErrorPolicy,
    /// Maximum number of forecast requests in flight. Values below 1 mean 1.
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            on_fetch_error: FetchErrorPolicy::Abort,
            concurrency: 1,
        }
    }
}

/// A shop whose forecast could not be fetched under [`FetchErrorPolicy::Skip`].
#[derive(Debug)]
pub struct SkippedShop {
    pub shop_id: i64,
    pub error: FetchError,
}

/// Summary of a committed run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub shops_added: usize,
    pub readings_recorded: usize,
    pub warnings: usize,
    pub skipped: Vec<SkippedShop>,
}

pub struct Pipeline<'a> {
    client: &'a dyn ForecastClient,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a dyn ForecastClient, options: PipelineOptions) -> Self {
        Self { client, options }
    }

    /// Run the pipeline against `db` for the given shop list.
    ///
    /// Commits once at the end. On error the transaction is rolled back
    /// explicitly and the error is returned.
    pub async fn run(
        &self,
        db: &mut Database,
        records: &[ShopRecord],
        credential: &str,
    ) -> Result<RunReport, Error> {
        db.init_schema()?;

        let tx = db.transaction()?;
        let outcome = self.ingest(&tx, records, credential).await;
        match outcome {
            Ok(report) => {
                tx.commit()?;
                info!(
                    shops_added = report.shops_added,
                    readings = report.readings_recorded,
                    warnings = report.warnings,
                    skipped = report.skipped.len(),
                    "run committed"
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(error = %rollback_err, "rollback failed");
                }
                warn!(error = %err, "run aborted, changes rolled back");
                Err(err)
            }
        }
    }

    async fn ingest(
        &self,
        conn: &Connection,
        records: &[ShopRecord],
        credential: &str,
    ) -> Result<RunReport, Error> {
        let catalog = StoreCatalog::new(conn);
        let ledger = ForecastLedger::new(conn);

        let synced = catalog.sync(records)?;
        let mut report = RunReport {
            shops_added: synced.added,
            ..RunReport::default()
        };

        let shops = catalog.list_shops()?;
        let client = self.client;

        // Fetches may overlap; results arrive in catalog order and are written one by one.
        let mut fetches = std::pin::pin!(
            stream::iter(shops)
                .map(move |shop| async move {
                    let result = client.fetch(shop.latitude, shop.longitude, credential).await;
                    (shop, result)
                })
                .buffered(self.options.concurrency.max(1))
        );

        while let Some((shop, result)) = fetches.next().await {
            let reading = match result {
                Ok(reading) => reading,
                Err(err) => {
                    let status = err.status();
                    match self.options.on_fetch_error {
                        FetchErrorPolicy::Abort => {
                            error!(shop_id = shop.id, ?status, error = %err, "forecast fetch failed");
                            return Err(Error::Fetch {
                                shop_id: shop.id,
                                source: err,
                            });
                        }
                        FetchErrorPolicy::Skip => {
                            warn!(shop_id = shop.id, ?status, error = %err, "skipping shop");
                            report.skipped.push(SkippedShop {
                                shop_id: shop.id,
                                error: err,
                            });
                            continue;
                        }
                    }
                }
            };

            let stored = ledger.record(shop.id, &reading.date, reading.rain_mm, reading.wind_kmh)?;
            report.readings_recorded += 1;
            if stored.warning {
                report.warnings += 1;
                info!(
                    shop_id = shop.id,
                    date = %stored.date,
                    rain_mm = stored.rain_forecast,
                    wind_kmh = stored.wind_forecast,
                    "weather warning"
                );
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_abort_sequentially() {
        let options = PipelineOptions::default();
        assert_eq!(options.on_fetch_error, FetchErrorPolicy::Abort);
        assert_eq!(options.concurrency, 1);
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: FetchErrorPolicy,
        }

        let w: Wrapper = toml::from_str("policy = \"skip\"").unwrap();
        assert_eq!(w.policy, FetchErrorPolicy::Skip);
    }
}
