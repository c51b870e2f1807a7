//! Human-readable rendering of readings, stored rows and run summaries.

use storewatch_core::{ForecastReading, RunReport, Shop, StoredForecast};

const COLUMN_WIDTH: usize = 15;

fn render_table(name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return format!("No data found in {name}.");
    }

    let mut out = format!("--- {} TABLE ---\n", name.to_uppercase());
    for header in headers {
        out.push_str(&format!("{header:<COLUMN_WIDTH$}"));
    }
    for row in rows {
        out.push('\n');
        for value in row {
            out.push_str(&format!("{value:<COLUMN_WIDTH$}"));
        }
    }
    out
}

pub fn format_shops(shops: &[Shop]) -> String {
    let rows = shops
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.store_name.clone(),
                s.province.clone(),
                s.latitude.to_string(),
                s.longitude.to_string(),
                s.address.clone(),
            ]
        })
        .collect();

    render_table(
        "shops",
        &["id", "store_name", "province", "latitude", "longitude", "address"],
        rows,
    )
}

pub fn format_forecasts(rows: &[StoredForecast]) -> String {
    let rows = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.shop_id.to_string(),
                r.date.clone(),
                format!("{:.2}", r.rain_forecast),
                format!("{:.2}", r.wind_forecast),
                if r.warning { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    render_table(
        "weather_forecast",
        &["id", "shop_id", "date", "rain_forecast", "wind_forecast", "warning"],
        rows,
    )
}

pub fn format_reading(reading: &ForecastReading) -> String {
    let mut out = format!(
        "Weather forecast for the next 3 hours ({}):\n\
         Wind speed: {:.1} km/h\n\
         Rain volume: {:.1} mm",
        reading.date, reading.wind_kmh, reading.rain_mm
    );
    if let Some(description) = &reading.description {
        out.push_str(&format!("\nDescription: {description}"));
    }
    out
}

pub fn format_report(report: &RunReport) -> String {
    let mut out = format!(
        "Added {} new shop(s), recorded {} forecast(s), {} warning(s).",
        report.shops_added, report.readings_recorded, report.warnings
    );
    for skipped in &report.skipped {
        out.push_str(&format!("\nSkipped shop {}: {}", skipped.shop_id, skipped.error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storewatch_core::{FetchError, SkippedShop};

    #[test]
    fn empty_table_message() {
        assert_eq!(format_shops(&[]), "No data found in shops.");
        assert_eq!(format_forecasts(&[]), "No data found in weather_forecast.");
    }

    #[test]
    fn shops_table_has_header_and_rows() {
        let text = format_shops(&[Shop {
            id: 1,
            store_name: "Bellville".into(),
            province: "Western Cape".into(),
            latitude: -33.83,
            longitude: 18.65,
            address: "Voortrekker Rd".into(),
        }]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "--- SHOPS TABLE ---");
        assert!(lines[1].starts_with("id             store_name"));
        assert!(lines[2].starts_with("1              Bellville"));
        assert!(lines[2].contains("-33.83"));
    }

    #[test]
    fn forecast_rows_show_warning() {
        let text = format_forecasts(&[StoredForecast {
            id: 7,
            shop_id: 1,
            date: "2024-01-01 12:00:00".into(),
            rain_forecast: 0.0,
            wind_forecast: 37.8,
            warning: true,
        }]);

        assert!(text.contains("37.80"));
        assert!(text.trim_end().ends_with("yes"));
    }

    #[test]
    fn reading_includes_description_when_present() {
        let mut reading = ForecastReading {
            date: "2024-01-01 12:00:00".into(),
            wind_kmh: 37.8,
            rain_mm: 0.0,
            description: Some("clear sky".into()),
        };
        let text = format_reading(&reading);
        assert!(text.contains("Wind speed: 37.8 km/h"));
        assert!(text.contains("Description: clear sky"));

        reading.description = None;
        assert!(!format_reading(&reading).contains("Description"));
    }

    #[test]
    fn report_lists_skipped_shops() {
        let report = RunReport {
            shops_added: 2,
            readings_recorded: 1,
            warnings: 1,
            skipped: vec![SkippedShop {
                shop_id: 3,
                error: FetchError::EmptyForecast,
            }],
        };

        let text = format_report(&report);
        assert!(text.starts_with("Added 2 new shop(s), recorded 1 forecast(s), 1 warning(s)."));
        assert!(text.contains("Skipped shop 3"));
    }
}
