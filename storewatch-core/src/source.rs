//! Reading the external shop list.
//!
//! The CSV file has a header row with `store_name, province, latitude,
//! longitude, address`. Rows are read as loose [`ShopRecord`]s and only turn
//! into [`NewShop`]s once they pass [`ShopRecord::validate`].

use serde::Deserialize;
use std::{io::Read, path::Path};

use crate::{error::ValidationError, model::NewShop};

/// One raw row of the shop list, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShopRecord {
    pub store_name: Option<String>,
    pub province: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub address: Option<String>,
}

impl ShopRecord {
    /// Convenience constructor for callers that already have typed values.
    pub fn new(
        store_name: &str,
        province: &str,
        latitude: f64,
        longitude: f64,
        address: &str,
    ) -> Self {
        Self {
            store_name: Some(store_name.to_string()),
            province: Some(province.to_string()),
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            address: Some(address.to_string()),
        }
    }

    /// Check every field and build a [`NewShop`]. `record` is the 1-based
    /// position used in the error.
    pub fn validate(&self, record: usize) -> Result<NewShop, ValidationError> {
        let store_name = required(record, "store_name", &self.store_name)?;
        let province = required(record, "province", &self.province)?;
        let latitude = coordinate(record, "latitude", &self.latitude, 90.0)?;
        let longitude = coordinate(record, "longitude", &self.longitude, 180.0)?;
        let address = required(record, "address", &self.address)?;

        Ok(NewShop {
            store_name,
            province,
            latitude,
            longitude,
            address,
        })
    }
}

fn required(
    record: usize,
    field: &'static str,
    value: &Option<String>,
) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::new(record, field, "is missing")),
    }
}

fn coordinate(
    record: usize,
    field: &'static str,
    value: &Option<String>,
    limit: f64,
) -> Result<f64, ValidationError> {
    let raw = required(record, field, value)?;
    let parsed: f64 = raw
        .parse()
        .map_err(|_| ValidationError::new(record, field, format!("is not a number: '{raw}'")))?;

    if !(-limit..=limit).contains(&parsed) {
        return Err(ValidationError::new(
            record,
            field,
            format!("is out of range: {parsed} (allowed -{limit}..={limit})"),
        ));
    }

    Ok(parsed)
}

/// Read all shop records from a CSV file.
pub fn read_shop_records(path: &Path) -> Result<Vec<ShopRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    collect(reader)
}

/// Read all shop records from any CSV reader.
pub fn read_shop_records_from<R: Read>(input: R) -> Result<Vec<ShopRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    collect(reader)
}

fn collect<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<ShopRecord>, csv::Error> {
    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOPS_CSV: &str = "\
store_name,province,latitude,longitude,address
Checkers Bellville,Western Cape,-33.8325,18.647499,Voortrekker Rd
Checkers Sandton,Gauteng, -26.1076 ,28.0567,Rivonia Rd
";

    #[test]
    fn reads_rows_with_header() {
        let records = read_shop_records_from(SHOPS_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].store_name.as_deref(), Some("Checkers Bellville"));
        assert_eq!(records[1].latitude.as_deref(), Some("-26.1076"));
    }

    #[test]
    fn validates_into_typed_shop() {
        let records = read_shop_records_from(SHOPS_CSV.as_bytes()).unwrap();
        let shop = records[0].validate(1).unwrap();

        assert_eq!(shop.store_name, "Checkers Bellville");
        assert_eq!(shop.province, "Western Cape");
        assert_eq!(shop.latitude, -33.8325);
        assert_eq!(shop.longitude, 18.647499);
        assert_eq!(shop.address, "Voortrekker Rd");
    }

    #[test]
    fn missing_column_is_a_validation_error() {
        let csv = "store_name,province,latitude,address\nA,B,-33.0,Main Rd\n";
        let records = read_shop_records_from(csv.as_bytes()).unwrap();

        let err = records[0].validate(1).unwrap_err();
        assert_eq!(err.field, "longitude");
        assert_eq!(err.record, 1);
    }

    #[test]
    fn short_row_is_a_validation_error() {
        let csv = "store_name,province,latitude,longitude,address\n\
                   A,B,-33.0,18.0,Main Rd\n\
                   C,D,-30.0,19.0\n";
        let records = read_shop_records_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        records[0].validate(1).unwrap();
        let err = records[1].validate(2).unwrap_err();
        assert_eq!(err.field, "address");
        assert_eq!(err.record, 2);
    }

    #[test]
    fn short_row_in_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shops.csv");
        std::fs::write(&path, "store_name,province,latitude,longitude,address\nA,B,-33.0\n").unwrap();

        let records = read_shop_records(&path).unwrap();
        assert_eq!(records[0].longitude, None);
        assert_eq!(records[0].validate(1).unwrap_err().field, "longitude");
    }

    #[test]
    fn blank_field_is_a_validation_error() {
        let csv = "store_name,province,latitude,longitude,address\n  ,B,-33.0,18.0,Main Rd\n";
        let records = read_shop_records_from(csv.as_bytes()).unwrap();

        let err = records[0].validate(4).unwrap_err();
        assert_eq!(err.field, "store_name");
        assert_eq!(err.record, 4);
    }

    #[test]
    fn non_numeric_coordinate_is_rejected() {
        let mut record = ShopRecord::new("A", "B", 0.0, 0.0, "C");
        record.latitude = Some("north".into());

        let err = record.validate(1).unwrap_err();
        assert_eq!(err.field, "latitude");
        assert!(err.reason.contains("not a number"));
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let record = ShopRecord::new("A", "B", -33.0, 200.0, "C");

        let err = record.validate(1).unwrap_err();
        assert_eq!(err.field, "longitude");
        assert!(err.reason.contains("out of range"));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_shop_records(&dir.path().join("nope.csv")).is_err());
    }
}
