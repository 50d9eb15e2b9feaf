use arrow::datatypes::DataType;
use std::collections::HashMap;

/// Known column types for NYC TLC yellow-taxi trip records.
static TRIP_COLUMN_TYPES: &[(&str, DataType)] = &[
    ("VendorID", DataType::Int64),
    ("passenger_count", DataType::Int64),
    ("trip_distance", DataType::Float64),
    ("RatecodeID", DataType::Int64),
    ("store_and_fwd_flag", DataType::Utf8),
    ("PULocationID", DataType::Int64),
    ("DOLocationID", DataType::Int64),
    ("payment_type", DataType::Int64),
    ("fare_amount", DataType::Float64),
    ("extra", DataType::Float64),
    ("mta_tax", DataType::Float64),
    ("tip_amount", DataType::Float64),
    ("tolls_amount", DataType::Float64),
    ("improvement_surcharge", DataType::Float64),
    ("total_amount", DataType::Float64),
    ("congestion_surcharge", DataType::Float64),
];

/// Columns holding pickup/dropoff datetimes, parsed into timestamps.
static TRIP_DATETIME_COLUMNS: &[&str] = &["tpep_pickup_datetime", "tpep_dropoff_datetime"];

/// Per-file coercion plan: the intersection of the known trip schema with
/// the columns actually present in a file.
#[derive(Debug)]
pub struct TripCoercions {
    pub types: HashMap<String, DataType>,
    pub date_columns: Vec<String>,
}

/// Detect trip-record CSVs by the presence of a pickup/dropoff datetime
/// column and build the coercion plan for the columns that exist.
/// Returns `None` for anything that is not trip data.
pub fn coercions_for(headers: &[String]) -> Option<TripCoercions> {
    let is_trip_data = headers
        .iter()
        .any(|h| TRIP_DATETIME_COLUMNS.contains(&h.as_str()));
    if !is_trip_data {
        return None;
    }

    let types = TRIP_COLUMN_TYPES
        .iter()
        .filter(|(name, _)| headers.iter().any(|h| h == name))
        .map(|(name, ty)| (name.to_string(), ty.clone()))
        .collect();
    let date_columns = TRIP_DATETIME_COLUMNS
        .iter()
        .filter(|name| headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();

    Some(TripCoercions {
        types,
        date_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn non_trip_headers_get_no_plan() {
        assert!(coercions_for(&headers(&["id", "name", "amount"])).is_none());
    }

    #[test]
    fn plan_covers_only_intersecting_columns() {
        let plan = coercions_for(&headers(&[
            "tpep_pickup_datetime",
            "VendorID",
            "fare_amount",
            "some_new_column",
        ]))
        .expect("trip data should be detected");

        assert_eq!(plan.types.len(), 2);
        assert_eq!(plan.types["VendorID"], DataType::Int64);
        assert_eq!(plan.types["fare_amount"], DataType::Float64);
        assert!(!plan.types.contains_key("some_new_column"));
        assert_eq!(plan.date_columns, vec!["tpep_pickup_datetime"]);
    }

    #[test]
    fn one_datetime_column_is_enough_to_detect() {
        let plan = coercions_for(&headers(&["tpep_dropoff_datetime", "total_amount"]))
            .expect("trip data should be detected");
        assert_eq!(plan.date_columns, vec!["tpep_dropoff_datetime"]);
    }
}
