use crate::process::date_parser;
use crate::process::schema::SchemaInfo;
use crate::process::utils::clean_str;
use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Float64Builder, Int64Builder, StringArray, TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Convert an all-string batch into the final column types.
///
/// Values that do not parse become NULL.
pub fn convert_batch(batch: &RecordBatch, info: &SchemaInfo) -> Result<RecordBatch> {
    let mut out = Vec::with_capacity(batch.num_columns());

    for (arr, fld) in batch.columns().iter().zip(info.schema.fields()) {
        let sarr = arr
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| format!("column {} was not read as strings", fld.name()))?;

        let col: ArrayRef = match fld.data_type() {
            DataType::Timestamp(TimeUnit::Millisecond, None) => {
                let mut b = TimestampMillisecondBuilder::with_capacity(sarr.len());
                for opt in sarr.iter() {
                    let ts = opt.and_then(|s| date_parser::parse_timestamp_millis(&clean_str(s)));
                    b.append_option(ts);
                }
                Arc::new(b.finish())
            }
            DataType::Int64 => {
                let mut b = Int64Builder::with_capacity(sarr.len());
                for opt in sarr.iter() {
                    let v = opt.and_then(|s| clean_str(s).parse::<i64>().ok());
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            DataType::Float64 => {
                let mut b = Float64Builder::with_capacity(sarr.len());
                for opt in sarr.iter() {
                    let v = opt.and_then(|s| clean_str(s).parse::<f64>().ok());
                    b.append_option(v);
                }
                Arc::new(b.finish())
            }
            DataType::Utf8 => arr.clone(),
            other => bail!(
                "unsupported conversion target {other} for column {}",
                fld.name()
            ),
        };
        out.push(col);
    }

    RecordBatch::try_new(info.schema.clone(), out).context("rebuilding typed batch")
}
