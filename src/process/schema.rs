use crate::process::trips::TripCoercions;
use crate::process::utils::clean_str;
use anyhow::{Context, Result};
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Final schema for the destination table + which columns need date parsing.
pub struct SchemaInfo {
    pub schema: SchemaRef,
    pub date_columns: Vec<String>,
}

/// Decide the final column types from the first all-string batch.
///
/// Domain coercions win where they apply; every other column is inferred
/// from its values: all-integer → Int64, all-numeric → Float64, otherwise
/// Utf8. Inference never yields timestamps; those only come from the plan.
pub fn analyze_first_batch(
    batch: &RecordBatch,
    coercions: Option<&TripCoercions>,
) -> Result<SchemaInfo> {
    let source = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut date_columns = Vec::new();

    for (i, field) in source.fields().iter().enumerate() {
        let name = field.name();
        if let Some(plan) = coercions {
            if plan.date_columns.iter().any(|c| c == name) {
                date_columns.push(name.clone());
                fields.push(Field::new(
                    name,
                    DataType::Timestamp(TimeUnit::Millisecond, None),
                    true,
                ));
                continue;
            }
            if let Some(ty) = plan.types.get(name) {
                fields.push(Field::new(name, ty.clone(), true));
                continue;
            }
        }

        let col = batch
            .column(i)
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| format!("column {name} was not read as strings"))?;
        fields.push(Field::new(name, infer_value_type(col), true));
    }

    Ok(SchemaInfo {
        schema: Arc::new(Schema::new(fields)),
        date_columns,
    })
}

/// Narrowest of Int64 → Float64 → Utf8 that fits every non-empty value.
fn infer_value_type(col: &StringArray) -> DataType {
    let mut seen = false;
    let mut all_int = true;
    let mut all_float = true;

    for opt in col.iter() {
        let Some(raw) = opt else { continue };
        let value = clean_str(raw);
        if value.is_empty() {
            continue;
        }
        seen = true;
        if all_int && value.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && value.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }

    if !seen {
        DataType::Utf8
    } else if all_int {
        DataType::Int64
    } else if all_float {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}
