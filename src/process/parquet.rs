use anyhow::{Context, Result};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Decode an entire parquet file into a single in-memory batch.
pub fn read_table(data: Bytes) -> Result<RecordBatch> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("creating parquet reader")?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("decoding parquet row groups")?;
    concat_batches(&schema, &batches).context("concatenating parquet batches")
}

/// Fixed-size row slices of `batch`; the last slice holds the remainder.
pub fn chunk_slices(batch: &RecordBatch, chunksize: usize) -> Vec<RecordBatch> {
    let total = batch.num_rows();
    let mut out = Vec::with_capacity(total.div_ceil(chunksize.max(1)));
    let mut offset = 0;
    while offset < total {
        let len = chunksize.min(total - offset);
        out.push(batch.slice(offset, len));
        offset += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    fn sample_batch(rows: i64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
        ]));
        let ids = Int64Array::from_iter_values(0..rows);
        let names: StringArray = (0..rows).map(|i| Some(format!("row{i}"))).collect();
        RecordBatch::try_new(
            schema,
            vec![Arc::new(ids) as ArrayRef, Arc::new(names) as ArrayRef],
        )
        .unwrap()
    }

    fn to_parquet_bytes(batch: &RecordBatch) -> Result<Bytes> {
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None)?;
        writer.write(batch)?;
        writer.close()?;
        Ok(Bytes::from(buf))
    }

    #[test]
    fn round_trips_a_whole_file() -> Result<()> {
        let batch = sample_batch(10);
        let table = read_table(to_parquet_bytes(&batch)?)?;
        assert_eq!(table.num_rows(), 10);
        assert_eq!(table.num_columns(), 2);

        let ids = table
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(9), 9);
        Ok(())
    }

    #[test]
    fn slices_cover_every_row_exactly_once() {
        let batch = sample_batch(10);
        let slices = chunk_slices(&batch, 3);
        let sizes: Vec<usize> = slices.iter().map(|s| s.num_rows()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
        assert_eq!(sizes.iter().sum::<usize>(), 10);

        // slice boundaries line up with the source rows
        let last = slices.last().unwrap();
        let ids = last
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 9);
    }

    #[test]
    fn chunk_count_matches_ceiling_division() {
        let batch = sample_batch(9);
        assert_eq!(chunk_slices(&batch, 3).len(), 3);
        assert_eq!(chunk_slices(&batch, 4).len(), 3);
        assert_eq!(chunk_slices(&batch, 9).len(), 1);
        assert_eq!(chunk_slices(&batch, 100).len(), 1);
    }

    #[test]
    fn empty_table_produces_no_slices() -> Result<()> {
        let batch = sample_batch(0);
        let table = read_table(to_parquet_bytes(&batch)?)?;
        assert_eq!(table.num_rows(), 0);
        assert!(chunk_slices(&table, 5).is_empty());
        Ok(())
    }
}
