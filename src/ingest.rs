use crate::{db, fetch, process};
use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use reqwest::Client;
use std::time::Instant;
use tokio_postgres::Client as PgClient;
use tracing::info;

/// Supported input file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    /// An explicit flag wins; otherwise the location suffix decides.
    pub fn resolve(explicit: Option<FileFormat>, location: &str) -> Result<FileFormat> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        if location.ends_with(".parquet") {
            Ok(FileFormat::Parquet)
        } else if location.ends_with(".csv") || location.ends_with(".csv.gz") {
            Ok(FileFormat::Csv)
        } else {
            bail!("cannot auto-detect format for {location}; pass --format")
        }
    }
}

/// What to load and where to put it.
pub struct IngestOptions {
    pub location: String,
    pub table: String,
    pub format: Option<FileFormat>,
    pub chunksize: usize,
}

/// Load the file at `options.location` into `options.table`.
///
/// The destination table is created from the first batch's schema, replacing
/// any existing table, and the remaining batches are appended in order.
/// Returns the total number of rows loaded.
#[tracing::instrument(level = "info", skip(pg, options), fields(table = %options.table))]
pub async fn ingest_data(pg: &PgClient, options: &IngestOptions) -> Result<u64> {
    if options.chunksize == 0 {
        bail!("chunksize must be positive");
    }
    let format = FileFormat::resolve(options.format, &options.location)?;
    info!(format = ?format, location = %options.location, "ingesting");

    let http = Client::new();
    match format {
        FileFormat::Parquet => ingest_parquet(pg, &http, options).await,
        FileFormat::Csv => ingest_csv(pg, &http, options).await,
    }
}

/// Parquet files are decoded whole, then appended in fixed-size row slices.
async fn ingest_parquet(pg: &PgClient, http: &Client, options: &IngestOptions) -> Result<u64> {
    let data = fetch::fetch_bytes(http, &options.location).await?;
    let records = process::parquet::read_table(data)?;
    info!(
        rows = records.num_rows(),
        columns = records.num_columns(),
        "decoded parquet"
    );

    let schema = records.schema();
    db::create_table(pg, &options.table, schema.as_ref()).await?;
    info!(table = %options.table, "table created");

    let mut total = 0u64;
    for slice in process::parquet::chunk_slices(&records, options.chunksize) {
        let start = Instant::now();
        let rows = db::append_batch(pg, &options.table, &slice).await?;
        total += rows;
        info!(rows, total, elapsed = ?start.elapsed(), "inserted chunk");
    }

    info!(rows = total, table = %options.table, "done ingesting");
    Ok(total)
}

/// CSV files are streamed in chunks; the first chunk fixes the schema.
async fn ingest_csv(pg: &PgClient, http: &Client, options: &IngestOptions) -> Result<u64> {
    let scratch = tempfile::tempdir().context("creating scratch directory")?;
    let path = fetch::localize(http, &options.location, scratch.path()).await?;

    let headers = process::csv::read_header(&path)?;
    let coercions = process::trips::coercions_for(&headers);
    if coercions.is_some() {
        info!("trip record columns detected; applying known coercions");
    }

    let mut chunks = process::csv::CsvChunkReader::open(&path, &headers, options.chunksize)?;
    let first = chunks
        .next()
        .ok_or_else(|| anyhow!("{} contains no data rows", options.location))??;

    let schema_info = process::schema::analyze_first_batch(&first, coercions.as_ref())?;
    db::create_table(pg, &options.table, schema_info.schema.as_ref()).await?;
    info!(
        table = %options.table,
        columns = schema_info.schema.fields().len(),
        "table created"
    );

    let mut total = 0u64;
    let start = Instant::now();
    let typed = process::convert::convert_batch(&first, &schema_info)?;
    let rows = db::append_batch(pg, &options.table, &typed).await?;
    total += rows;
    info!(rows, total, elapsed = ?start.elapsed(), "inserted first chunk");

    for batch in chunks {
        let batch = batch?;
        let start = Instant::now();
        let typed = process::convert::convert_batch(&batch, &schema_info)?;
        let rows = db::append_batch(pg, &options.table, &typed).await?;
        total += rows;
        info!(rows, total, elapsed = ?start.elapsed(), "inserted chunk");
    }

    info!(rows = total, table = %options.table, "done ingesting");
    Ok(total)
}
