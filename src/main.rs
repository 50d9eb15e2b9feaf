use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use tripload::db::{self, PgConfig};
use tripload::ingest::{self, FileFormat, IngestOptions};

/// Load a CSV or parquet file (URL or local path) into a PostgreSQL table.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// PostgreSQL username
    #[arg(long = "pg-user", default_value = "root")]
    pg_user: String,

    /// PostgreSQL password
    #[arg(long = "pg-pass", default_value = "root")]
    pg_pass: String,

    /// PostgreSQL host
    #[arg(long = "pg-host", default_value = "localhost")]
    pg_host: String,

    /// PostgreSQL port
    #[arg(long = "pg-port", default_value_t = 5432)]
    pg_port: u16,

    /// PostgreSQL database name
    #[arg(long = "pg-db", default_value = "ny_taxi")]
    pg_db: String,

    /// URL or local file path
    #[arg(long)]
    url: String,

    /// Target table name
    #[arg(long)]
    table: String,

    /// File format (auto-detected from the suffix if not specified)
    #[arg(long, value_enum, ignore_case = true)]
    format: Option<FileFormat>,

    /// Number of rows per insert chunk
    #[arg(long, default_value_t = 100_000)]
    chunksize: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    let config = PgConfig {
        user: cli.pg_user,
        password: cli.pg_pass,
        host: cli.pg_host,
        port: cli.pg_port,
        dbname: cli.pg_db,
    };
    let client = db::connect(&config).await?;

    let options = IngestOptions {
        location: cli.url,
        table: cli.table,
        format: cli.format,
        chunksize: cli.chunksize,
    };
    let rows = ingest::ingest_data(&client, &options).await?;
    info!(rows, table = %options.table, "ingestion complete");
    Ok(())
}
