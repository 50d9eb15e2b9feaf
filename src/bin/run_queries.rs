use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use tracing_subscriber::{fmt, EnvFilter};
use tripload::db::{self, PgConfig};
use tripload::queries::{self, parse_sql_file};

/// Run named SQL queries from a file against PostgreSQL.
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

    /// SQL file with `-- Question` delimited queries
    #[arg(long = "sql-file", default_value = "queries.sql")]
    sql_file: String,

    /// Run only the given query (1-based)
    #[arg(long = "query-num")]
    query_num: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    let content =
        fs::read_to_string(&cli.sql_file).with_context(|| format!("reading {}", cli.sql_file))?;
    let parsed = parse_sql_file(&content);
    if parsed.is_empty() {
        println!("No queries found in {}", cli.sql_file);
        return Ok(());
    }
    println!("Found {} queries in {}", parsed.len(), cli.sql_file);

    let config = PgConfig {
        user: cli.pg_user,
        password: cli.pg_pass,
        host: cli.pg_host,
        port: cli.pg_port,
        dbname: cli.pg_db,
    };

    match cli.query_num {
        Some(number) => {
            let Some(query) = queries::select_query(&parsed, number) else {
                println!(
                    "Error: query number must be between 1 and {}",
                    parsed.len()
                );
                return Ok(());
            };
            let client = db::connect(&config).await?;
            queries::run_query(&client, query).await?;
        }
        None => {
            let client = db::connect(&config).await?;
            for query in &parsed {
                queries::run_query(&client, query).await?;
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("QUERIES COMPLETE");
    println!("{}", "=".repeat(80));
    Ok(())
}
