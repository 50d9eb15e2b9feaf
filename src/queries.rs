use anyhow::{Context, Result};
use tokio_postgres::{Client, SimpleQueryMessage};
use tracing::debug;

/// Marker comment opening a named query section.
pub const QUESTION_MARKER: &str = "-- Question";

/// A named SQL statement extracted from a query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: String,
    pub sql: String,
}

/// Split a query file into named sections.
///
/// A trimmed line starting with `-- Question` opens a new section, named by
/// the marker text stripped of dashes. Blank lines, other comments, and `=`
/// separator lines are dropped; everything else accumulates verbatim into
/// the open section. Lines before the first marker are discarded, and a
/// marker with no SQL under it yields no query.
pub fn parse_sql_file(content: &str) -> Vec<NamedQuery> {
    let mut queries = Vec::new();
    let mut name: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(QUESTION_MARKER) {
            flush(&mut queries, name.take(), &mut body);
            name = Some(trimmed.trim_matches(|c| c == '-' || c == ' ').to_string());
        } else if trimmed.is_empty() || trimmed.starts_with("--") || trimmed.starts_with('=') {
            continue;
        } else if name.is_some() {
            body.push(line);
        }
    }
    flush(&mut queries, name, &mut body);
    queries
}

fn flush(queries: &mut Vec<NamedQuery>, name: Option<String>, body: &mut Vec<&str>) {
    if let Some(name) = name {
        if !body.is_empty() {
            queries.push(NamedQuery {
                name,
                sql: body.join("\n"),
            });
        }
    }
    body.clear();
}

/// 1-based query selection used by `--query-num`.
pub fn select_query(queries: &[NamedQuery], number: usize) -> Option<&NamedQuery> {
    if (1..=queries.len()).contains(&number) {
        Some(&queries[number - 1])
    } else {
        None
    }
}

/// Execute one named query and print its results pipe-delimited.
pub async fn run_query(client: &Client, query: &NamedQuery) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("{}", query.name);
    println!("{}", "=".repeat(80));

    let messages = client
        .simple_query(&query.sql)
        .await
        .with_context(|| format!("executing {}", query.name))?;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                let header = columns
                    .iter()
                    .map(|c| c.name())
                    .collect::<Vec<_>>()
                    .join(" | ");
                println!("{}", header);
                println!("{}", "-".repeat(header.len()));
            }
            SimpleQueryMessage::Row(row) => {
                let values = (0..row.len())
                    .map(|i| row.get(i).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" | ");
                println!("{}", values);
            }
            SimpleQueryMessage::CommandComplete(rows) => debug!(rows, "command complete"),
            _ => {}
        }
    }
    Ok(())
}
