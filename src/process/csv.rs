use crate::fetch;
use crate::process::utils::parse_header_line;
use anyhow::{bail, Context, Result};
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Look-ahead read of the header line to learn the column set before the
/// streaming pass.
pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let raw = fetch::open_text_reader(path)?;
    let mut lines = BufReader::new(raw);
    let mut first = String::new();
    let n = lines
        .read_line(&mut first)
        .with_context(|| format!("reading header from {}", path.display()))?;
    if n == 0 {
        bail!("{} is empty", path.display());
    }
    Ok(parse_header_line(&first))
}

/// All-nullable Utf8 schema named by `headers`, for the first parse pass.
pub fn utf8_schema(headers: &[String]) -> SchemaRef {
    let fields: Vec<Field> = headers
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Streaming CSV reader yielding all-string batches of at most `chunksize`
/// rows, gzip-transparent.
pub struct CsvChunkReader {
    reader: arrow::csv::Reader<Box<dyn Read + Send>>,
}

impl CsvChunkReader {
    pub fn open(path: &Path, headers: &[String], chunksize: usize) -> Result<Self> {
        let raw = fetch::open_text_reader(path)?;
        let reader = ReaderBuilder::new(utf8_schema(headers))
            .with_header(true)
            .with_batch_size(chunksize)
            .build(raw)
            .context("creating CSV reader")?;
        Ok(Self { reader })
    }
}

impl Iterator for CsvChunkReader {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next().map(|r| r.context("reading CSV batch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_header_and_chunks_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let mut content = String::from("id,name\n");
        for i in 0..7 {
            content.push_str(&format!("{},row{}\n", i, i));
        }
        let path = write_csv(&dir, "data.csv", &content);

        let headers = read_header(&path)?;
        assert_eq!(headers, vec!["id", "name"]);

        let batches: Vec<RecordBatch> = CsvChunkReader::open(&path, &headers, 3)?
            .collect::<Result<_>>()?;
        let sizes: Vec<usize> = batches.iter().map(|b| b.num_rows()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(batches[0].schema().field(0).data_type(), &DataType::Utf8);
        Ok(())
    }

    #[test]
    fn reads_gzipped_csv() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv.gz");
        let file = std::fs::File::create(&path)?;
        let mut gz = GzEncoder::new(file, Compression::default());
        gz.write_all(b"a,b\n1,x\n2,y\n")?;
        gz.finish()?;

        let headers = read_header(&path)?;
        assert_eq!(headers, vec!["a", "b"]);

        let batches: Vec<RecordBatch> = CsvChunkReader::open(&path, &headers, 10)?
            .collect::<Result<_>>()?;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 2);
        Ok(())
    }

    #[test]
    fn empty_file_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_csv(&dir, "empty.csv", "");
        assert!(read_header(&path).is_err());
        Ok(())
    }

    #[test]
    fn header_only_file_yields_no_batches() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_csv(&dir, "header.csv", "a,b\n");
        let headers = read_header(&path)?;
        let mut reader = CsvChunkReader::open(&path, &headers, 10)?;
        assert!(reader.next().is_none());
        Ok(())
    }
}
