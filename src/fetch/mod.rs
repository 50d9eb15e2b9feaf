use anyhow::{bail, Context, Result};
use bytes::Bytes;
use flate2::read::GzDecoder;
use futures::StreamExt;
use reqwest::Client;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;
use url::Url;

pub fn is_url(location: &str) -> bool {
    matches!(Url::parse(location), Ok(u) if u.scheme() == "http" || u.scheme() == "https")
}

/// Download `url_str` into `dest_dir`, keeping the original filename so the
/// suffix (and any `.gz`) survives. Returns the full path of the saved file.
pub async fn download_file(client: &Client, url_str: &str, dest_dir: &Path) -> Result<PathBuf> {
    let url = Url::parse(url_str)?;
    let filename = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.dat");
    let dest_path = dest_dir.join(filename);

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;

    let mut out = tokio::fs::File::create(&dest_path)
        .await
        .with_context(|| format!("creating {}", dest_path.display()))?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("reading body from {}", url))?;
        written += chunk.len() as u64;
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    info!(bytes = written, path = %dest_path.display(), "downloaded");
    Ok(dest_path)
}

/// Resolve `location` to a local file: URLs are downloaded into
/// `scratch_dir`, existing paths are used as-is.
pub async fn localize(client: &Client, location: &str, scratch_dir: &Path) -> Result<PathBuf> {
    if is_url(location) {
        return download_file(client, location, scratch_dir).await;
    }
    let path = PathBuf::from(location);
    if !path.is_file() {
        bail!("no such file: {}", path.display());
    }
    Ok(path)
}

/// Fetch the entire object at `location` into memory.
pub async fn fetch_bytes(client: &Client, location: &str) -> Result<Bytes> {
    if is_url(location) {
        let resp = client
            .get(location)
            .send()
            .await
            .with_context(|| format!("GET {}", location))?
            .error_for_status()?;
        resp.bytes()
            .await
            .with_context(|| format!("reading body from {}", location))
    } else {
        let data = tokio::fs::read(location)
            .await
            .with_context(|| format!("reading {}", location))?;
        Ok(Bytes::from(data))
    }
}

/// Open `path` for sequential reading, transparently decompressing `.gz`.
pub fn open_text_reader(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
