//! Catalog acquisition: open a local file or stream a URL, with transparent gzip.
//!
//! Compression is detected from the stream's magic bytes rather than the file
//! extension, so `hygdata.csv.gz`, an extension-less download, and a plain CSV
//! all go through the same entry point. Nothing here buffers the whole payload.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

use flate2::bufread::MultiGzDecoder;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::EngineError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const READ_BUFFER_BYTES: usize = 1 << 20;

/// Where a catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Path(PathBuf),
    Url(String),
}

impl CatalogLocation {
    /// Treat `http://` and `https://` as URLs, anything else as a path.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            CatalogLocation::Url(raw.to_string())
        } else {
            CatalogLocation::Path(PathBuf::from(raw))
        }
    }

    pub fn label(&self) -> String {
        match self {
            CatalogLocation::Path(p) => p.display().to_string(),
            CatalogLocation::Url(u) => u.clone(),
        }
    }
}

/// An opened, possibly decompressing, catalog byte stream.
pub struct CatalogStream {
    pub reader: Box<dyn Read + Send>,
    pub compressed: bool,
    pub label: String,
    /// Source URL for downloaded catalogs; read errors become `DownloadFailure`.
    pub remote: Option<String>,
}

impl std::fmt::Debug for CatalogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStream")
            .field("compressed", &self.compressed)
            .field("label", &self.label)
            .field("remote", &self.remote)
            .finish()
    }
}

/// Open `location` for streaming.
pub fn open_source(location: &CatalogLocation) -> Result<CatalogStream, EngineError> {
    let label = location.label();
    match location {
        CatalogLocation::Path(path) => {
            let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
            info!(path = %path.display(), "opened catalog file");
            wrap_stream(Box::new(file), label, None)
        }
        CatalogLocation::Url(url) => {
            let resp = download(url)?;
            wrap_stream(Box::new(resp), label, Some(url.clone()))
        }
    }
}

/// Sniff the first bytes of `raw` and add a gzip decoder when needed.
pub fn wrap_stream(
    raw: Box<dyn Read + Send>,
    label: String,
    remote: Option<String>,
) -> Result<CatalogStream, EngineError> {
    let mut buffered = BufReader::with_capacity(READ_BUFFER_BYTES, raw);
    let head = buffered.fill_buf().map_err(|e| match &remote {
        Some(url) => EngineError::DownloadFailure {
            url: url.clone(),
            source: Box::new(e),
        },
        None => EngineError::io(label.clone(), e),
    })?;
    let compressed = head.starts_with(&GZIP_MAGIC);
    debug!(%label, compressed, "sniffed catalog stream");

    let reader: Box<dyn Read + Send> = if compressed {
        Box::new(MultiGzDecoder::new(buffered))
    } else {
        Box::new(buffered)
    };
    Ok(CatalogStream {
        reader,
        compressed,
        label,
        remote,
    })
}

fn download(url: &str) -> Result<reqwest::blocking::Response, EngineError> {
    let failure = |source: reqwest::Error| EngineError::DownloadFailure {
        url: url.to_string(),
        source: Box::new(source),
    };

    // Large catalogs take minutes to stream; only the connect phase is bounded.
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Option::<Duration>::None)
        .build()
        .map_err(failure)?;

    info!(%url, "downloading catalog");
    let resp = client.get(url).send().map_err(failure)?;
    let resp = resp.error_for_status().map_err(failure)?;
    if let Some(len) = resp.content_length() {
        info!(bytes = len, "catalog download started");
    }
    Ok(resp)
}
