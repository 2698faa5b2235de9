use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};

pub const DEFAULT_PDF_URL: &str = "https://www.msfirm.com/bids/bidsonline.pdf";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const USER_AGENT: &str = concat!("bids/", env!("CARGO_PKG_VERSION"));

/// Fetch the PDF from an http(s) URL, or read it from disk for any other source.
pub async fn fetch_pdf(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        download(source).await
    } else {
        read_local(source).await
    }
    .map_err(|e| Error::Fetch {
        source_url: source.to_string(),
        source: e,
    })?;

    if !bytes.starts_with(b"%PDF-") {
        warn!("{} does not look like a PDF ({} bytes)", source, bytes.len());
    }
    Ok(bytes)
}

async fn download(url: &str) -> std::result::Result<Vec<u8>, crate::error::BoxError> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    info!("Fetching bids PDF: {}", url);
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

async fn read_local(source: &str) -> std::result::Result<Vec<u8>, crate::error::BoxError> {
    let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
    info!("Reading bids PDF from {}", path.display());
    Ok(tokio::fs::read(path).await?)
}
