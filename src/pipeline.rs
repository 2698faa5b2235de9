use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::extract::{Mode, TableExtractor};
use crate::fetch;
use crate::parser::assemble;
use crate::record::CanonicalRecord;

pub const DEFAULT_OUT_PATH: &str = "bids.json";

/// Repeated header rows and page furniture that slip through as rows.
static FURNITURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)millsap\s*&\s*singer|^sale date\b|^county$|^page \d+( of \d+)?$|^bids online$")
        .unwrap()
});

/// Which assembled records make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Retain {
    /// Every record, all-null ones included.
    All,
    /// Drop records whose fields are all null.
    NonEmpty,
    /// Keep records naming a county, file, case or address, minus page furniture.
    #[default]
    Identity,
}

impl Retain {
    pub fn keeps(self, record: &CanonicalRecord) -> bool {
        match self {
            Retain::All => true,
            Retain::NonEmpty => !record.is_empty(),
            Retain::Identity => {
                let identified = record.county.is_some()
                    || record.ms_file.is_some()
                    || record.case_number.is_some()
                    || record.property_address.is_some();
                identified && !is_furniture(record)
            }
        }
    }
}

fn is_furniture(record: &CanonicalRecord) -> bool {
    [
        &record.county,
        &record.case_number,
        &record.property_address,
        &record.ms_file,
        &record.auction_vendor,
    ]
    .into_iter()
    .flatten()
    .any(|v| FURNITURE_RE.is_match(v))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub out: PathBuf,
    pub mode: Mode,
    pub retain: Retain,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: fetch::DEFAULT_PDF_URL.to_string(),
            out: PathBuf::from(DEFAULT_OUT_PATH),
            mode: Mode::default(),
            retain: Retain::default(),
        }
    }
}

/// PDF bytes → ordered records. Fails when the extractor finds no rows or
/// when nothing survives the retention policy.
pub fn build(
    pdf: &[u8],
    extractor: &dyn TableExtractor,
    retain: Retain,
) -> Result<Vec<CanonicalRecord>> {
    let rows = extractor.extract(pdf)?;
    if rows.is_empty() {
        return Err(Error::Extraction(format!(
            "no table rows found with the {} strategy",
            extractor.name()
        )));
    }
    info!("Extracted {} raw rows ({})", rows.len(), extractor.name());

    let records: Vec<CanonicalRecord> = rows
        .iter()
        .map(assemble)
        .filter(|r| retain.keeps(r))
        .collect();
    debug!(dropped = rows.len() - records.len(), ?retain, "retention applied");

    if records.is_empty() {
        return Err(Error::Extraction(format!(
            "{} rows extracted but none kept by the {:?} policy",
            rows.len(),
            retain
        )));
    }
    Ok(records)
}

/// Serialize the whole document, then move it into place.
pub fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(records).map_err(|e| write_err(e.into()))?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })?;
    Ok(())
}

/// Build and write; nothing touches `out` unless the build succeeds.
pub fn convert(
    pdf: &[u8],
    extractor: &dyn TableExtractor,
    retain: Retain,
    out: &Path,
) -> Result<usize> {
    let records = build(pdf, extractor, retain)?;
    write_records(out, &records)?;
    info!("Wrote {} records to {}", records.len(), out.display());
    Ok(records.len())
}

/// Fetch → extract → assemble → write. Returns the number of records written.
pub async fn run(config: &Config) -> Result<usize> {
    let t0 = Instant::now();
    let pdf = fetch::fetch_pdf(&config.url).await?;
    info!("Fetched in {:.1}s", t0.elapsed().as_secs_f64());

    let extractor = config.mode.extractor();
    convert(&pdf, extractor.as_ref(), config.retain, &config.out)
}
