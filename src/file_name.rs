//! Archive file names and the records parsed from them.

use std::sync::OnceLock;

use chrono::{Datelike, Local};
use regex::Regex;

use crate::month::YearMonth;

/// Earliest year accepted from a listing. CHIRPS starts in 1981.
const MIN_YEAR: i32 = 1960;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One raster file on the archive, e.g. `chirps-v2.0.2022.01.tif.gz`.
pub struct RemoteFileRecord {
    pub file_name: String,
    pub year: i32,
    pub month: u32,
    pub dataset_code: String,
}

impl RemoteFileRecord {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::from_parts(self.year, self.month)
    }

    /// Name the file is saved under locally, prefixed with the dataset code.
    pub fn local_name(&self) -> String {
        format!("{}_{}", self.dataset_code, self.file_name)
    }

    /// Name of the raster once the gzip wrapper is removed.
    pub fn unzipped_name(&self) -> String {
        let local = self.local_name();
        match local.strip_suffix(".gz") {
            Some(stem) => stem.to_string(),
            None => local,
        }
    }
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^chirps-v2\.0\.(\d{4})\.(\d{2})\.tif\.gz$").unwrap()
    })
}

/// Parses a listing entry. Anything that isn't a monthly CHIRPS raster
/// (READMEs, checksums, sub-directories) gives `None`.
pub fn parse(raw_name: &str, dataset_code: &str) -> Option<RemoteFileRecord> {
    let file_name = raw_name.trim();
    let caps = pattern().captures(file_name)?;

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;

    if !(MIN_YEAR..=Local::now().year() + 1).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }

    Some(RemoteFileRecord {
        file_name: file_name.to_string(),
        year,
        month,
        dataset_code: dataset_code.to_string(),
    })
}

// -- Tests -------------------------------------------------------------------
