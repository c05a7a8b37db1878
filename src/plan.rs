//! Works out which published months still need downloading.

use std::path::Path;

use crate::{
    error::{ChirpsError, Result},
    file_name::RemoteFileRecord,
    month::YearMonth,
    probe::AvailabilityReport,
    registry,
};

/// Files to fetch for one dataset, oldest first.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub dataset_code: String,
    pub remote_subdir: String,
    pub records: Vec<RemoteFileRecord>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

pub fn check_range(start: YearMonth, end: YearMonth) -> Result<()> {
    if start > end {
        return Err(ChirpsError::InvalidRange { start, end });
    }
    Ok(())
}

/// Whether `record` needs no further work in `local_dir`. Only existence is
/// checked.
///
/// With `unzip` the unzipped raster must exist; a compressed file alone still
/// has to be unzipped. Without it either file will do.
pub fn is_present(record: &RemoteFileRecord, local_dir: &Path, unzip: bool) -> bool {
    let unzipped = local_dir.join(record.unzipped_name()).exists();
    if unzip {
        return unzipped;
    }
    unzipped || local_dir.join(record.local_name()).exists()
}

pub fn plan(
    report: &AvailabilityReport,
    start: YearMonth,
    end: YearMonth,
    local_dir: &Path,
    unzip: bool,
) -> Result<SyncPlan> {
    check_range(start, end)?;

    let remote_subdir = registry::lookup(&report.dataset_code)?.remote_subdir;

    let mut records: Vec<RemoteFileRecord> = report
        .records()
        .iter()
        .filter(|r| (start..=end).contains(&r.year_month()))
        .filter(|r| !is_present(r, local_dir, unzip))
        .cloned()
        .collect();
    records.sort_by_key(RemoteFileRecord::year_month);

    Ok(SyncPlan {
        dataset_code: report.dataset_code.clone(),
        remote_subdir: remote_subdir.to_string(),
        records,
    })
}

/// Months in `[start, end]` the archive has not published.
pub fn missing_months(report: &AvailabilityReport, start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    start.through(end).filter(|m| !report.contains(*m)).collect()
}

// -- Tests -------------------------------------------------------------------
