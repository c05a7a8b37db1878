//! Discovers which months a dataset has on the archive.

use log::{debug, info};

use crate::{
    archive::RemoteArchive,
    error::Result,
    file_name::{self, RemoteFileRecord},
    month::YearMonth,
    registry::DatasetDescriptor,
};

/// Files published for one dataset, newest first.
#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    pub dataset_code: String,
    records: Vec<RemoteFileRecord>,
}

impl AvailabilityReport {
    pub fn new(dataset_code: &str, mut records: Vec<RemoteFileRecord>) -> Self {
        records.retain(|r| r.dataset_code == dataset_code);
        records.sort_by(|a, b| b.year_month().cmp(&a.year_month()));
        records.dedup_by(|a, b| a.file_name == b.file_name);

        AvailabilityReport {
            dataset_code: dataset_code.to_string(),
            records,
        }
    }

    pub fn records(&self) -> &[RemoteFileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min_date(&self) -> Option<YearMonth> {
        self.records.last().map(RemoteFileRecord::year_month)
    }

    pub fn max_date(&self) -> Option<YearMonth> {
        self.records.first().map(RemoteFileRecord::year_month)
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.records.iter().any(|r| r.year_month() == month)
    }
}

/// Lists the dataset's remote directory and keeps the entries that parse as
/// monthly rasters. A failed listing is returned as is; retrying is up to the
/// caller.
pub async fn probe<A>(archive: &A, descriptor: &DatasetDescriptor) -> Result<AvailabilityReport>
where
    A: RemoteArchive + ?Sized,
{
    let entries = archive.list(descriptor.remote_subdir).await?;
    let total = entries.len();

    let records: Vec<RemoteFileRecord> = entries
        .iter()
        .filter_map(|entry| file_name::parse(entry, descriptor.code))
        .collect();
    let report = AvailabilityReport::new(descriptor.code, records);

    debug!(
        "{}: {} of {} listing entries are rasters",
        descriptor.code,
        report.len(),
        total
    );

    match (report.min_date(), report.max_date()) {
        (Some(min), Some(max)) => info!(
            "✓ {}: Data available from {} to {}.",
            descriptor.code,
            min.label(),
            max.label()
        ),
        _ => info!("No valid CHIRPS files found for {}.", descriptor.code),
    }

    Ok(report)
}

// -- Tests -------------------------------------------------------------------
