//! One-call sync: registry, probe, plan, fetch.

use std::path::PathBuf;

use indicatif::ProgressBar;
use log::{info, warn};

use crate::{
    archive::RemoteArchive,
    download::{DownloadOutcome, FetchOptions, Fetcher},
    error::Result,
    month::YearMonth,
    plan::{check_range, missing_months, plan},
    probe::probe,
    registry,
};

#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub dataset: String,
    pub start: YearMonth,
    /// Defaults to `start`.
    pub end: Option<YearMonth>,
    pub out_dir: PathBuf,
    pub unzip: bool,
}

impl SyncRequest {
    pub fn new(dataset: &str, start: YearMonth, end: Option<YearMonth>, out_dir: PathBuf) -> Self {
        SyncRequest {
            dataset: dataset.to_string(),
            start,
            end,
            out_dir,
            unzip: true,
        }
    }

    pub fn end(&self) -> YearMonth {
        self.end.unwrap_or(self.start)
    }
}

/// Brings `request.out_dir` up to date for the requested months.
///
/// The dataset and range are checked before anything touches the network.
/// The listing is retried with `options.retry`; per-file failures come back
/// in the outcomes.
pub async fn sync<A>(
    archive: &A,
    request: &SyncRequest,
    options: &FetchOptions,
    progress: ProgressBar,
) -> Result<Vec<DownloadOutcome>>
where
    A: RemoteArchive + ?Sized,
{
    let descriptor = registry::lookup(&request.dataset)?;
    let (start, end) = (request.start, request.end());
    check_range(start, end)?;

    info!("=== Downloading CHIRPS: {} ===", descriptor.label);

    let report = options
        .retry
        .run(descriptor.remote_subdir, move || probe(archive, descriptor))
        .await?;

    let unpublished = missing_months(&report, start, end);
    if !unpublished.is_empty() {
        let months: Vec<String> = unpublished.iter().map(|m| m.to_string()).collect();
        warn!("Not available on the archive: {}", months.join(", "));
    }

    let plan = plan(&report, start, end, &request.out_dir, request.unzip)?;
    info!(
        "{} file(s) to download into {}",
        plan.len(),
        request.out_dir.display()
    );

    let outcomes = Fetcher::new(archive, options.clone())
        .with_progress(progress)
        .fetch(&plan, &request.out_dir, request.unzip)
        .await?;

    info!("✓ All CHIRPS files processed");

    Ok(outcomes)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        archive::memory::{gzipped, MemoryArchive},
        error::ChirpsError,
        retry::RetryPolicy,
    };

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn archive() -> MemoryArchive {
        MemoryArchive::new()
            .with_file("chirps-v2.0.2022.01.tif.gz", gzipped(b"jan"))
            .with_file("chirps-v2.0.2022.02.tif.gz", gzipped(b"feb"))
            .with_listed("README.txt")
    }

    #[tokio::test]
    async fn should_sync_published_months() {
        let dir = TempDir::new().unwrap();
        let archive = archive();
        let request = SyncRequest::new(
            "africa_monthly",
            ym(2022, 1),
            Some(ym(2022, 3)),
            dir.path().to_path_buf(),
        );

        let outcomes = sync(&archive, &request, &FetchOptions::default(), ProgressBar::hidden())
            .await
            .unwrap();

        let months: Vec<YearMonth> = outcomes.iter().map(|o| o.month).collect();
        assert_eq!(months, vec![ym(2022, 1), ym(2022, 2)]);
        assert!(outcomes.iter().all(|o| o.succeeded && o.unzipped));
        assert!(dir
            .path()
            .join("africa_monthly_chirps-v2.0.2022.02.tif")
            .exists());
    }

    #[tokio::test]
    async fn should_only_fetch_the_remainder_on_rerun() {
        let dir = TempDir::new().unwrap();
        let archive = archive();
        let jan_only = SyncRequest::new("africa_monthly", ym(2022, 1), None, dir.path().to_path_buf());
        let both = SyncRequest::new(
            "africa_monthly",
            ym(2022, 1),
            Some(ym(2022, 2)),
            dir.path().to_path_buf(),
        );
        let options = FetchOptions::default();

        sync(&archive, &jan_only, &options, ProgressBar::hidden()).await.unwrap();
        let second = sync(&archive, &both, &options, ProgressBar::hidden()).await.unwrap();
        let third = sync(&archive, &both, &options, ProgressBar::hidden()).await.unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].month, ym(2022, 2));
        assert!(third.is_empty());
        assert_eq!(archive.open_calls(), 2);
    }

    #[tokio::test]
    async fn should_reject_inverted_range_before_listing() {
        let dir = TempDir::new().unwrap();
        let archive = archive();
        let request = SyncRequest::new(
            "africa_monthly",
            ym(2022, 3),
            Some(ym(2022, 1)),
            dir.path().to_path_buf(),
        );

        let result = sync(&archive, &request, &FetchOptions::default(), ProgressBar::hidden()).await;

        assert!(matches!(result, Err(ChirpsError::InvalidRange { .. })));
        assert_eq!(archive.list_calls(), 0);
    }

    #[tokio::test]
    async fn should_reject_unknown_dataset_before_listing() {
        let dir = TempDir::new().unwrap();
        let archive = archive();
        let request = SyncRequest::new("mars_monthly", ym(2022, 1), None, dir.path().to_path_buf());

        let result = sync(&archive, &request, &FetchOptions::default(), ProgressBar::hidden()).await;

        assert!(matches!(result, Err(ChirpsError::UnknownDataset(_))));
        assert_eq!(archive.list_calls(), 0);
    }

    #[tokio::test]
    async fn should_retry_listing_then_surface_network_error() {
        let dir = TempDir::new().unwrap();
        let archive = MemoryArchive::new().offline();
        let request = SyncRequest::new("africa_monthly", ym(2022, 1), None, dir.path().to_path_buf());
        let options = FetchOptions {
            retry: RetryPolicy::new(2, Duration::ZERO, 2.0),
            ..FetchOptions::default()
        };

        let result = sync(&archive, &request, &options, ProgressBar::hidden()).await;

        assert!(matches!(result, Err(ChirpsError::Network(_))));
        assert_eq!(archive.list_calls(), 2);
    }
}
