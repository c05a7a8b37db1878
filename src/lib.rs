//! Incremental downloads of CHIRPS-2.0 monthly rainfall rasters.
//!
//! The pipeline runs one way: the [`registry`] resolves a dataset code, the
//! [`probe`] lists what the archive has published, the [`plan`] keeps what is
//! in range and not already on disk, and the [`download`] fetcher transfers
//! and unzips it. The local directory is the only state; running the same
//! request twice downloads nothing the second time.
//!
//! ```no_run
//! use chirps::{HttpArchive, FetchOptions, SyncRequest, DEFAULT_BASE_URL};
//! use indicatif::ProgressBar;
//! use std::time::Duration;
//!
//! # async fn run() -> chirps::Result<()> {
//! let archive = HttpArchive::new(DEFAULT_BASE_URL, Duration::from_secs(60))?;
//! let request = SyncRequest::new(
//!     "africa_monthly",
//!     "2022-01".parse()?,
//!     Some("2022-03".parse()?),
//!     "chirps_data".into(),
//! );
//! let outcomes = chirps::sync(&archive, &request, &FetchOptions::default(), ProgressBar::hidden()).await?;
//! println!("{} file(s) attempted", outcomes.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod file_name;
pub mod month;
pub mod plan;
pub mod probe;
pub mod registry;
pub mod retry;
pub mod sync;

pub use archive::{HttpArchive, RemoteArchive, DEFAULT_BASE_URL};
pub use config::Config;
pub use download::{DownloadOutcome, FetchOptions, Fetcher, FileState};
pub use error::{ChirpsError, Result};
pub use file_name::RemoteFileRecord;
pub use month::YearMonth;
pub use plan::SyncPlan;
pub use probe::AvailabilityReport;
pub use registry::{DatasetDescriptor, Frequency};
pub use retry::RetryPolicy;
pub use sync::{sync, SyncRequest};
