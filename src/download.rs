//! Downloads planned files and optionally unzips them.

use std::{
    fs::{self, File},
    io::{self, BufReader, Read, Write},
    path::Path,
};

use flate2::read::GzDecoder;
use futures::StreamExt;
use indicatif::ProgressBar;
use log::{info, warn};
use tempfile::NamedTempFile;

use crate::{
    archive::RemoteArchive,
    error::{ChirpsError, Result},
    file_name::RemoteFileRecord,
    month::YearMonth,
    plan::SyncPlan,
    retry::RetryPolicy,
};

/// Where a single file got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Transferring,
    Transferred,
    TransferFailed,
    Unzipped,
    UnzipFailed,
}

#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Local name of the compressed file.
    pub file_name: String,
    pub month: YearMonth,
    pub state: FileState,
    pub succeeded: bool,
    pub unzipped: bool,
    pub error: Option<String>,
    pub bytes: u64,
}

impl DownloadOutcome {
    fn pending(record: &RemoteFileRecord) -> Self {
        DownloadOutcome {
            file_name: record.local_name(),
            month: record.year_month(),
            state: FileState::Pending,
            succeeded: false,
            unzipped: false,
            error: None,
            bytes: 0,
        }
    }

    fn finish(mut self, state: FileState, error: Option<ChirpsError>) -> Self {
        self.state = state;
        self.succeeded = matches!(state, FileState::Transferred | FileState::Unzipped);
        self.unzipped = state == FileState::Unzipped;
        self.error = error.map(|e| e.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Keep the `.tif.gz` after it has been unzipped.
    pub keep_compressed: bool,
    /// Applied to each file transfer.
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            keep_compressed: true,
            retry: RetryPolicy::none(),
        }
    }
}

pub struct Fetcher<'a, A: ?Sized> {
    archive: &'a A,
    options: FetchOptions,
    progress: ProgressBar,
}

impl<'a, A> Fetcher<'a, A>
where
    A: RemoteArchive + ?Sized,
{
    pub fn new(archive: &'a A, options: FetchOptions) -> Self {
        Fetcher {
            archive,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Advances `progress` by one for every file attempted.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every planned file in order. Per-file failures are recorded in
    /// the outcomes; only an unusable `local_dir` fails the whole batch.
    pub async fn fetch(
        &self,
        plan: &SyncPlan,
        local_dir: &Path,
        unzip: bool,
    ) -> Result<Vec<DownloadOutcome>> {
        ensure_writable(local_dir)?;

        self.progress.set_length(plan.len() as u64);
        let mut outcomes = Vec::with_capacity(plan.len());

        for record in &plan.records {
            self.progress.set_message(record.local_name());

            let outcome = self
                .fetch_one(&plan.remote_subdir, record, local_dir, unzip)
                .await;
            match &outcome.error {
                None => info!("✓ {} ({:?})", outcome.file_name, outcome.state),
                Some(e) => warn!("✗ Failed {}: {}", outcome.file_name, e),
            }

            self.progress.inc(1);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn fetch_one(
        &self,
        remote_subdir: &str,
        record: &RemoteFileRecord,
        local_dir: &Path,
        unzip: bool,
    ) -> DownloadOutcome {
        let mut outcome = DownloadOutcome::pending(record);

        let compressed = local_dir.join(record.local_name());
        let unzipped = local_dir.join(record.unzipped_name());

        // Left over from a run without unzip, or from a failed unzip.
        if unzip && compressed.exists() {
            match gunzip(&compressed, &unzipped) {
                Ok(_) => return self.finish_unzipped(outcome, &compressed),
                Err(e) => {
                    warn!("Discarding {}: {}", compressed.display(), e);
                    if let Err(e) = fs::remove_file(&compressed) {
                        return outcome.finish(FileState::UnzipFailed, Some(e.into()));
                    }
                }
            }
        }

        outcome.state = FileState::Transferring;
        let remote_name = record.file_name.as_str();
        let dest = compressed.as_path();

        let transfer = self
            .options
            .retry
            .run(remote_name, move || {
                self.transfer(remote_subdir, remote_name, local_dir, dest)
            })
            .await;

        match transfer {
            Ok(bytes) => outcome.bytes = bytes,
            Err(e) => return outcome.finish(FileState::TransferFailed, Some(e)),
        }

        if !unzip {
            return outcome.finish(FileState::Transferred, None);
        }

        if let Err(e) = gunzip(&compressed, &unzipped) {
            return outcome.finish(FileState::UnzipFailed, Some(e));
        }

        self.finish_unzipped(outcome, &compressed)
    }

    fn finish_unzipped(&self, outcome: DownloadOutcome, compressed: &Path) -> DownloadOutcome {
        if !self.options.keep_compressed {
            if let Err(e) = fs::remove_file(compressed) {
                warn!("Could not remove {}: {}", compressed.display(), e);
            }
        }

        outcome.finish(FileState::Unzipped, None)
    }

    /// Streams one remote file into `dest`. The bytes land in a hidden
    /// temporary file first, so `dest` only appears once complete.
    async fn transfer(
        &self,
        remote_subdir: &str,
        remote_name: &str,
        local_dir: &Path,
        dest: &Path,
    ) -> Result<u64> {
        let mut stream = self.archive.open(remote_subdir, remote_name).await?;

        let mut file = partial_file(local_dir)?;
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
        }

        file.flush()?;
        file.persist(dest).map_err(|e| ChirpsError::Io(e.error))?;

        Ok(downloaded)
    }
}

/// Decompresses the gzip file at `src` into `dest`, leaving `src` alone.
pub fn gunzip(src: &Path, dest: &Path) -> Result<u64> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));

    let decoder = GzDecoder::new(BufReader::new(File::open(src)?));
    let mut file = partial_file(dir)?;

    let size = inflate(decoder, &mut file).map_err(|e| match e {
        ChirpsError::Decompress(msg) => ChirpsError::Decompress(format!("{}: {}", src.display(), msg)),
        other => other,
    })?;
    file.persist(dest).map_err(|e| ChirpsError::Io(e.error))?;

    Ok(size)
}

/// Copies decoded bytes into `out`. Failures reading the gzip stream are
/// `Decompress`; failures writing `out` are `Io`.
fn inflate<R: Read, W: Write>(mut decoder: R, out: &mut W) -> Result<u64> {
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;

    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ChirpsError::Decompress(e.to_string())),
        };
        out.write_all(&buf[..n])?;
        size += n as u64;
    }
    out.flush()?;

    Ok(size)
}

fn partial_file(dir: &Path) -> io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".chirps-")
        .suffix(".part")
        .tempfile_in(dir)
}

/// Creates `dir` if needed and checks a file can be written in it.
fn ensure_writable(dir: &Path) -> Result<()> {
    let precondition = |source: io::Error| ChirpsError::Precondition {
        path: dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(precondition)?;
    tempfile::tempfile_in(dir).map_err(precondition)?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
