use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chirps::{sync, Config, DownloadOutcome, HttpArchive, SyncRequest, YearMonth};

use crate::cli::create_progress_bar;

pub struct DownloadArgs {
    pub dataset: String,
    pub start: String,
    pub end: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub unzip: bool,
    pub remove_compressed: bool,
}

pub async fn download(args: DownloadArgs, config: &Config) -> Result<String> {
    let start: YearMonth = args.start.parse()?;
    let end = args.end.as_deref().map(str::parse::<YearMonth>).transpose()?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.download_dir());

    let mut request = SyncRequest::new(&args.dataset, start, end, out_dir);
    request.unzip = args.unzip;

    let mut options = config.fetch_options();
    if args.remove_compressed {
        options.keep_compressed = false;
    }

    let archive = HttpArchive::new(&config.base_url, config.timeout())?;
    let pb = create_progress_bar(0, "Downloading...".to_string());

    let outcomes = sync(&archive, &request, &options, pb.clone()).await?;
    pb.finish_with_message("Downloads finished");

    for outcome in &outcomes {
        println!("{}", outcome_line(outcome));
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded).count();
    if failed > 0 {
        return Err(anyhow!(
            "{} of {} downloads failed",
            failed,
            outcomes.len()
        ));
    }

    Ok(format!(
        "{} file(s) saved to `{}`",
        outcomes.len(),
        request.out_dir.display()
    ))
}

fn outcome_line(outcome: &DownloadOutcome) -> String {
    match (&outcome.error, outcome.unzipped) {
        (Some(e), _) => format!("✗ Failed {}: {}", outcome.file_name, e),
        (None, true) => format!("✓ Downloaded and unzipped {}", outcome.file_name),
        (None, false) => format!("✓ Downloaded {}", outcome.file_name),
    }
}

// -- Tests -------------------------------------------------------------------
