use anyhow::Result;
use chirps::{probe::probe, registry, AvailabilityReport, Config, HttpArchive};

use crate::cli::create_spinner;

/// How many of the newest files to show.
const LATEST: usize = 5;

pub async fn available(dataset: &str, config: &Config) -> Result<String> {
    let descriptor = registry::lookup(dataset)?;
    let archive = HttpArchive::new(&config.base_url, config.timeout())?;
    let archive = &archive;

    let bar = create_spinner(format!("Checking {}...", descriptor.label));
    let report = config
        .retry_policy()
        .run(descriptor.remote_subdir, move || probe(archive, descriptor))
        .await;
    bar.finish_and_clear();

    Ok(describe(&report?))
}

fn describe(report: &AvailabilityReport) -> String {
    let (Some(min), Some(max)) = (report.min_date(), report.max_date()) else {
        return format!("No data available for {}", report.dataset_code);
    };

    let mut text = format!(
        "{}: {} files, from {} to {}\nLatest files:\n",
        report.dataset_code,
        report.len(),
        min.label(),
        max.label()
    );
    for record in report.records().iter().take(LATEST) {
        text.push_str(&format!("  {}  {}\n", record.year_month(), record.file_name));
    }

    text
}

// -- Tests -------------------------------------------------------------------
