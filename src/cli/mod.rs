//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{command, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the CHIRPS datasets that can be downloaded
    Options {},
    /// Show which months a dataset has on the archive
    Available {
        /// Dataset code, see `options`
        #[arg(short, long, default_value = "africa_monthly")]
        dataset: String,
    },
    /// Download the missing months of a dataset
    Download {
        /// Dataset code, see `options`
        #[arg(short, long)]
        dataset: String,

        /// First month, YYYY-MM
        #[arg(short, long)]
        start: String,

        /// Last month, YYYY-MM. Defaults to the start month
        #[arg(short, long)]
        end: Option<String>,

        /// Where to save the files. Defaults to the configured download directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Keep the files gzipped
        #[arg(long)]
        no_unzip: bool,

        /// Delete the .tif.gz once it has been unzipped
        #[arg(long)]
        remove_compressed: bool,
    },
}

/// Sets up logging at the configured level. `RUST_LOG` takes precedence.
pub fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_download_arguments() {
        let cli = Cli::parse_from([
            "chirps",
            "download",
            "--dataset",
            "africa_monthly",
            "--start",
            "2022-01",
            "--end",
            "2022-03",
            "--no-unzip",
        ]);

        match cli.command {
            Commands::Download {
                dataset,
                start,
                end,
                out_dir,
                no_unzip,
                remove_compressed,
            } => {
                assert_eq!(dataset, "africa_monthly");
                assert_eq!(start, "2022-01");
                assert_eq!(end.as_deref(), Some("2022-03"));
                assert!(out_dir.is_none());
                assert!(no_unzip);
                assert!(!remove_compressed);
            }
            _ => panic!("expected download command"),
        }
    }

    #[test]
    fn should_default_available_dataset() {
        let cli = Cli::parse_from(["chirps", "available"]);
        assert!(matches!(cli.command, Commands::Available { dataset } if dataset == "africa_monthly"));
    }

    #[test]
    fn should_require_start_month() {
        assert!(Cli::try_parse_from(["chirps", "download", "--dataset", "africa_monthly"]).is_err());
    }

    #[test]
    fn should_track_progress_bar_position() {
        let pb = create_progress_bar(3, "Downloading...".to_string());
        pb.inc(2);

        assert_eq!(pb.length().unwrap(), 3);
        assert_eq!(pb.position(), 2);
    }
}
