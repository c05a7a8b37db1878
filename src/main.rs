mod cli;

use anyhow::{Error, Result};
use chirps::Config;
use clap::Parser;
use cli::{command, command::download::DownloadArgs, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let loaded = Config::load();
    cli::init_logging(&loaded.config.log_level);
    loaded.log();
    let config = loaded.config;

    let result = match cli.command {
        Commands::Options {} => Ok(command::options()),
        Commands::Available { dataset } => command::available(&dataset, &config).await,
        Commands::Download {
            dataset,
            start,
            end,
            out_dir,
            no_unzip,
            remove_compressed,
        } => {
            let args = DownloadArgs {
                dataset,
                start,
                end,
                out_dir,
                unzip: !no_unzip,
                remove_compressed,
            };
            command::download(args, &config).await
        }
    };

    match result {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
