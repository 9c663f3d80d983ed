//! IPEDS dataset builder CLI.
//!
//! ```bash
//! ipeds                                             # data/raw -> data/output
//! ipeds --raw-dir extracts/2023 --output-dir out    # explicit directories
//! ```

use clap::Parser;
use ipeds::logs::log_error;
use ipeds::{run_pipeline, PipelineOptions};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "ipeds")]
#[command(about = "Build institutions.csv and programs.csv from IPEDS extracts", long_about = None)]
struct Cli {
    /// Directory holding the raw survey extracts
    #[arg(long, default_value = "data/raw")]
    raw_dir: PathBuf,

    /// Output directory (created if absent)
    #[arg(long, default_value = "data/output")]
    output_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let options = PipelineOptions {
        raw_dir: cli.raw_dir,
        output_dir: cli.output_dir,
        ..PipelineOptions::default()
    };

    match run_pipeline(&options) {
        Ok(report) => {
            tracing::info!(
                loaded = report.institutions_loaded,
                dropped = report.institutions_dropped,
                institutions = report.institutions_written,
                programs = report.programs_written,
                "Done."
            );
        }
        Err(e) => {
            log_error(format!("Error: {}", e));
            std::process::exit(1);
        }
    }
}
