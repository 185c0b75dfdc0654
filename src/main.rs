// External crates
use anyhow::Result;
use clap::{Args, Parser, Subcommand};

// Standard library
use std::path::PathBuf;

use corpus_dedup::{read_config, Config, OutputMode};

/*=================================================================
=                                  ARGS                           =
=================================================================*/

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct ArgParser {
    #[clap(subcommand)]
    command: Commands,

    #[arg(long, default_value_t = 0)]
    threads: usize,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(required = true, long)]
    config: PathBuf,

    #[arg(long, help = "Override the similarity_threshold from the config file")]
    threshold: Option<f32>,

    #[arg(long, help = "Read only the first N lines of each file")]
    preview_lines: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort the corpus into unique/ and per-cluster similar_group_N/ folders
    Organize {
        #[clap(flatten)]
        run_args: RunArgs,
    },

    /// Write a deduplicated view (one representative per cluster) plus the CSV report
    Report {
        #[clap(flatten)]
        run_args: RunArgs,
    },
}

fn load_config(run_args: &RunArgs) -> Result<Config> {
    let mut config = read_config(&run_args.config)?;
    if let Some(threshold) = run_args.threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(lines) = run_args.preview_lines {
        config.max_preview_lines = Some(lines);
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    let args = ArgParser::parse();
    let threads = args.threads;
    if threads != 0 {
        std::env::set_var("RAYON_NUM_THREADS", threads.to_string());
    }

    let result = match &args.command {
        Commands::Organize { run_args } => {
            load_config(run_args).and_then(|config| corpus_dedup::run(&config, OutputMode::Organize))
        }

        Commands::Report { run_args } => {
            load_config(run_args).and_then(|config| corpus_dedup::run(&config, OutputMode::ReportOnly))
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
