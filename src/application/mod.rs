// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! This module contains the implementation of the `afm-analysis` binary.

use afm_analysis::{errors::ApplicationError, input::Analysis, AFM_ANALYSIS_VERSION};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Correct systematic errors of AFM height data and calculate the distribution of heights and the roughness of the surface."
)]
pub struct Args {
    #[arg(
        help = "Config yaml file",
        long_help = "Configuration yaml file specifying the input file, the corrections and the analyses to perform."
    )]
    pub config: String,

    #[arg(
        long = "results",
        num_args = 0..=1,
        default_missing_value = "results.txt",
        value_name = "FILE",
        help = "Write human-readable results",
        long_help = "Write human-readable results of the corrections and analyses into FILE (default: 'results.txt'). Overrides the value from the configuration file."
    )]
    pub results: Option<String>,

    #[arg(
        long = "silent",
        default_value_t = false,
        help = "Print nothing but errors",
        long_help = "Print nothing to the standard output except for errors."
    )]
    pub silent: bool,

    #[arg(
        long = "overwrite",
        default_value_t = false,
        help = "Do not back up output files",
        long_help = "Overwrite existing output files instead of backing them up."
    )]
    pub overwrite: bool,
}

fn init_logging(silent: bool) {
    if silent {
        colog::basic_builder()
            .filter(None, log::LevelFilter::Error)
            .init();
    } else {
        colog::init();
    }
}

fn print_status(success: bool) {
    let (symbol, message) = if success {
        (
            "✔".to_string().bright_green().bold(),
            "ANALYSIS COMPLETED".to_string().bright_green().bold(),
        )
    } else {
        (
            "✖".to_string().red().bold(),
            "ANALYSIS FAILED".to_string().red().bold(),
        )
    };

    let prefix = format!(
        "{}{}{}",
        "[".to_string().blue().bold(),
        symbol,
        "]".to_string().blue().bold()
    );
    println!("{} {}", prefix, message);
}

pub(crate) fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut analysis = match Analysis::from_file(&args.config) {
        Ok(x) => x,
        Err(e) => {
            init_logging(args.silent);
            log::error!("{}", e);
            return Err(Box::new(ApplicationError::CouldNotReadConfig(args.config)));
        }
    };

    if args.silent {
        analysis.set_silent(true);
    }
    if args.overwrite {
        analysis.set_overwrite(true);
    }
    if let Some(results) = args.results {
        analysis.set_results(results);
    }

    init_logging(analysis.silent());
    if !analysis.silent() {
        let header = format!(">>> AFM-ANALYSIS v{} <<<", AFM_ANALYSIS_VERSION).bold();
        println!("\n{}\n", header);
        log::info!("Read config file '{}'.", args.config);
    }

    let result = analysis.run();

    if let Err(e) = &result {
        log::error!("{}", e);
    }

    if !analysis.silent() {
        print_status(result.is_ok());
    }

    result.map(|_| ()).map_err(|e| e.into())
}
