//! graphlayout CLI - Lay out JSON graph documents

mod cli;

use clap::Parser;
use graphlayout::core::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    // Flags win; missing ones are resolved from the environment
    let level = cli_args.log_level.map(|l| l.as_str());
    let format = cli_args.log_format.map(|f| f.as_str());
    if let Err(e) = init_logging(level, format) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let app = cli::GraphlayoutApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
