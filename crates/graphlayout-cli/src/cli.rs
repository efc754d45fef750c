//! Command-line interface for the graphlayout utility
//!
//! Reads a JSON graph document, lays it out with the selected algorithm and
//! writes the document back with coordinates and bend points filled in.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use graphlayout::core::LayoutOptions;
use graphlayout::{layout_json_with_options, Algorithm, Family};

/// graphlayout - Lay out graphs with a selectable layout algorithm
#[derive(Parser)]
#[command(name = "graphlayout")]
#[command(about = "Lay out JSON graph documents with one of many graph layout algorithms")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error); falls back to the environment
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json); falls back to the environment
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out a graph document
    Layout {
        /// Layout algorithm, by name (e.g. sugiyama) or identifier (e.g. SugiyamaLayout)
        #[arg(short, long, default_value_t = Algorithm::default())]
        algorithm: Algorithm,

        /// Input file containing a JSON graph document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the laid-out document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with layout options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show available layout algorithms
    Algorithms {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// One row of the `algorithms` listing
#[derive(Debug, Serialize)]
struct AlgorithmInfo {
    id: u32,
    name: &'static str,
    identifier: String,
    family: Family,
}

impl From<Algorithm> for AlgorithmInfo {
    fn from(algorithm: Algorithm) -> Self {
        Self {
            id: algorithm.id(),
            name: algorithm.name(),
            identifier: algorithm.identifier(),
            family: algorithm.family(),
        }
    }
}

/// Main CLI application
pub struct GraphlayoutApp {
    options: LayoutOptions,
}

impl GraphlayoutApp {
    /// Create a new application instance with default layout options
    pub fn new() -> Self {
        Self::with_options(LayoutOptions::default())
    }

    /// Create a new application instance with base layout options
    ///
    /// A `--config` file replaces these options for a single run.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        if cli.verbose {
            eprintln!("graphlayout v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Layout {
                algorithm,
                input,
                output,
                config,
            } => self.layout_command(algorithm, input, output, config, cli.verbose),
            Commands::Algorithms { json } => self.algorithms_command(json, cli.verbose),
        }
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        algorithm: Algorithm,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        config: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let options = match config {
            Some(path) => self.load_options(&path)?,
            None => self.options.clone(),
        };
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
            eprintln!("Running {} ({})", algorithm.identifier(), algorithm.family());
        }

        // The error of a failed run is the diagnostic itself
        let laid_out = layout_json_with_options(&content, algorithm, options)?;

        if verbose {
            eprintln!("Layout finished");
        }

        self.write_output(output, &laid_out)
    }

    /// Handle the algorithms command
    fn algorithms_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing available layout algorithms");
        }

        let rows: Vec<AlgorithmInfo> = Algorithm::ALL.into_iter().map(AlgorithmInfo::from).collect();
        if json {
            let listing = serde_json::json!({
                "algorithms": rows,
                "total": rows.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Available layout algorithms:");
            for row in &rows {
                println!("  {:>2}  {:<36} {:<14} {}", row.id, row.name, row.family, row.identifier);
            }
            println!();
            println!("Total: {} layout algorithms", rows.len());
        }

        Ok(())
    }

    /// Load and validate layout options from a JSON file
    pub fn load_options(&self, path: &Path) -> Result<LayoutOptions> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let options = LayoutOptions::from_json(&text)?;
        options
            .validate()
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(options)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content)
                    .map_err(|e| anyhow!("Failed to write output file '{}': {}", path.display(), e))?;
            }
            _ => {
                let mut stdout = io::stdout();
                if content.ends_with('\n') {
                    write!(stdout, "{}", content)?;
                } else {
                    writeln!(stdout, "{}", content)?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for GraphlayoutApp {
    fn default() -> Self {
        Self::new()
    }
}
