/*!
 * dossplit CLI
 *
 * Run with no arguments from a directory holding a DOSCAR to get DOS0, DOS1, ...
 */

use clap::{Parser, ValueEnum};
use dossplit::{
    config::{FirstBlockHeader, LogLevel, SplitConfig, TrailingBlockPolicy},
    error::{Result, EXIT_SUCCESS},
    logging,
    output::{print_error, OutputWriter},
    split_doscar,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dossplit")]
#[command(version, about = "Split a VASP DOSCAR into per-atom / per-orbital DOS files", long_about = None)]
struct Cli {
    /// Input DOSCAR [default: ./DOSCAR]
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Directory for the output files [default: .]
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name prefix [default: DOS]
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Load settings from a TOML file; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Whether the first block has its own header line after line 6
    #[arg(long, value_enum)]
    first_block_header: Option<FirstBlockHeaderArg>,

    /// What to do when the input ends inside a block
    #[arg(long = "trailing", value_enum)]
    trailing: Option<TrailingArg>,

    /// Count blocks without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as a JSON object
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Write logs to this file (JSON) instead of stderr
    #[arg(long = "log", value_name = "FILE")]
    log: Option<PathBuf>,

    /// Verbose logging (same as --log-level debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FirstBlockHeaderArg {
    Separate,
    Shared,
}

impl From<FirstBlockHeaderArg> for FirstBlockHeader {
    fn from(arg: FirstBlockHeaderArg) -> Self {
        match arg {
            FirstBlockHeaderArg::Separate => FirstBlockHeader::Separate,
            FirstBlockHeaderArg::Shared => FirstBlockHeader::Shared,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TrailingArg {
    Error,
    Keep,
    Discard,
}

impl From<TrailingArg> for TrailingBlockPolicy {
    fn from(arg: TrailingArg) -> Self {
        match arg {
            TrailingArg::Error => TrailingBlockPolicy::Error,
            TrailingArg::Keep => TrailingBlockPolicy::Keep,
            TrailingArg::Discard => TrailingBlockPolicy::Discard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl Cli {
    /// Overlay command-line flags on a base configuration
    fn apply(self, mut config: SplitConfig) -> SplitConfig {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if let Some(layout) = self.first_block_header {
            config.first_block_header = layout.into();
        }
        if let Some(policy) = self.trailing {
            config.trailing_block = policy.into();
        }
        if let Some(level) = self.log_level {
            config.log_level = level.into();
        }
        if self.log.is_some() {
            config.log_file = self.log;
        }
        config.dry_run |= self.dry_run;
        config.verbose |= self.verbose;
        config
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            print_error(&e.to_string());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.json;

    let base_config = match cli.config {
        Some(ref path) => SplitConfig::from_file(path)?,
        None => SplitConfig::default(),
    };
    let config = cli.apply(base_config);

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let stats = split_doscar(&config).inspect_err(|e| {
        tracing::error!(category = %e.category(), "{}", e);
    })?;

    OutputWriter::new(json).summary(&stats, &config.prefix);
    Ok(())
}
