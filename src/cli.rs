//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::frame::{BlankPolicy, ScanStrategy};
use crate::image_io::ImageIoError;
use crate::progress::OutputMode;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Input file not found
    InputNotFound = 3,
    /// Output error (unsupported format, write failure)
    OutputError = 4,
    /// Source could not be opened or decoded
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file not found",
            ExitCode::OutputError => "Output error (unsupported format, permission denied, etc.)",
            ExitCode::ProcessingError => "Cannot open or decode source image",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<&ImageIoError> for ExitCode {
    fn from(err: &ImageIoError) -> Self {
        match err {
            ImageIoError::ImageNotFound(_) => ExitCode::InputNotFound,
            ImageIoError::Open { .. } | ImageIoError::Decode { .. } => ExitCode::ProcessingError,
            ImageIoError::UnsupportedFormat(_)
            | ImageIoError::EmptyImage(_)
            | ImageIoError::Write { .. } => ExitCode::OutputError,
        }
    }
}

/// Remove uniform borders from scanned images
#[derive(Parser, Debug)]
#[command(name = "framecrop")]
#[command(version)]
#[command(about = "Remove uniform borders from scanned images", long_about = None)]
pub struct Cli {
    /// Input image files (output goes to out_<name>, PNG or JPEG by extension)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Margin re-added around the content, in pixels [default: 10]
    #[arg(short, long)]
    pub margin: Option<u32>,

    /// Max summed RGB difference (16-bit units) counted as border [default: 1000]
    #[arg(short, long)]
    pub tolerance: Option<u32>,

    /// Scan strategy: independent or sequential
    #[arg(long)]
    pub strategy: Option<ScanStrategy>,

    /// Single-color images: keep-full or collapse
    #[arg(long = "blank")]
    pub blank_policy: Option<BlankPolicy>,

    /// Directory for output files (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Also write debug_<name>.png with the detected frame outlined
    #[arg(long)]
    pub save_debug: bool,

    /// Detect and report frames without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Values given on the command line, for merging over the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            margin: self.margin,
            tolerance: self.tolerance,
            strategy: self.strategy,
            blank_policy: self.blank_policy,
            jpeg_quality: self.jpeg_quality,
            output_dir: self.output_dir.clone(),
            save_debug: self.save_debug.then_some(true),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::from_verbosity(self.verbose)
        }
    }
}
