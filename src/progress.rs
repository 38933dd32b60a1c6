//! Progress reporting for batch cropping.
//!
//! Output verbosity, per-file stages, the batch progress bar and the final
//! summary.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Instant;

/// Processing stages for a single image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    /// Opening and decoding the source
    #[default]
    Loading,
    /// Scanning for the border
    Detecting,
    /// Copying the frame into the output image
    Cropping,
    /// Encoding and writing the output
    Saving,
    /// Completed
    Completed,
}

impl ProcessingStage {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Loading => "Loading",
            ProcessingStage::Detecting => "Detecting",
            ProcessingStage::Cropping => "Cropping",
            ProcessingStage::Saving => "Saving",
            ProcessingStage::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Normal output (results and summary)
    #[default]
    Normal,
    /// Verbose output (detected frames)
    Verbose,
    /// Very verbose (every scan)
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }

    /// Default `tracing` filter directive for this mode
    pub fn log_filter(&self) -> &'static str {
        match self {
            OutputMode::Quiet => "error",
            OutputMode::Normal => "warn",
            OutputMode::Verbose => "info",
            OutputMode::VeryVerbose => "debug",
        }
    }
}

/// Create a progress bar for `total` images
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Outcome counts for a batch run
#[derive(Debug)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    start_time: Instant,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        [
            rule.clone(),
            "Crop Summary".to_string(),
            rule.clone(),
            format!("  Total images: {}", self.total),
            format!("  Succeeded:    {}", self.succeeded),
            format!("  Errors:       {}", self.failed),
            format!("  Time:         {:.2}s", self.elapsed_secs()),
            rule,
        ]
        .join("\n")
    }
}
