//! framecrop - Automatic border removal for scanned images
//!
//! Detects a uniform-colored frame around a picture (scanner margins, photo
//! mounts, letterboxing), crops it away and re-adds a configurable margin.
//!
//! # Features
//!
//! - **Frame Detection** ([`frame`]) - Four-direction scan against the control
//!   color sampled at (0, 0), with a summed-RGB tolerance
//! - **Image I/O** ([`image_io`]) - Decode any format `image` supports, encode
//!   PNG or JPEG
//! - **Configuration** ([`config`]) - TOML config file merged with CLI flags
//! - **Progress** ([`progress`]) - Verbosity modes and batch summary
//!
//! # Quick Start
//!
//! ```rust
//! use framecrop::{CropOptions, FrameDetector};
//! use image::{DynamicImage, Rgb, RgbImage};
//!
//! let scan = RgbImage::from_fn(50, 40, |x, y| {
//!     if (5..45).contains(&x) && (4..36).contains(&y) {
//!         Rgb([180, 40, 40])
//!     } else {
//!         Rgb([255, 255, 255])
//!     }
//! });
//! let image = DynamicImage::ImageRgb8(scan);
//!
//! let detection = FrameDetector::detect(&image, &CropOptions::exact());
//! assert_eq!(detection.output_size(), (40, 32));
//!
//! let cropped = FrameDetector::crop(&image, &detection);
//! assert_eq!((cropped.width(), cropped.height()), (40, 32));
//! ```
//!
//! # Architecture
//!
//! ```text
//! load_image -> FrameDetector::detect -> FrameDetector::crop -> save_image
//!                      |
//!              DetectionObserver (tracing, recording, none)
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod cli;
pub mod config;
pub mod frame;
pub mod image_io;
pub mod progress;

// Re-exports for convenience
pub use cli::{Cli, ExitCode};
pub use config::{CliOverrides, Config, ConfigError, RunConfig};
pub use frame::{
    detect_and_crop, render_overlay, BlankPolicy, ColorMatcher, CropOptions, CropOptionsBuilder,
    DetectionEvent, DetectionObserver, Edge, Frame, FrameDetection, FrameDetector, Margins,
    NullObserver, RecordingObserver, ScanStrategy, TracingObserver,
};
pub use image_io::{
    debug_path_for, load_image, output_path_for, save_image, ImageIoError, OutputFormat,
};
pub use progress::{create_progress_bar, BatchSummary, OutputMode, ProcessingStage};

/// Exit codes for CLI (prefer using `ExitCode` enum)
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
    pub const PROCESSING_ERROR: i32 = ExitCode::ProcessingError as i32;
}
