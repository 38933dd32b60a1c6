//! Frame Detection & Cropping module
//!
//! Detects a uniform-colored border around an image (scanner margins,
//! photo mounts) and crops it away, keeping a configurable margin.
//!
//! # Algorithm
//!
//! 1. Sample the control color at pixel (0, 0)
//! 2. Sweep rows from the top and bottom, then columns from the left and
//!    right, stopping at the first line holding a pixel whose summed RGB
//!    difference to the control color exceeds the tolerance
//! 3. Expand the content rectangle by the margin and clamp it to the image
//! 4. Copy the resulting frame into a new RGBA image
//!
//! # Example
//!
//! ```rust
//! use framecrop::{detect_and_crop, CropOptions};
//! use image::{DynamicImage, Rgb, RgbImage};
//!
//! let mut scan = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
//! for y in 10..90 {
//!     for x in 10..90 {
//!         scan.put_pixel(x, y, Rgb([255, 255, 255]));
//!     }
//! }
//!
//! let options = CropOptions::builder().margin(5).tolerance(0).build();
//! let cropped = detect_and_crop(&DynamicImage::ImageRgb8(scan), &options);
//! assert_eq!((cropped.width(), cropped.height()), (90, 90));
//! ```

mod detect;
mod observer;
mod overlay;
mod types;

// Re-export public API
pub use detect::{detect_and_crop, ColorMatcher, FrameDetector};
pub use observer::{
    DetectionEvent, DetectionObserver, NullObserver, RecordingObserver, TracingObserver,
};
pub use overlay::render_overlay;
pub use types::{Edge, Frame, FrameDetection, Margins};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================
// Constants
// ============================================================

/// Default margin re-added around the content, in pixels
pub const DEFAULT_MARGIN: u32 = 10;

/// Default tolerance, in summed 16-bit channel units
pub const DEFAULT_TOLERANCE: u32 = 1000;

/// Largest possible distance between two colors (3 x 65535)
pub const MAX_DISTANCE: u32 = 3 * 65535;

// ============================================================
// Options
// ============================================================

/// How the four directional scans share the working rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Every scan covers the full image bounds
    #[default]
    Independent,
    /// Scans run top, bottom, left, right, each on the rectangle narrowed
    /// by the previous ones
    Sequential,
}

impl ScanStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ScanStrategy::Independent => "independent",
            ScanStrategy::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScanStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "independent" => Ok(ScanStrategy::Independent),
            "sequential" => Ok(ScanStrategy::Sequential),
            other => Err(format!(
                "unknown scan strategy '{other}' (expected independent or sequential)"
            )),
        }
    }
}

/// What to do when the whole image matches the control color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlankPolicy {
    /// Keep the full image as content
    #[default]
    KeepFull,
    /// Collapse the content to an empty rectangle at the image center,
    /// leaving only the margin
    Collapse,
}

impl BlankPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            BlankPolicy::KeepFull => "keep-full",
            BlankPolicy::Collapse => "collapse",
        }
    }
}

impl fmt::Display for BlankPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlankPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep-full" | "keep_full" | "keep" => Ok(BlankPolicy::KeepFull),
            "collapse" => Ok(BlankPolicy::Collapse),
            other => Err(format!(
                "unknown blank policy '{other}' (expected keep-full or collapse)"
            )),
        }
    }
}

/// Frame detection options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOptions {
    /// Pixels re-added around the detected content
    pub margin: u32,
    /// Maximum summed RGB difference (16-bit units) still counted as border
    pub tolerance: u32,
    /// Scan strategy
    pub strategy: ScanStrategy,
    /// Handling of single-color images
    pub blank_policy: BlankPolicy,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            tolerance: DEFAULT_TOLERANCE,
            strategy: ScanStrategy::default(),
            blank_policy: BlankPolicy::default(),
        }
    }
}

impl CropOptions {
    /// Create a new options builder
    pub fn builder() -> CropOptionsBuilder {
        CropOptionsBuilder::default()
    }

    /// Exact crop: only pixels identical to the control color are border,
    /// and no margin is kept
    pub fn exact() -> Self {
        Self {
            margin: 0,
            tolerance: 0,
            ..Default::default()
        }
    }
}

/// Builder for CropOptions
#[derive(Debug, Default)]
pub struct CropOptionsBuilder {
    options: CropOptions,
}

impl CropOptionsBuilder {
    /// Set margin in pixels
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.options.margin = margin;
        self
    }

    /// Set tolerance (clamped to the largest possible distance)
    #[must_use]
    pub fn tolerance(mut self, tolerance: u32) -> Self {
        self.options.tolerance = tolerance.min(MAX_DISTANCE);
        self
    }

    /// Set scan strategy
    #[must_use]
    pub fn strategy(mut self, strategy: ScanStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Set blank image policy
    #[must_use]
    pub fn blank_policy(mut self, policy: BlankPolicy) -> Self {
        self.options.blank_policy = policy;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> CropOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = CropOptions::default();

        assert_eq!(opts.margin, 10);
        assert_eq!(opts.tolerance, 1000);
        assert_eq!(opts.strategy, ScanStrategy::Independent);
        assert_eq!(opts.blank_policy, BlankPolicy::KeepFull);
    }

    #[test]
    fn test_exact_preset() {
        let opts = CropOptions::exact();
        assert_eq!(opts.margin, 0);
        assert_eq!(opts.tolerance, 0);
        assert_eq!(opts.strategy, ScanStrategy::Independent);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = CropOptions::builder()
            .margin(25)
            .tolerance(300)
            .strategy(ScanStrategy::Sequential)
            .blank_policy(BlankPolicy::Collapse)
            .build();

        assert_eq!(opts.margin, 25);
        assert_eq!(opts.tolerance, 300);
        assert_eq!(opts.strategy, ScanStrategy::Sequential);
        assert_eq!(opts.blank_policy, BlankPolicy::Collapse);
    }

    #[test]
    fn test_builder_clamps_tolerance() {
        let opts = CropOptions::builder().tolerance(u32::MAX).build();
        assert_eq!(opts.tolerance, MAX_DISTANCE);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "independent".parse::<ScanStrategy>(),
            Ok(ScanStrategy::Independent)
        );
        assert_eq!(
            "Sequential".parse::<ScanStrategy>(),
            Ok(ScanStrategy::Sequential)
        );
        assert!("diagonal".parse::<ScanStrategy>().is_err());
    }

    #[test]
    fn test_blank_policy_parsing() {
        assert_eq!("keep-full".parse::<BlankPolicy>(), Ok(BlankPolicy::KeepFull));
        assert_eq!("collapse".parse::<BlankPolicy>(), Ok(BlankPolicy::Collapse));
        let err = "shrink".parse::<BlankPolicy>().unwrap_err();
        assert!(err.contains("shrink"));
    }

    #[test]
    fn test_display_matches_parse() {
        for strategy in [ScanStrategy::Independent, ScanStrategy::Sequential] {
            assert_eq!(strategy.to_string().parse::<ScanStrategy>(), Ok(strategy));
        }
        for policy in [BlankPolicy::KeepFull, BlankPolicy::Collapse] {
            assert_eq!(policy.to_string().parse::<BlankPolicy>(), Ok(policy));
        }
    }
}
