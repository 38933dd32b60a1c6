//! Image loading and saving
//!
//! Thin wrappers around the `image` crate codecs. Every failure maps to a
//! distinct [`ImageIoError`] variant so the CLI can report it precisely.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every output file name
pub const OUTPUT_PREFIX: &str = "out_";

/// Prefix of debug overlay file names
pub const DEBUG_PREFIX: &str = "debug_";

/// Default JPEG quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Image I/O error types
#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Cannot open source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Nothing to write to {0}: detected frame is empty")]
    EmptyImage(PathBuf),

    #[error("Cannot write output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, ImageIoError>;

/// Output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Pick the encoding from the file extension (`.png` or `.jpg`)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(ImageIoError::UnsupportedFormat(format!(".{ext}"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        }
    }
}

/// Open and decode an image, guessing its format from the content
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(ImageIoError::ImageNotFound(path.to_path_buf()));
    }

    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| ImageIoError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    reader.decode().map_err(|source| ImageIoError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode `image` to `path`. JPEG output drops the alpha channel.
pub fn save_image(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<()> {
    // Neither encoder accepts a zero-sized buffer
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageIoError::EmptyImage(path.to_path_buf()));
    }

    let write_err = |source: image::ImageError| ImageIoError::Write {
        path: path.to_path_buf(),
        source,
    };

    match format {
        OutputFormat::Png => image
            .save_with_format(path, ImageFormat::Png)
            .map_err(write_err),
        OutputFormat::Jpeg => {
            let file = File::create(path).map_err(|e| write_err(e.into()))?;
            let encoder =
                JpegEncoder::new_with_quality(BufWriter::new(file), jpeg_quality.clamp(1, 100));
            image.to_rgb8().write_with_encoder(encoder).map_err(write_err)
        }
    }
}

/// `out_<file name>` next to the input, or inside `output_dir`
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    prefixed_path(input, output_dir, OUTPUT_PREFIX)
}

/// `debug_<file stem>.png` next to the input, or inside `output_dir`
pub fn debug_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    prefixed_path(input, output_dir, DEBUG_PREFIX).with_extension("png")
}

fn prefixed_path(input: &Path, output_dir: Option<&Path>, prefix: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{prefix}{file_name}"))
}
