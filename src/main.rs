//! framecrop - Automatic border removal for scanned images
//!
//! CLI entry point

use clap::Parser;
use image::DynamicImage;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use framecrop::{
    create_progress_bar, debug_path_for, load_image, output_path_for, render_overlay, save_image,
    BatchSummary, Cli, Config, ExitCode, FrameDetection, FrameDetector, ImageIoError,
    OutputFormat, OutputMode, ProcessingStage, RunConfig, TracingObserver,
};

fn main() {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.code());
}

/// Install the fmt subscriber; `RUST_LOG` wins over the verbosity flags
fn init_tracing(mode: OutputMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("framecrop={}", mode.log_filter())));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============ Crop Command ============

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mode = cli.output_mode();
    init_tracing(mode);

    // Load config file if specified, otherwise search the default locations
    let file_config = match &cli.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        },
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("ignoring config file: {}", e);
            Config::default()
        }),
    };
    let config = file_config.merge_with_cli(&cli.overrides());
    tracing::debug!(?config, "resolved configuration");

    if let Some(dir) = &config.output_dir {
        if !cli.dry_run {
            std::fs::create_dir_all(dir)?;
        }
    }

    let total = cli.inputs.len();
    let mut summary = BatchSummary::new(total);
    let progress = (total > 1 && mode.should_show(OutputMode::Normal))
        .then(|| create_progress_bar(total as u64));

    let mut exit = ExitCode::Success;
    for input in &cli.inputs {
        if let Some(pb) = &progress {
            pb.set_message(input.display().to_string());
        }

        match process_file(input, &config, cli.dry_run) {
            Ok(report) => {
                summary.record_success();
                if mode.should_show(OutputMode::Normal) {
                    emit(progress.as_ref(), &report.headline());
                }
                if mode.should_show(OutputMode::Verbose) {
                    emit(progress.as_ref(), &report.details());
                }
            }
            Err(e) => {
                summary.record_failure();
                let line = format!("Error processing {}: {}", input.display(), e);
                match &progress {
                    Some(pb) => pb.suspend(|| eprintln!("{}", line)),
                    None => eprintln!("{}", line),
                }
                exit = ExitCode::from(&e);
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
        println!("{}", summary.render());
    }

    Ok(exit)
}

// ============ Helper Functions ============

/// What happened to one input
struct FileReport {
    input: PathBuf,
    output: Option<PathBuf>,
    detection: FrameDetection,
}

impl FileReport {
    fn headline(&self) -> String {
        let (w, h) = self.detection.image_size;
        let (ow, oh) = self.detection.output_size();
        match &self.output {
            Some(output) => format!(
                "{} -> {} ({}x{} -> {}x{})",
                self.input.display(),
                output.display(),
                w,
                h,
                ow,
                oh
            ),
            None => format!(
                "{}: frame {} ({}x{} -> {}x{})",
                self.input.display(),
                self.detection.frame,
                w,
                h,
                ow,
                oh
            ),
        }
    }

    fn details(&self) -> String {
        let mut text = format!(
            "    content: {}  frame: {}  trimmed: {}",
            self.detection.content,
            self.detection.frame,
            self.detection.trimmed()
        );
        if self.detection.blank {
            text.push_str("\n    no border found: image is a single color");
        }
        text
    }
}

/// Print above the progress bar when one is drawn
fn emit(progress: Option<&ProgressBar>, line: &str) {
    match progress {
        Some(pb) if !pb.is_hidden() => pb.println(line),
        _ => println!("{}", line),
    }
}

/// Load, detect, crop and save one image. Nothing is written unless every
/// earlier step succeeded.
fn process_file(
    input: &Path,
    config: &RunConfig,
    dry_run: bool,
) -> Result<FileReport, ImageIoError> {
    tracing::debug!(input = %input.display(), stage = %ProcessingStage::Loading);
    let image = load_image(input)?;
    tracing::info!(
        "File {} opened, {}x{} {:?}",
        input.display(),
        image.width(),
        image.height(),
        image.color()
    );

    let output_path = output_path_for(input, config.output_dir.as_deref());
    let format = OutputFormat::from_path(&output_path)?;

    tracing::debug!(input = %input.display(), stage = %ProcessingStage::Detecting);
    let mut observer = TracingObserver::new(input.display().to_string());
    let detection = FrameDetector::detect_with_observer(&image, &config.crop, &mut observer);

    if dry_run {
        return Ok(FileReport {
            input: input.to_path_buf(),
            output: None,
            detection,
        });
    }

    if detection.frame.is_empty() {
        tracing::warn!(
            input = %input.display(),
            "detected frame is empty, raise --margin or use --blank keep-full"
        );
    }

    tracing::debug!(input = %input.display(), stage = %ProcessingStage::Cropping);
    let cropped = FrameDetector::crop(&image, &detection);

    tracing::debug!(input = %input.display(), stage = %ProcessingStage::Saving, format = format.name());
    save_image(&cropped, &output_path, format, config.jpeg_quality)?;
    tracing::info!("Image saved to {}", output_path.display());

    if config.save_debug {
        let debug_path = debug_path_for(input, config.output_dir.as_deref());
        let overlay = DynamicImage::ImageRgba8(render_overlay(&image, &detection));
        save_image(&overlay, &debug_path, OutputFormat::Png, config.jpeg_quality)?;
        tracing::info!("Debug overlay saved to {}", debug_path.display());
    }

    tracing::debug!(input = %input.display(), stage = %ProcessingStage::Completed);
    Ok(FileReport {
        input: input.to_path_buf(),
        output: Some(output_path),
        detection,
    })
}
