//! picpik: read, validate and resize images.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use picpik_cli::output::{format_count, format_dimensions, format_size, Status};
use picpik_cli::progress::{finish_success, image_progress};
use picpik_core::config::{Config, LimitConfig};
use picpik_core::{exit_codes, Error};
use picpik_image::{
    calc_resize_dimensions, check_file_type, ImageFile, ImageMetadata, ImageProcessor, InputKind,
    Limit, ResizeMode, ResizeOption, ResizeRequest, ValidateError,
};
use picpik_telemetry::TelemetryConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "picpik")]
#[command(about = "Read, validate and resize images")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to .picpik.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read image metadata and check it against the limits
    Metadata {
        /// Path to image file
        path: PathBuf,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Resize an image, keeping its name and encoding
    Resize {
        /// Path to image file
        path: PathBuf,

        #[command(flatten)]
        resize: ResizeArgs,

        /// Output path (defaults to <stem>.resized.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute resize dimensions without touching any file
    Dimensions {
        /// Source width in pixels
        #[arg(value_name = "WIDTH")]
        source_width: u32,

        /// Source height in pixels
        #[arg(value_name = "HEIGHT")]
        source_height: u32,

        #[command(flatten)]
        resize: ResizeArgs,
    },

    /// Read every image in a directory and check it against the limits
    Analyze {
        /// Directory to analyze
        path: PathBuf,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(Args)]
struct LimitArgs {
    /// Maximum width in pixels
    #[arg(long)]
    max_width: Option<u64>,

    /// Maximum height in pixels
    #[arg(long)]
    max_height: Option<u64>,

    /// Maximum file size in bytes
    #[arg(long)]
    max_size: Option<u64>,
}

impl LimitArgs {
    /// Flags win over the `[limits]` section
    fn over(&self, config: LimitConfig) -> Limit {
        let flags = LimitConfig {
            width: self.max_width,
            height: self.max_height,
            size: self.max_size,
        };
        Limit::from(&config.merged_with(flags))
    }
}

#[derive(Args)]
struct ResizeArgs {
    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Scale factor (keeps aspect ratio)
    #[arg(long, conflicts_with = "stretch")]
    scale: Option<f64>,

    /// Ignore the aspect ratio
    #[arg(long)]
    stretch: bool,
}

impl ResizeArgs {
    fn option(&self) -> ResizeOption {
        let mode = if self.stretch {
            ResizeMode::Stretch
        } else {
            ResizeMode::AspectRatio
        };
        ResizeOption::from(ResizeRequest {
            mode,
            width: self.width,
            height: self.height,
            scale: self.scale,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(report_error(&e, cli.json)),
    };

    let mut telemetry = TelemetryConfig::from_logging(&config.schema.logging);
    if cli.verbose {
        telemetry = telemetry.verbose();
    }
    picpik_telemetry::init_with_config(telemetry)?;
    if let Some(path) = &config.path {
        tracing::debug!(path = %path, "Loaded config");
    }

    let processor = ImageProcessor::from_config(&config.schema.resize);

    let code = match cli.command {
        Commands::Metadata { path, limits } => {
            let limit = limits.over(config.schema.limits);
            run_metadata(&processor, &path, &limit, cli.json).await?
        }
        Commands::Resize {
            path,
            resize,
            output,
        } => run_resize(&processor, &path, &resize.option(), output, cli.json).await?,
        Commands::Dimensions {
            source_width,
            source_height,
            resize,
        } => run_dimensions(source_width, source_height, &resize.option(), cli.json)?,
        Commands::Analyze { path, limits } => {
            let limit = limits.over(config.schema.limits);
            run_analyze(&processor, &path, &limit, cli.json).await?
        }
    };

    std::process::exit(code);
}

/// Print `error` (as a JSON report with `--json`) and return its exit code.
fn report_error(error: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&error.to_report()) {
            Ok(report) => println!("{report}"),
            Err(_) => Status::error(&error.to_string()),
        }
    } else {
        Status::error(&error.to_string());
    }
    error.exit_code()
}

async fn ensure_file(path: &Path) -> picpik_core::Result<()> {
    let kind = InputKind::of_path(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::file_not_found(path),
        _ => Error::from(e),
    })?;

    if check_file_type(&kind) {
        Ok(())
    } else {
        Err(Error::not_a_file(path))
    }
}

/// Open `path` and read its metadata without limits.
async fn load(processor: &ImageProcessor, path: &Path) -> picpik_core::Result<ImageMetadata> {
    ensure_file(path).await?;
    let file = ImageFile::open(path).await?;
    let metadata = processor
        .load_metadata(&file)
        .await
        .map_err(|e| Error::from(e).with_context(format!("Reading {}", path.display())))?;
    Ok(metadata)
}

/// Exit code for a run that found `violations` over the limits.
fn violation_code(violations: usize, json: bool) -> i32 {
    if violations == 0 {
        return exit_codes::SUCCESS;
    }
    let error = Error::limit_exceeded(format!(
        "{} exceeded",
        format_count(violations, "limit", "limits")
    ));
    // with --json the violations are already in the printed report
    if json {
        error.exit_code()
    } else {
        report_error(&error, false)
    }
}

async fn run_metadata(
    processor: &ImageProcessor,
    path: &Path,
    limit: &Limit,
    json: bool,
) -> Result<i32> {
    let metadata = match load(processor, path).await {
        Ok(metadata) => metadata,
        Err(e) => return Ok(report_error(&e, json)),
    };

    let violations = limit.violations(&metadata);
    if json {
        let report = serde_json::json!({
            "metadata": metadata,
            "valid": violations.is_empty(),
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_metadata(&metadata);
        for violation in &violations {
            Status::warning(&violation.to_string());
        }
        if violations.is_empty() && !limit.is_empty() {
            Status::success("Within limits");
        }
    }

    Ok(violation_code(violations.len(), json))
}

async fn run_resize(
    processor: &ImageProcessor,
    path: &Path,
    option: &ResizeOption,
    output: Option<PathBuf>,
    json: bool,
) -> Result<i32> {
    let metadata = match load(processor, path).await {
        Ok(metadata) => metadata,
        Err(e) => return Ok(report_error(&e, json)),
    };

    let Some(resized) = processor.resize_and_read(&metadata, option).await else {
        return Ok(report_error(&Error::resize_failed(path), json));
    };

    let output = output.unwrap_or_else(|| default_output(path));
    resized.file.save(&output).await?;

    if json {
        let report = serde_json::json!({
            "output": output.display().to_string(),
            "mimeType": resized.file.mime_type(),
            "metadata": resized.metadata,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Status::success(&format!(
            "Resized {} → {}",
            format_dimensions(metadata.width(), metadata.height()),
            format_dimensions(resized.metadata.width(), resized.metadata.height()),
        ));
        Status::field("Output", output.display());
        Status::field("Type", resized.file.mime_type());
        Status::field("Size", format_size(resized.file.size()));
    }

    Ok(exit_codes::SUCCESS)
}

fn run_dimensions(width: u32, height: u32, option: &ResizeOption, json: bool) -> Result<i32> {
    let dimensions = calc_resize_dimensions(width, height, option);
    let (target_width, target_height) = dimensions.rounded();

    if json {
        let report = serde_json::json!({
            "option": option,
            "raw": dimensions,
            "rounded": { "width": target_width, "height": target_height },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Status::field("Source", format_dimensions(width, height));
        Status::field(
            "Target",
            format!("{:.2}x{:.2}", dimensions.target_width, dimensions.target_height),
        );
        Status::field("Rounded", format_dimensions(target_width, target_height));
    }

    Ok(exit_codes::SUCCESS)
}

#[derive(Serialize)]
struct AnalyzedImage {
    path: String,
    metadata: ImageMetadata,
    violations: Vec<ValidateError>,
}

async fn run_analyze(
    processor: &ImageProcessor,
    path: &Path,
    limit: &Limit,
    json: bool,
) -> Result<i32> {
    let entries: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    let pb = image_progress(entries.len() as u64, json);
    let mut results = Vec::new();
    let mut skipped = 0;

    for entry in entries {
        pb.inc(1);
        let metadata = match ImageFile::open(entry.path()).await {
            Ok(file) => processor.load_metadata(&file).await,
            Err(e) => Err(e),
        };
        match metadata {
            Ok(metadata) => results.push(AnalyzedImage {
                path: entry.path().display().to_string(),
                violations: limit.violations(&metadata),
                metadata,
            }),
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Skipping");
                skipped += 1;
            }
        }
    }
    finish_success(&pb, "Done");

    let rejected = results.iter().filter(|r| !r.violations.is_empty()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        Status::header("Analysis");
        Status::field("Images", format_count(results.len(), "image", "images"));
        Status::field("Skipped", format_count(skipped, "file", "files"));
        Status::field(
            "Total size",
            format_size(results.iter().map(|r| r.metadata.size()).sum()),
        );
        for result in results.iter().filter(|r| !r.violations.is_empty()) {
            Status::warning(&result.path);
            for violation in &result.violations {
                println!("    {violation}");
            }
        }
        if rejected == 0 {
            Status::success("All images within limits");
        }
    }

    let violations = results.iter().map(|r| r.violations.len()).sum();
    Ok(violation_code(violations, json))
}

fn print_metadata(metadata: &ImageMetadata) {
    let orientation = if metadata.is_landscape() {
        "Landscape"
    } else if metadata.is_portrait() {
        "Portrait"
    } else {
        "Square"
    };

    Status::header(metadata.name());
    Status::field("Dimensions", format_dimensions(metadata.width(), metadata.height()));
    Status::field("Aspect", format!("{:.2}", metadata.aspect_ratio()));
    Status::field("Orientation", orientation);
    Status::field("Size", format!("{} ({} bytes)", format_size(metadata.size()), metadata.size()));
    Status::field("Type", metadata.src().mime_type());
}

/// `<dir>/<stem>.resized.<ext>`
fn default_output(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}.resized.{}", ext.to_string_lossy()),
        None => format!("{stem}.resized"),
    };
    path.with_file_name(name)
}
