//! ags2geo5 - AGS4 to GEO5 field test import converter
//!
//! Reads boreholes (LOCA/POINT) and geology (GEOL, ABBR) from AGS4 files and
//! writes them as field tests and layers into the GEO5 import template.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (invalid arguments, unreadable input, unwritable output)

mod ags;
mod analysis;
mod cli;
mod config;
mod error;
mod export;
mod models;
mod scanner;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use export::{ConversionOptions, SheetNames};
use indicatif::{ProgressBar, ProgressStyle};
use models::{ConversionMetadata, ConversionOutput};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Template picked up from the working directory when none is configured.
const DEFAULT_TEMPLATE: &str = "FieldTestImportTemplate.xlsx";

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` applies
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("ags2geo5 v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(args, config) {
        error!("Conversion failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ags2geo5.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize grouping, filters, labels and column names.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// A resolved output destination.
struct Target {
    format: OutputFormat,
    template: Option<PathBuf>,
    sheets: SheetNames,
}

/// Run the conversion for a file or a directory of files.
fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    let options = ConversionOptions::from(&config);

    let input = args.input.clone().unwrap_or_default();
    let target = Target {
        format: args.format,
        template: resolve_template(&config, args.format),
        sheets: SheetNames::from(&config.template),
    };

    if let Some(ref template) = target.template {
        debug!("Using template: {}", template.display());
    }

    let converted = if input.is_dir() {
        run_directory(&input, &args, &options, &target)?
    } else {
        let output = output_path(&config.general.output, args.format);
        convert_file(&input, &output, &options, &target, args.dry_run)?;
        1
    };

    println!(
        "\n✅ Converted {} file(s) in {:.1}s",
        converted,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Convert every AGS file below `input` into the output directory.
fn run_directory(
    input: &Path,
    args: &Args,
    options: &ConversionOptions,
    target: &Target,
) -> Result<usize> {
    let files = scanner::AgsScanner::new(input.to_path_buf()).scan()?;
    if files.is_empty() {
        warn!("No AGS files found in {}", input.display());
        return Ok(0);
    }

    // The configured output file name only makes sense for a single file
    let out_dir = args.output.clone().unwrap_or_else(|| input.to_path_buf());
    if !args.dry_run {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }
    debug!("Output directory: {}", out_dir.display());

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    };

    for file in &files {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "converted".to_string());
        progress.set_message(stem.clone());

        let output = out_dir.join(format!("{}_geo5.{}", stem, target.format.extension()));
        progress.suspend(|| convert_file(file, &output, options, target, args.dry_run))?;
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(files.len())
}

/// Convert one AGS file and write it to `output`.
fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
    target: &Target,
    dry_run: bool,
) -> Result<ConversionOutput> {
    println!("📥 Reading {}", input.display());
    let document = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read AGS file: {}", input.display()))?;

    let tables = ags::load_tables(&document);
    println!(
        "   Groups: GEOL {} rows | LOCA {} rows | POINT {} rows | ABBR {} rows",
        tables.geol.len(),
        tables.loca.len(),
        tables.point.len(),
        tables.abbr.len()
    );

    let result = export::convert(tables, options);
    println!(
        "   Boreholes: {} | Field tests: {} | Layers: {}",
        result.borehole_count(),
        result.field_tests.len(),
        result.layers.len()
    );

    if dry_run {
        println!("   Dry run: nothing written.");
        return Ok(result);
    }

    let written = match target.format {
        OutputFormat::Xlsx => {
            export::write_workbook(&result, target.template.as_deref(), &target.sheets, output)
        }
        OutputFormat::Json => {
            let metadata = ConversionMetadata {
                source: input.display().to_string(),
                generated_at: Utc::now(),
                grouping: options.grouping,
                boreholes: result.borehole_count(),
                field_tests: result.field_tests.len(),
                layers: result.layers.len(),
            };
            export::write_json(&result, &metadata, output)
        }
    };
    written.with_context(|| format!("Failed to write {}", output.display()))?;

    println!("   📝 Saved {}", output.display());
    Ok(result)
}

/// Pick the template: configured path, then the conventional file name in
/// the working directory, then none.
fn resolve_template(config: &Config, format: OutputFormat) -> Option<PathBuf> {
    if format != OutputFormat::Xlsx {
        return None;
    }
    if let Some(ref path) = config.template.path {
        return Some(PathBuf::from(path));
    }
    let fallback = Path::new(DEFAULT_TEMPLATE);
    if fallback.is_file() {
        info!("Found {} in working directory", DEFAULT_TEMPLATE);
        return Some(fallback.to_path_buf());
    }
    None
}

/// Output file for a single conversion, with the extension matching `format`.
fn output_path(configured: &str, format: OutputFormat) -> PathBuf {
    let path = PathBuf::from(configured);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(format.extension()) => path,
        _ => path.with_extension(format.extension()),
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems with the default config file
/// are reported on stderr. Returns the path of the file that was loaded.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, Some(PathBuf::from(config::CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", config::CONFIG_FILE, e);
            Ok((Config::default(), None))
        }
    }
}
