//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{FieldTestFilter, GroupingKey, LocationSource};
use clap::Parser;
use std::path::PathBuf;

/// ags2geo5 - AGS4 to GEO5 field test import converter
///
/// Reads the GEOL, LOCA, POINT and ABBR groups of an AGS4 file and writes
/// boreholes and their layers into the GEO5 field test import template.
///
/// Examples:
///   ags2geo5 site.ags
///   ags2geo5 site.ags -t FieldTestImportTemplate.xlsx -o Geo5_Import.xlsx
///   ags2geo5 site.ags --group-by layer-name --no-colors
///   ags2geo5 ./ags-files -o ./converted
///   ags2geo5 site.ags --format json --dry-run
///   ags2geo5 --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// AGS file, or a directory searched recursively for *.ags files
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path (output directory when INPUT is a directory)
    ///
    /// Defaults to the configured output, Geo5_Import.xlsx.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// GEO5 import template workbook
    #[arg(short, long, value_name = "FILE", env = "AGS2GEO5_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Output format (xlsx, json)
    #[arg(long, default_value = "xlsx", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ags2geo5.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How geology intervals are merged into layers
    #[arg(long, value_name = "KEY")]
    pub group_by: Option<GroupingKey>,

    /// Which location rows become field tests
    #[arg(long, value_name = "POLICY")]
    pub filter: Option<FieldTestFilter>,

    /// Field test category label written to the template
    ///
    /// Must be a category the template accepts, e.g. "EN - Standard: Borehole".
    #[arg(long, value_name = "LABEL")]
    pub category: Option<String>,

    /// Table supplying field test locations
    #[arg(long, value_name = "SOURCE")]
    pub location_source: Option<LocationSource>,

    /// Leave the soil pattern color column empty
    #[arg(long)]
    pub no_colors: bool,

    /// Leave the classification column empty
    #[arg(long)]
    pub no_classification: bool,

    /// Parse and aggregate without writing any output
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .ags2geo5.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// GEO5 import workbook (default)
    #[default]
    Xlsx,
    /// JSON document
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let Some(ref input) = self.input else {
            return Err("An input AGS file or directory is required".to_string());
        };
        if !input.exists() {
            return Err(format!("Input does not exist: {}", input.display()));
        }

        if let Some(ref template) = self.template {
            if self.format == OutputFormat::Json {
                return Err("--template cannot be used with --format json".to_string());
            }
            if !template.is_file() {
                return Err(format!("Template not found: {}", template.display()));
            }
        }

        if let Some(ref category) = self.category {
            if category.trim().is_empty() {
                return Err("Category label must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` is the `general.verbose` config value; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(input: PathBuf) -> Args {
        Args {
            input: Some(input),
            output: None,
            template: None,
            format: OutputFormat::Xlsx,
            config: None,
            group_by: None,
            filter: None,
            category: None,
            location_source: None,
            no_colors: false,
            no_classification: false,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    fn existing_input() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.ags");
        std::fs::write(&path, "").unwrap();
        (dir, path)
    }

    #[test]
    fn test_validation_ok() {
        let (_dir, input) = existing_input();
        assert!(make_args(input).validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let args = make_args(PathBuf::from("/definitely/not/here.ags"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let (_dir, input) = existing_input();
        let mut args = make_args(input);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_template_with_json() {
        let (dir, input) = existing_input();
        let template = dir.path().join("template.xlsx");
        std::fs::write(&template, "").unwrap();
        let mut args = make_args(input);
        args.template = Some(template);
        assert!(args.validate().is_ok());

        args.format = OutputFormat::Json;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args(PathBuf::from("/definitely/not/here.ags"));
        args.input = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "ags2geo5",
            "site.ags",
            "--group-by",
            "layer-name",
            "--filter",
            "require-id-or-coordinates",
            "--location-source",
            "point",
            "--no-colors",
        ])
        .unwrap();
        assert_eq!(args.group_by, Some(GroupingKey::LayerName));
        assert_eq!(args.filter, Some(FieldTestFilter::RequireIdOrCoordinates));
        assert_eq!(args.location_source, Some(LocationSource::Point));
        assert!(args.no_colors);
        assert_eq!(args.format, OutputFormat::Xlsx);
    }

    #[test]
    fn test_log_level() {
        let (_dir, input) = existing_input();
        let mut args = make_args(input);
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
