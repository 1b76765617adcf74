//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ags2geo5.toml` files.

use crate::models::{FieldTestFilter, GroupingKey, LocationSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".ags2geo5.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Template workbook settings.
    #[serde(default)]
    pub template: TemplateConfig,

    /// Conversion settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// AGS heading names.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "Geo5_Import.xlsx".to_string()
}

/// Template workbook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Path of the GEO5 import template.
    ///
    /// When unset, `FieldTestImportTemplate.xlsx` in the current directory is
    /// used if present, otherwise a blank workbook with default headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Name of the field tests sheet.
    #[serde(default = "default_field_tests_sheet")]
    pub field_tests_sheet: String,

    /// Name of the layers sheet.
    #[serde(default = "default_layers_sheet")]
    pub layers_sheet: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: None,
            field_tests_sheet: default_field_tests_sheet(),
            layers_sheet: default_layers_sheet(),
        }
    }
}

fn default_field_tests_sheet() -> String {
    "FieldTests".to_string()
}

fn default_layers_sheet() -> String {
    "Layers".to_string()
}

/// Conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// How geology intervals are merged into layers.
    #[serde(default)]
    pub grouping: GroupingKey,

    /// Which location rows become field tests.
    #[serde(default)]
    pub field_test_filter: FieldTestFilter,

    /// Field test category; must be one the template accepts.
    #[serde(default = "default_category_label")]
    pub category_label: String,

    /// Table supplying field test locations.
    #[serde(default)]
    pub location_source: LocationSource,

    /// Fill the soil pattern color column.
    #[serde(default = "default_true")]
    pub assign_colors: bool,

    /// Fill the classification column.
    #[serde(default = "default_true")]
    pub include_classification: bool,

    /// Soil pattern identifier.
    #[serde(default = "default_pattern_id")]
    pub pattern_id: String,

    /// Soil pattern background mode.
    #[serde(default = "default_background")]
    pub background: String,

    /// Soil pattern saturation.
    #[serde(default = "default_saturation")]
    pub saturation: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            grouping: GroupingKey::default(),
            field_test_filter: FieldTestFilter::default(),
            category_label: default_category_label(),
            location_source: LocationSource::default(),
            assign_colors: true,
            include_classification: true,
            pattern_id: default_pattern_id(),
            background: default_background(),
            saturation: default_saturation(),
        }
    }
}

fn default_category_label() -> String {
    "EN - Standard: Borehole".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pattern_id() -> String {
    "GEO_CLAY".to_string()
}

fn default_background() -> String {
    "clDefault".to_string()
}

fn default_saturation() -> u32 {
    50
}

/// AGS heading names read by the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    /// Borehole ID on GEOL rows.
    pub borehole_id: String,
    /// Interval top depth.
    pub top: String,
    /// Interval base depth.
    pub base: String,
    /// Interval depth, coerced alongside top and base.
    pub depth: String,
    /// Legend code.
    pub legend: String,
    /// Free-text description.
    pub description: String,
    /// Explicit layer name; derived from the description when blank.
    pub layer_name: String,
    /// Location ID on LOCA rows.
    pub location_id: String,
    /// Point ID on POINT rows.
    pub point_id: String,
    pub northing: String,
    pub easting: String,
    pub ground_level: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            borehole_id: "LOCA_ID".to_string(),
            top: "GEOL_TOP".to_string(),
            base: "GEOL_BASE".to_string(),
            depth: "GEOL_DEPTH".to_string(),
            legend: "GEOL_LEG".to_string(),
            description: "GEOL_DESC".to_string(),
            layer_name: "GEOL_GEOL".to_string(),
            location_id: "LOCA_ID".to_string(),
            point_id: "POINT_ID".to_string(),
            northing: "LOCA_NATN".to_string(),
            easting: "LOCA_NATE".to_string(),
            ground_level: "LOCA_GL".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref template) = args.template {
            self.template.path = Some(template.display().to_string());
        }

        if let Some(grouping) = args.group_by {
            self.export.grouping = grouping;
        }
        if let Some(filter) = args.filter {
            self.export.field_test_filter = filter;
        }
        if let Some(ref category) = args.category {
            self.export.category_label = category.clone();
        }
        if let Some(source) = args.location_source {
            self.export.location_source = source;
        }

        // Flags only ever switch features off
        if args.no_colors {
            self.export.assign_colors = false;
        }
        if args.no_classification {
            self.export.include_classification = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
