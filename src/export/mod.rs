//! Conversion pipeline and output sinks.
//!
//! [`convert`] runs the pure part of a conversion: numeric normalization,
//! layer aggregation and row assembly. The sinks in [`workbook`] and
//! [`json`] write the resulting tables.

pub mod json;
pub mod rows;
pub mod workbook;

pub use json::write_json;
pub use rows::build_output_rows;
pub use workbook::{write_workbook, SheetNames};

use crate::ags::AgsTables;
use crate::analysis::{aggregate_layers, join_points, AbbreviationLookup};
use crate::config::{ColumnsConfig, Config};
use crate::models::{ConversionOutput, FieldTestFilter, GroupingKey, LocationSource, Table};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Elevation mode written for every field test.
pub const ELEVATION_MODE: &str = "input";

/// Options for a single conversion run.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub grouping: GroupingKey,
    pub field_test_filter: FieldTestFilter,
    pub category_label: String,
    pub location_source: LocationSource,
    pub assign_colors: bool,
    pub include_classification: bool,
    pub pattern_id: String,
    pub background: String,
    pub saturation: u32,
    pub columns: ColumnsConfig,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConversionOptions {
    fn from(config: &Config) -> Self {
        let export = &config.export;
        Self {
            grouping: export.grouping,
            field_test_filter: export.field_test_filter,
            category_label: export.category_label.clone(),
            location_source: export.location_source,
            assign_colors: export.assign_colors,
            include_classification: export.include_classification,
            pattern_id: export.pattern_id.clone(),
            background: export.background.clone(),
            saturation: export.saturation,
            columns: config.columns.clone(),
        }
    }
}

/// Convert parsed AGS tables into field test and layer rows.
///
/// Missing groups produce empty output rather than an error.
pub fn convert(tables: AgsTables, options: &ConversionOptions) -> ConversionOutput {
    let columns = &options.columns;
    let AgsTables {
        mut geol,
        mut loca,
        point,
        abbr,
    } = tables;

    if geol.headings().is_empty() {
        warn!("No GEOL group found; no layers will be written");
    }
    if loca.headings().is_empty() {
        warn!("No LOCA group found; no field tests will be written");
    }

    normalize(&mut geol, &mut loca, columns);

    let abbreviations = AbbreviationLookup::from_table(&abbr, &columns.legend);
    if abbreviations.is_empty() {
        debug!("No ABBR entries; soil names fall back to legend codes");
    }
    let layers = aggregate_layers(&geol, &abbreviations, options.grouping, columns);

    let (locations, id_column) = match options.location_source {
        LocationSource::Point if point.has_column(&columns.point_id) => {
            let joined = join_points(&point, &loca, &columns.point_id, &columns.location_id);
            (Cow::Owned(joined), columns.point_id.as_str())
        }
        LocationSource::Point => {
            debug!("No POINT group with {}; using LOCA", columns.point_id);
            (Cow::Borrowed(&loca), columns.location_id.as_str())
        }
        LocationSource::Loca => (Cow::Borrowed(&loca), columns.location_id.as_str()),
    };

    let output = build_output_rows(&locations, id_column, &layers, options);
    info!(
        "Converted {} field tests and {} layers",
        output.field_tests.len(),
        output.layers.len()
    );
    output
}

/// Coerce the depth and coordinate columns to numbers.
pub fn normalize(geol: &mut Table, loca: &mut Table, columns: &ColumnsConfig) {
    geol.coerce_numeric(&[
        columns.top.as_str(),
        columns.base.as_str(),
        columns.depth.as_str(),
    ]);
    loca.coerce_numeric(&[
        columns.northing.as_str(),
        columns.easting.as_str(),
        columns.ground_level.as_str(),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ags::load_tables;
    use crate::models::{CellValue, Value};

    const SCENARIO: &str = r#""GROUP","LOCA"
"HEADING","LOCA_ID","LOCA_NATN","LOCA_NATE","LOCA_GL"
"DATA","BH1","100","200","50"

"GROUP","GEOL"
"HEADING","LOCA_ID","GEOL_TOP","GEOL_BASE","GEOL_DESC","GEOL_LEG"
"DATA","BH1","0","1","Soft CLAY","CLAY"
"DATA","BH1","1","3","Firm CLAY","CLAY"
"#;

    #[test]
    fn test_end_to_end_scenario() {
        let output = convert(load_tables(SCENARIO), &ConversionOptions::default());

        assert_eq!(output.field_tests.len(), 1);
        let test = &output.field_tests[0];
        assert_eq!(test.id, "BH1");
        assert_eq!(test.category, "EN - Standard: Borehole");
        assert_eq!(test.northing, Some(100.0));
        assert_eq!(test.easting, Some(200.0));
        assert_eq!(test.elevation_mode, "input");
        assert_eq!(test.ground_level, Some(50.0));

        assert_eq!(output.layers.len(), 1);
        let layer = &output.layers[0];
        assert_eq!(layer.borehole_id, "BH1");
        assert_eq!(layer.thickness, Some(3.0));
        assert_eq!(layer.soil_name, "CLAY");
        assert_eq!(layer.classification, "Clay, fine grained");
        assert_eq!(layer.description, "Soft CLAY; Firm CLAY");
        assert_eq!(layer.color, "$808080");
        assert_eq!(layer.pattern, "GEO_CLAY");
        assert_eq!(layer.background, "clDefault");
        assert_eq!(layer.cells()[6], CellValue::Number(50.0));
    }

    #[test]
    fn test_normalize_geology_and_locations() {
        let tables = load_tables(
            "GROUP,LOCA\nHEADING,LOCA_ID,LOCA_NATN,LOCA_GL\nDATA,BH1, 12.5 ,\n\
             GROUP,GEOL\nHEADING,LOCA_ID,GEOL_TOP,GEOL_BASE,GEOL_DEPTH,GEOL_LEG\n\
             DATA,BH1,0,N/A,1.5,CLAY\n",
        );
        let AgsTables {
            mut geol, mut loca, ..
        } = tables;
        normalize(&mut geol, &mut loca, &ColumnsConfig::default());

        let interval = geol.rows().next().unwrap();
        assert_eq!(interval.get("GEOL_TOP"), Some(&Value::Number(0.0)));
        assert_eq!(interval.get("GEOL_BASE"), Some(&Value::NotANumber));
        assert_eq!(interval.get("GEOL_DEPTH"), Some(&Value::Number(1.5)));
        assert_eq!(interval.text("GEOL_LEG"), "CLAY");

        let location = loca.rows().next().unwrap();
        assert_eq!(location.number("LOCA_NATN"), Some(12.5));
        assert_eq!(location.get("LOCA_GL"), Some(&Value::NotANumber));
    }

    #[test]
    fn test_empty_document() {
        let output = convert(load_tables(""), &ConversionOptions::default());
        assert!(output.field_tests.is_empty());
        assert!(output.layers.is_empty());
    }

    #[test]
    fn test_point_source_falls_back_to_loca() {
        let options = ConversionOptions {
            location_source: LocationSource::Point,
            ..ConversionOptions::default()
        };
        let output = convert(load_tables(SCENARIO), &options);
        assert_eq!(output.field_tests.len(), 1);
        assert_eq!(output.field_tests[0].id, "BH1");
    }

    #[test]
    fn test_point_source_uses_joined_coordinates() {
        let doc = format!(
            "{}\n\"GROUP\",\"POINT\"\n\"HEADING\",\"POINT_ID\"\n\"DATA\",\"BH1\"\n\"DATA\",\"CPT1\"\n",
            SCENARIO
        );
        let options = ConversionOptions {
            location_source: LocationSource::Point,
            ..ConversionOptions::default()
        };
        let output = convert(load_tables(&doc), &options);

        assert_eq!(output.field_tests.len(), 2);
        assert_eq!(output.field_tests[0].northing, Some(100.0));
        assert_eq!(output.field_tests[1].id, "CPT1");
        assert_eq!(output.field_tests[1].northing, None);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.export.category_label = "(local set) : Borehole".to_string();
        config.export.assign_colors = false;

        let options = ConversionOptions::from(&config);
        let output = convert(load_tables(SCENARIO), &options);
        assert_eq!(output.field_tests[0].category, "(local set) : Borehole");
        assert_eq!(output.layers[0].color, "");
    }
}
