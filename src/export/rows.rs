//! Template row assembly.

use super::{ConversionOptions, ELEVATION_MODE};
use crate::analysis::assign_colors;
use crate::models::{ConversionOutput, FieldTestRow, Layer, LayerRow, Table};
use tracing::debug;

/// Build both output tables.
pub fn build_output_rows(
    locations: &Table,
    id_column: &str,
    layers: &[Layer],
    options: &ConversionOptions,
) -> ConversionOutput {
    ConversionOutput {
        field_tests: build_field_test_rows(locations, id_column, options),
        layers: build_layer_rows(layers, options),
    }
}

/// One field test per location row accepted by the configured filter.
pub fn build_field_test_rows(
    locations: &Table,
    id_column: &str,
    options: &ConversionOptions,
) -> Vec<FieldTestRow> {
    let columns = &options.columns;
    let mut skipped = 0;

    let rows: Vec<FieldTestRow> = locations
        .rows()
        .filter_map(|row| {
            let id = row.text(id_column);
            let northing = row.number(&columns.northing);
            let easting = row.number(&columns.easting);
            let ground_level = row.number(&columns.ground_level);

            if !options
                .field_test_filter
                .keeps(id, northing, easting, ground_level)
            {
                skipped += 1;
                return None;
            }

            Some(FieldTestRow {
                id: id.to_string(),
                category: options.category_label.clone(),
                northing,
                easting,
                elevation_mode: ELEVATION_MODE.to_string(),
                ground_level,
            })
        })
        .collect();

    if skipped > 0 {
        debug!("Skipped {} location rows without an ID", skipped);
    }
    rows
}

/// One layer row per aggregated layer; colors run top to bottom per borehole.
pub fn build_layer_rows(layers: &[Layer], options: &ConversionOptions) -> Vec<LayerRow> {
    let mut rows = Vec::with_capacity(layers.len());

    for borehole in layers.chunk_by(|a, b| a.borehole_id == b.borehole_id) {
        let colors = if options.assign_colors {
            assign_colors(borehole.len())
        } else {
            Vec::new()
        };

        for (idx, layer) in borehole.iter().enumerate() {
            rows.push(LayerRow {
                borehole_id: layer.borehole_id.clone(),
                thickness: layer.thickness,
                soil_name: layer.soil_name.clone(),
                pattern: options.pattern_id.clone(),
                color: colors.get(idx).cloned().unwrap_or_default(),
                background: options.background.clone(),
                saturation: options.saturation,
                description: layer.description.clone(),
                classification: if options.include_classification {
                    layer.classification.clone()
                } else {
                    String::new()
                },
            });
        }
    }

    rows
}
