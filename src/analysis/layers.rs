//! Geology interval aggregation.
//!
//! Intervals are grouped per borehole and then per layer key. Both levels
//! keep first-seen order so output is reproducible for a given file.

use crate::config::ColumnsConfig;
use crate::models::{GroupingKey, Layer, Row, Table};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

pub const ABBR_HDNG: &str = "ABBR_HDNG";
pub const ABBR_CODE: &str = "ABBR_CODE";
pub const ABBR_DESC: &str = "ABBR_DESC";

lazy_static! {
    // Leading uppercase run, e.g. "SAND AND GRAVEL" in
    // "SAND AND GRAVEL with cobbles" or "CLAY" in "CLAYey SAND".
    static ref LAYER_NAME: Regex =
        Regex::new(r"^[A-Z]+(?: [A-Z]+)*").expect("layer name pattern is valid");
}

/// Derive a layer name from the leading uppercase words of a description.
///
/// Single-letter matches are rejected.
pub fn extract_layer_name(description: &str) -> String {
    match LAYER_NAME.find(description) {
        Some(m) if m.as_str().len() > 1 => m.as_str().to_string(),
        _ => String::new(),
    }
}

/// The explicit layer name of an interval, falling back to one derived from
/// its description.
pub fn resolve_layer_name(row: &Row<'_>, columns: &ColumnsConfig) -> String {
    let explicit = row.text(&columns.layer_name).trim();
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    extract_layer_name(row.text(&columns.description))
}

/// Soil classification for a legend code; `""` for unknown codes.
pub fn classify(legend_code: &str) -> &'static str {
    match legend_code.to_uppercase().as_str() {
        "CLAY" => "Clay, fine grained",
        "SAND" => "Sand, coarse grained",
        "SILT" => "Silt",
        "GRAVEL" => "Gravel",
        _ => "",
    }
}

/// Thickness between two depths, `None` unless both are known.
pub fn thickness(top: Option<f64>, base: Option<f64>) -> Option<f64> {
    match (top, base) {
        (Some(top), Some(base)) => Some(base - top),
        _ => None,
    }
}

/// Code to description lookup built from the ABBR group.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationLookup {
    // code -> (description, defined for the legend heading)
    entries: HashMap<String, (String, bool)>,
}

impl AbbreviationLookup {
    /// Build the lookup from an ABBR table.
    ///
    /// Returns an empty lookup if the table lacks `ABBR_CODE` or `ABBR_DESC`.
    /// Entries whose `ABBR_HDNG` names `legend_heading` take precedence over
    /// entries for other headings; otherwise the first row for a code wins.
    pub fn from_table(table: &Table, legend_heading: &str) -> Self {
        let mut lookup = Self::default();
        if !table.has_column(ABBR_CODE) || !table.has_column(ABBR_DESC) {
            return lookup;
        }
        let has_heading = table.has_column(ABBR_HDNG);

        for row in table.rows() {
            let code = row.text(ABBR_CODE);
            let description = row.text(ABBR_DESC);
            if code.is_empty() || description.is_empty() {
                continue;
            }
            let preferred = !has_heading || row.text(ABBR_HDNG) == legend_heading;

            match lookup.entries.get(code) {
                Some((_, existing_preferred)) if *existing_preferred || !preferred => {}
                _ => {
                    lookup
                        .entries
                        .insert(code.to_string(), (description.to_string(), preferred));
                }
            }
        }

        debug!("Loaded {} abbreviations", lookup.len());
        lookup
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|(desc, _)| desc.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct LayerGroup<'a> {
    key: String,
    intervals: Vec<Row<'a>>,
}

struct BoreholeGroup<'a> {
    id: String,
    layers: Vec<LayerGroup<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> BoreholeGroup<'a> {
    fn new(id: String) -> Self {
        Self {
            id,
            layers: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, key: String, row: Row<'a>) {
        match self.index.get(&key) {
            Some(&idx) => self.layers[idx].intervals.push(row),
            None => {
                self.index.insert(key.clone(), self.layers.len());
                self.layers.push(LayerGroup {
                    key,
                    intervals: vec![row],
                });
            }
        }
    }
}

/// Aggregate geology intervals into layers.
///
/// Depth columns are expected to be numeric already (see
/// [`Table::coerce_numeric`]). Intervals without a borehole ID cell, or
/// without a legend cell when grouping by legend, are skipped. No layers are
/// produced if the borehole ID column, or the legend column when grouping by
/// legend, is missing.
pub fn aggregate_layers(
    geology: &Table,
    abbreviations: &AbbreviationLookup,
    grouping: GroupingKey,
    columns: &ColumnsConfig,
) -> Vec<Layer> {
    if !geology.has_column(&columns.borehole_id) {
        debug!("GEOL has no {} column; no layers", columns.borehole_id);
        return Vec::new();
    }
    if grouping == GroupingKey::Legend && !geology.has_column(&columns.legend) {
        debug!("GEOL has no {} column; no layers", columns.legend);
        return Vec::new();
    }

    let mut boreholes: Vec<BoreholeGroup<'_>> = Vec::new();
    let mut borehole_index: HashMap<String, usize> = HashMap::new();

    for row in geology.rows() {
        let Some(id) = row.get(&columns.borehole_id).and_then(|v| v.as_text()) else {
            continue;
        };
        let key = match grouping {
            GroupingKey::Legend => match row.get(&columns.legend).and_then(|v| v.as_text()) {
                Some(legend) => legend.to_string(),
                None => continue,
            },
            GroupingKey::LayerName => resolve_layer_name(&row, columns),
        };

        let idx = *borehole_index.entry(id.to_string()).or_insert_with(|| {
            boreholes.push(BoreholeGroup::new(id.to_string()));
            boreholes.len() - 1
        });
        boreholes[idx].push(key, row);
    }

    let layers: Vec<Layer> = boreholes
        .iter()
        .flat_map(|borehole| {
            borehole
                .layers
                .iter()
                .map(move |group| build_layer(&borehole.id, group, grouping, abbreviations, columns))
        })
        .collect();

    debug!(
        "Aggregated {} intervals into {} layers across {} boreholes",
        geology.len(),
        layers.len(),
        boreholes.len()
    );

    layers
}

fn build_layer(
    borehole_id: &str,
    group: &LayerGroup<'_>,
    grouping: GroupingKey,
    abbreviations: &AbbreviationLookup,
    columns: &ColumnsConfig,
) -> Layer {
    let top = group
        .intervals
        .iter()
        .filter_map(|row| row.number(&columns.top))
        .reduce(f64::min);
    let base = group
        .intervals
        .iter()
        .filter_map(|row| row.number(&columns.base))
        .reduce(f64::max);

    let description = group
        .intervals
        .iter()
        .map(|row| row.text(&columns.description))
        .collect::<Vec<_>>()
        .join("; ");

    let (legend_code, layer_name) = match grouping {
        GroupingKey::Legend => {
            let name = group
                .intervals
                .first()
                .map(|row| resolve_layer_name(row, columns))
                .unwrap_or_default();
            (group.key.clone(), name)
        }
        GroupingKey::LayerName => {
            let legend = group
                .intervals
                .iter()
                .map(|row| row.text(&columns.legend))
                .find(|legend| !legend.is_empty())
                .unwrap_or("");
            (legend.to_string(), group.key.clone())
        }
    };

    let soil_name = match abbreviations.get(&legend_code) {
        Some(desc) => desc.to_string(),
        None if !legend_code.is_empty() => legend_code.clone(),
        None => layer_name,
    };

    Layer {
        borehole_id: borehole_id.to_string(),
        thickness: thickness(top, base),
        soil_name,
        classification: classify(&legend_code).to_string(),
        legend_code,
        description,
    }
}
