//! Data models for the AGS to GEO5 converter.
//!
//! This module contains the tabular representation of parsed AGS groups,
//! the derived layer records and the output rows written to the template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a parsed AGS table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw text as read from a DATA line.
    Text(String),
    /// A cell of a numeric column that parsed as a finite number.
    Number(f64),
    /// A cell of a numeric column that could not be parsed.
    NotANumber,
}

impl Value {
    /// Coerce this cell to a number, turning anything unparseable into `NotANumber`.
    pub fn to_numeric(&self) -> Value {
        match self {
            Value::Text(raw) => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::NotANumber,
            },
            other => other.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// An AGS group parsed into named columns.
///
/// Rows are positionally aligned to `headings` and may be shorter than it;
/// trailing cells of a short row are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headings: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new(name: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headings,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headings.iter().position(|h| h == column)
    }

    /// Appends a row of text cells, dropping any cells beyond the heading count.
    pub fn push_text_row(&mut self, cells: Vec<String>) {
        let width = self.headings.len();
        let row = cells.into_iter().take(width).map(Value::Text).collect();
        self.rows.push(row);
    }

    /// Appends a row of already typed cells, dropping any beyond the heading count.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        cells.truncate(self.headings.len());
        self.rows.push(cells);
    }

    /// Iterate over rows with named-column access.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            table: self,
            cells,
        })
    }

    /// Convert the given columns to numbers in place.
    ///
    /// Columns missing from the table are skipped.
    pub fn coerce_numeric(&mut self, columns: &[&str]) {
        for column in columns {
            let Some(idx) = self.column_index(column) else {
                continue;
            };
            for row in &mut self.rows {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = cell.to_numeric();
                }
            }
        }
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    /// Returns the cell for `column`, or `None` if the column or the cell is absent.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.table.column_index(column)?;
        self.cells.get(idx)
    }

    /// Text content of `column`; `""` when absent or when the cell is numeric.
    pub fn text(&self, column: &str) -> &'a str {
        self.get(column).and_then(Value::as_text).unwrap_or("")
    }

    /// Numeric content of `column`; `None` when absent, textual or not a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    pub fn cells(&self) -> &'a [Value] {
        self.cells
    }
}

/// Key used to merge geology intervals into layers within a borehole.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingKey {
    /// Group intervals sharing a legend code.
    #[default]
    Legend,
    /// Group intervals sharing an explicit or derived layer name.
    LayerName,
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingKey::Legend => write!(f, "legend"),
            GroupingKey::LayerName => write!(f, "layer-name"),
        }
    }
}

/// Which location rows become field tests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FieldTestFilter {
    /// Drop any row without an ID.
    #[default]
    RequireId,
    /// Drop a row only when it has no ID and no numeric coordinate at all.
    RequireIdOrCoordinates,
}

impl FieldTestFilter {
    /// Returns true if a location row should produce a field test.
    pub fn keeps(
        &self,
        id: &str,
        northing: Option<f64>,
        easting: Option<f64>,
        ground_level: Option<f64>,
    ) -> bool {
        match self {
            FieldTestFilter::RequireId => !id.is_empty(),
            FieldTestFilter::RequireIdOrCoordinates => {
                !id.is_empty()
                    || northing.is_some()
                    || easting.is_some()
                    || ground_level.is_some()
            }
        }
    }
}

/// Table that supplies field-test locations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
    /// LOCA rows.
    #[default]
    Loca,
    /// POINT rows joined with their LOCA record.
    Point,
}

/// A layer aggregated from one or more geology intervals of a borehole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub borehole_id: String,
    /// `None` when either depth bound is missing or not numeric.
    pub thickness: Option<f64>,
    pub soil_name: String,
    pub legend_code: String,
    pub description: String,
    pub classification: String,
}

/// A spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// One row of the FieldTests sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTestRow {
    pub id: String,
    pub category: String,
    pub northing: Option<f64>,
    pub easting: Option<f64>,
    pub elevation_mode: String,
    pub ground_level: Option<f64>,
}

impl FieldTestRow {
    /// Cells in template column order (1-6).
    pub fn cells(&self) -> Vec<CellValue> {
        vec![
            self.id.as_str().into(),
            self.category.as_str().into(),
            self.northing.into(),
            self.easting.into(),
            self.elevation_mode.as_str().into(),
            self.ground_level.into(),
        ]
    }
}

/// One row of the Layers sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRow {
    pub borehole_id: String,
    pub thickness: Option<f64>,
    pub soil_name: String,
    pub pattern: String,
    pub color: String,
    pub background: String,
    pub saturation: u32,
    pub description: String,
    pub classification: String,
}

impl LayerRow {
    /// Cells in template column order (1-9).
    pub fn cells(&self) -> Vec<CellValue> {
        vec![
            self.borehole_id.as_str().into(),
            self.thickness.into(),
            self.soil_name.as_str().into(),
            self.pattern.as_str().into(),
            self.color.as_str().into(),
            self.background.as_str().into(),
            CellValue::Number(f64::from(self.saturation)),
            self.description.as_str().into(),
            self.classification.as_str().into(),
        ]
    }
}

/// The two output tables of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub field_tests: Vec<FieldTestRow>,
    pub layers: Vec<LayerRow>,
}

impl ConversionOutput {
    /// Number of distinct boreholes with at least one layer row.
    ///
    /// Layer rows of one borehole are contiguous.
    pub fn borehole_count(&self) -> usize {
        self.layers
            .chunk_by(|a, b| a.borehole_id == b.borehole_id)
            .count()
    }
}

/// Metadata about a conversion run, included in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionMetadata {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub grouping: GroupingKey,
    pub boreholes: usize,
    pub field_tests: usize,
    pub layers: usize,
}
