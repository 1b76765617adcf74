//! GEO5 import workbook output.
//!
//! Rows are written into the `FieldTests` and `Layers` sheets of the import
//! template starting at row 2, after clearing any rows already below the
//! header. Without a template a blank workbook with default headers is used.

use crate::error::{ExportError, Result};
use crate::models::{CellValue, ConversionOutput};
use std::path::Path;
use tracing::{debug, info};
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Headers written when no template is supplied.
pub const FIELD_TEST_HEADERS: [&str; 6] = [
    "Name",
    "Field test type",
    "Coordinate x",
    "Coordinate y",
    "Elevation",
    "Ground level",
];

pub const LAYER_HEADERS: [&str; 9] = [
    "Test name",
    "Thickness",
    "Soil name",
    "Soil pattern|Pattern",
    "Soil pattern|Color",
    "Soil pattern|Background",
    "Soil pattern|Saturation",
    "Layer description",
    "EN ISO 14688-1 Classification",
];

/// Names of the two sheets the template must provide.
#[derive(Debug, Clone)]
pub struct SheetNames {
    pub field_tests: String,
    pub layers: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            field_tests: "FieldTests".to_string(),
            layers: "Layers".to_string(),
        }
    }
}

impl From<&crate::config::TemplateConfig> for SheetNames {
    fn from(config: &crate::config::TemplateConfig) -> Self {
        Self {
            field_tests: config.field_tests_sheet.clone(),
            layers: config.layers_sheet.clone(),
        }
    }
}

/// Fill the template and save it to `destination`.
///
/// The workbook is saved to a temporary file next to `destination` and
/// renamed into place, so a failed write never leaves a truncated file.
pub fn write_workbook(
    output: &ConversionOutput,
    template: Option<&Path>,
    sheets: &SheetNames,
    destination: &Path,
) -> Result<()> {
    let mut book = match template {
        Some(path) => {
            info!("Loading template: {}", path.display());
            umya_spreadsheet::reader::xlsx::read(path).map_err(|e| ExportError::Template {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        None => {
            debug!("No template; creating a blank workbook");
            blank_workbook(sheets)?
        }
    };

    fill_sheet(
        &mut book,
        &sheets.field_tests,
        output.field_tests.iter().map(|row| row.cells()),
    )?;
    fill_sheet(
        &mut book,
        &sheets.layers,
        output.layers.iter().map(|row| row.cells()),
    )?;

    save(&book, destination)
}

/// A workbook containing only the two sheets and their header rows.
pub fn blank_workbook(sheets: &SheetNames) -> Result<Spreadsheet> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();

    for (name, headers) in [
        (&sheets.field_tests, &FIELD_TEST_HEADERS[..]),
        (&sheets.layers, &LAYER_HEADERS[..]),
    ] {
        let sheet = book
            .new_sheet(name.as_str())
            .map_err(|e| ExportError::Sheet(name.clone(), e.to_string()))?;
        for (col, header) in headers.iter().enumerate() {
            sheet
                .get_cell_mut((col as u32 + 1, 1u32))
                .set_value(header.to_string());
        }
    }

    Ok(book)
}

fn fill_sheet<I>(book: &mut Spreadsheet, name: &str, rows: I) -> Result<()>
where
    I: Iterator<Item = Vec<CellValue>>,
{
    let sheet = book
        .get_sheet_by_name_mut(name)
        .ok_or_else(|| ExportError::MissingSheet(name.to_string()))?;

    clear_data_rows(sheet);

    let mut written = 0;
    for (idx, cells) in rows.enumerate() {
        let row = idx as u32 + 2;
        for (col, value) in cells.into_iter().enumerate() {
            write_cell(sheet, col as u32 + 1, row, value);
        }
        written += 1;
    }

    debug!("Wrote {} rows to sheet {}", written, name);
    Ok(())
}

/// Remove every row below the header.
fn clear_data_rows(sheet: &mut Worksheet) {
    let last = sheet.get_highest_row();
    if last >= 2 {
        sheet.remove_row(&2, &(last - 1));
    }
}

fn write_cell(sheet: &mut Worksheet, col: u32, row: u32, value: CellValue) {
    match value {
        CellValue::Number(n) => {
            sheet.get_cell_mut((col, row)).set_value_number(n);
        }
        CellValue::Text(text) if !text.is_empty() => {
            sheet.get_cell_mut((col, row)).set_value(text);
        }
        CellValue::Text(_) | CellValue::Empty => {}
    }
}

fn save(book: &Spreadsheet, destination: &Path) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staging = tempfile::Builder::new()
        .prefix(".ags2geo5-")
        .suffix(".xlsx")
        .tempfile_in(dir)?;

    umya_spreadsheet::writer::xlsx::write(book, staging.path()).map_err(|e| {
        ExportError::Workbook {
            path: destination.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    staging.persist(destination).map_err(|e| e.error)?;
    info!("Saved workbook: {}", destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldTestRow, LayerRow};

    fn sample_output() -> ConversionOutput {
        ConversionOutput {
            field_tests: vec![FieldTestRow {
                id: "BH1".into(),
                category: "EN - Standard: Borehole".into(),
                northing: Some(100.0),
                easting: Some(200.0),
                elevation_mode: "input".into(),
                ground_level: None,
            }],
            layers: vec![LayerRow {
                borehole_id: "BH1".into(),
                thickness: Some(3.0),
                soil_name: "CLAY".into(),
                pattern: "GEO_CLAY".into(),
                color: "$808080".into(),
                background: "clDefault".into(),
                saturation: 50,
                description: "Firm CLAY".into(),
                classification: "Clay, fine grained".into(),
            }],
        }
    }

    #[test]
    fn test_blank_workbook_has_headers() {
        let book = blank_workbook(&SheetNames::default()).unwrap();
        let layers = book.get_sheet_by_name("Layers").unwrap();
        assert_eq!(layers.get_value((1u32, 1u32)), "Test name");
        assert_eq!(layers.get_value((9u32, 1u32)), "EN ISO 14688-1 Classification");
        assert!(book.get_sheet_by_name("FieldTests").is_some());
    }

    #[test]
    fn test_write_without_template() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.xlsx");

        write_workbook(&sample_output(), None, &SheetNames::default(), &dest).unwrap();
        assert!(dest.exists());

        let book = umya_spreadsheet::reader::xlsx::read(&dest).unwrap();
        let tests = book.get_sheet_by_name("FieldTests").unwrap();
        assert_eq!(tests.get_value((1u32, 2u32)), "BH1");
        assert_eq!(tests.get_value((3u32, 2u32)), "100");
        assert_eq!(tests.get_value((6u32, 2u32)), "");

        let layers = book.get_sheet_by_name("Layers").unwrap();
        assert_eq!(layers.get_value((5u32, 2u32)), "$808080");
        assert_eq!(layers.get_value((7u32, 2u32)), "50");
    }

    #[test]
    fn test_template_rows_are_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.xlsx");
        let dest = dir.path().join("out.xlsx");

        let mut book = blank_workbook(&SheetNames::default()).unwrap();
        let sheet = book.get_sheet_by_name_mut("Layers").unwrap();
        for row in 2u32..6 {
            sheet.get_cell_mut((1u32, row)).set_value("stale");
        }
        umya_spreadsheet::writer::xlsx::write(&book, &template).unwrap();

        write_workbook(
            &sample_output(),
            Some(&template),
            &SheetNames::default(),
            &dest,
        )
        .unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&dest).unwrap();
        let layers = book.get_sheet_by_name("Layers").unwrap();
        assert_eq!(layers.get_value((1u32, 1u32)), "Test name");
        assert_eq!(layers.get_value((1u32, 2u32)), "BH1");
        assert_eq!(layers.get_value((1u32, 3u32)), "");
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.xlsx");
        let sheets = SheetNames {
            field_tests: "FieldTests".into(),
            layers: "Strata".into(),
        };
        let template = dir.path().join("template.xlsx");
        let book = blank_workbook(&SheetNames::default()).unwrap();
        umya_spreadsheet::writer::xlsx::write(&book, &template).unwrap();

        let err = write_workbook(&sample_output(), Some(&template), &sheets, &dest).unwrap_err();
        assert!(matches!(err, ExportError::MissingSheet(ref name) if name == "Strata"));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unreadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_workbook(
            &sample_output(),
            Some(&dir.path().join("missing.xlsx")),
            &SheetNames::default(),
            &dir.path().join("out.xlsx"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Template { .. }));
    }
}
