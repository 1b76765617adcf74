//! JSON output.

use crate::error::Result;
use crate::models::{ConversionMetadata, ConversionOutput};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct JsonDocument<'a> {
    metadata: &'a ConversionMetadata,
    #[serde(flatten)]
    output: &'a ConversionOutput,
}

/// Render the output tables and run metadata as pretty-printed JSON.
pub fn generate_json(output: &ConversionOutput, metadata: &ConversionMetadata) -> Result<String> {
    let document = JsonDocument { metadata, output };
    serde_json::to_string_pretty(&document).map_err(Into::into)
}

/// Write a JSON document to a file.
pub fn write_json(
    output: &ConversionOutput,
    metadata: &ConversionMetadata,
    path: &Path,
) -> Result<()> {
    let content = generate_json(output, metadata)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldTestRow, GroupingKey};
    use chrono::Utc;

    fn metadata() -> ConversionMetadata {
        ConversionMetadata {
            source: "site.ags".to_string(),
            generated_at: Utc::now(),
            grouping: GroupingKey::Legend,
            boreholes: 0,
            field_tests: 1,
            layers: 0,
        }
    }

    #[test]
    fn test_generate_json() {
        let output = ConversionOutput {
            field_tests: vec![FieldTestRow {
                id: "BH1".into(),
                category: "EN - Standard: Borehole".into(),
                northing: Some(100.0),
                easting: None,
                elevation_mode: "input".into(),
                ground_level: Some(50.0),
            }],
            layers: Vec::new(),
        };

        let json = generate_json(&output, &metadata()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["source"], "site.ags");
        assert_eq!(value["metadata"]["grouping"], "legend");
        assert_eq!(value["field_tests"][0]["id"], "BH1");
        assert!(value["field_tests"][0]["easting"].is_null());
        assert!(value["layers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&ConversionOutput::default(), &metadata(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"metadata\""));
    }
}
