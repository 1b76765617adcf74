//! GROUP/HEADING/DATA scanner.
//!
//! Each physical line of an AGS4 document is one CSV record whose first
//! field is the line descriptor (`GROUP`, `HEADING`, `UNIT`, `TYPE`, `DATA`).

use crate::models::Table;
use csv::ReaderBuilder;
use tracing::{debug, warn};

pub const GEOL: &str = "GEOL";
pub const LOCA: &str = "LOCA";
pub const POINT: &str = "POINT";
pub const ABBR: &str = "ABBR";

/// The groups consumed by the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct AgsTables {
    pub geol: Table,
    pub loca: Table,
    pub point: Table,
    pub abbr: Table,
}

/// Parse every group the converter uses.
///
/// The document is scanned from the start once per group.
pub fn load_tables(document: &str) -> AgsTables {
    let tables = AgsTables {
        geol: parse_group(document, GEOL),
        loca: parse_group(document, LOCA),
        point: parse_group(document, POINT),
        abbr: parse_group(document, ABBR),
    };

    debug!(
        "Parsed groups: GEOL={} LOCA={} POINT={} ABBR={}",
        tables.geol.len(),
        tables.loca.len(),
        tables.point.len(),
        tables.abbr.len()
    );

    tables
}

/// Extract one group from an AGS document.
///
/// Scanning stops at the first `GROUP` line naming a different group once
/// the requested group has been entered. A group without a `HEADING` line
/// yields a table with no columns and no rows.
pub fn parse_group(document: &str, group_name: &str) -> Table {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let builder = record_reader();

    let mut headings: Vec<String> = Vec::new();
    let mut data: Vec<Vec<String>> = Vec::new();
    let mut in_group = false;

    for (line_no, line) in document.lines().enumerate() {
        let Some(record) = parse_record(&builder, line, line_no + 1) else {
            continue;
        };
        let Some(descriptor) = record.first() else {
            continue;
        };

        match descriptor.as_str() {
            "GROUP" if record.get(1).map(String::as_str) == Some(group_name) => {
                in_group = true;
            }
            "GROUP" if in_group => break,
            "HEADING" if in_group => {
                headings = record[1..].to_vec();
            }
            "DATA" if in_group => {
                data.push(record[1..].iter().take(headings.len()).cloned().collect());
            }
            _ => {}
        }
    }

    let mut table = Table::new(group_name, headings);
    for row in data {
        table.push_text_row(row);
    }
    table
}

fn record_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .double_quote(true);
    builder
}

/// Split one line into fields. Returns `None` for blank or unreadable lines.
fn parse_record(builder: &ReaderBuilder, line: &str, line_no: usize) -> Option<Vec<String>> {
    let mut reader = builder.from_reader(line.as_bytes());
    match reader.records().next()? {
        Ok(record) => Some(record.iter().map(str::to_string).collect()),
        Err(e) => {
            warn!("Skipping unreadable line {}: {}", line_no, e);
            None
        }
    }
}
