//! POINT to LOCA join.

use crate::models::{Table, Value};
use tracing::debug;

/// Suffix appended to LOCA columns whose name is already used by POINT.
pub const LOCA_SUFFIX: &str = "_loca";

/// Left-join `points` onto `locations` by ID.
///
/// The result keeps every POINT column followed by every LOCA column. A
/// point matching several locations yields one row per match; a point with
/// no match keeps its own cells only. Missing cells inside a joined row are
/// filled with [`Value::NotANumber`].
pub fn join_points(points: &Table, locations: &Table, point_id: &str, location_id: &str) -> Table {
    let mut headings: Vec<String> = points.headings().to_vec();
    for heading in locations.headings() {
        if headings.contains(heading) {
            headings.push(format!("{}{}", heading, LOCA_SUFFIX));
        } else {
            headings.push(heading.clone());
        }
    }

    let point_width = points.headings().len();
    let location_width = locations.headings().len();
    let mut joined = Table::new(points.name(), headings);

    for point in points.rows() {
        let id = point.text(point_id);
        let matches: Vec<_> = locations
            .rows()
            .filter(|loca| !id.is_empty() && loca.text(location_id) == id)
            .collect();

        if matches.is_empty() {
            joined.push_row(point.cells().to_vec());
            continue;
        }

        for loca in matches {
            let mut cells = padded(point.cells(), point_width);
            cells.extend(padded(loca.cells(), location_width));
            joined.push_row(cells);
        }
    }

    debug!(
        "Joined {} points with {} locations into {} rows",
        points.len(),
        locations.len(),
        joined.len()
    );

    joined
}

fn padded(cells: &[Value], width: usize) -> Vec<Value> {
    let mut out = cells.to_vec();
    out.resize(width, Value::NotANumber);
    out
}
