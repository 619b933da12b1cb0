use tracing::debug;

/// How many leading rows are searched for the header
pub const HEADER_SCAN_ROWS: usize = 5;

/// Cell values that only appear in a real header row
const HEADER_MARKERS: [&str; 4] = ["kabupaten", "url_peta", "link_peta", "date"];

/// Find the index of the header row among the first few rows of a sheet
///
/// Exported sheets often carry a title or a blank line above the column
/// names. The first row holding one of the marker cells wins; without a
/// match the first row is used.
pub fn locate_header_row(rows: &[Vec<String>]) -> usize {
    let found = rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        row.iter().any(|cell| {
            let cell = cell.trim().to_lowercase();
            HEADER_MARKERS.contains(&cell.as_str())
        })
    });

    match found {
        Some(idx) => {
            debug!("Header row detected at index {}", idx);
            idx
        }
        None => {
            debug!("No header marker in first {} rows, using row 0", HEADER_SCAN_ROWS);
            0
        }
    }
}
