use tracing::debug;

use crate::importers::header::locate_header_row;

/// One fetched sheet, split into column names and data rows at its detected header
#[derive(Debug, Clone)]
pub struct RawSource {
    pub label: String,
    pub header_row: usize,
    pub columns: Vec<String>,
    /// Data rows, each padded or truncated to `columns.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl RawSource {
    /// Build a source from a raw cell grid, locating the header row first
    ///
    /// Rows above the header are discarded, as are rows with no text at all.
    pub fn from_grid(label: impl Into<String>, mut grid: Vec<Vec<String>>) -> Self {
        let label = label.into();
        let header_row = locate_header_row(&grid);

        let mut data = if header_row < grid.len() {
            grid.split_off(header_row)
        } else {
            Vec::new()
        };

        let columns: Vec<String> = if data.is_empty() {
            Vec::new()
        } else {
            data.remove(0).iter().map(|c| c.trim().to_string()).collect()
        };

        let width = columns.len();
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        debug!(
            source = %label,
            header_row,
            columns = width,
            rows = rows.len(),
            "Built raw source"
        );

        Self {
            label,
            header_row,
            columns,
            rows,
        }
    }

    /// Index of the first column whose name matches `name`, ignoring case
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Index of the first column named exactly `name` (after trimming)
    pub fn exact_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
