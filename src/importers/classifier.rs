use serde::Serialize;

use crate::importers::source::RawSource;

const MAP_LINK_COLUMNS: [&str; 2] = ["url_peta", "link_peta"];
const REGENCY_COLUMN: &str = "kabupaten";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RainfallTable,
    MapReferenceTable,
    Unknown,
}

/// Classify a source by its column names (case-insensitive)
///
/// Map-link columns win over the regency column when a sheet has both.
pub fn classify(source: &RawSource) -> SourceKind {
    classify_columns(&source.columns)
}

pub fn classify_columns<S: AsRef<str>>(columns: &[S]) -> SourceKind {
    let lowered: Vec<String> = columns
        .iter()
        .map(|c| c.as_ref().trim().to_lowercase())
        .collect();
    let has = |name: &str| lowered.iter().any(|c| c == name);

    if MAP_LINK_COLUMNS.iter().any(|name| has(*name)) {
        SourceKind::MapReferenceTable
    } else if has(REGENCY_COLUMN) {
        SourceKind::RainfallTable
    } else {
        SourceKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainfall_table() {
        let columns = ["Kabupaten", "Kecamatan", "Nama Pos", "Latlong", "01", "02", "03"];
        assert_eq!(classify_columns(&columns), SourceKind::RainfallTable);
    }

    #[test]
    fn test_map_reference_table() {
        assert_eq!(
            classify_columns(&["date", "url_peta"]),
            SourceKind::MapReferenceTable
        );
        assert_eq!(
            classify_columns(&["Date", "LINK_PETA"]),
            SourceKind::MapReferenceTable
        );
    }

    #[test]
    fn test_unknown_table() {
        assert_eq!(classify_columns(&["foo", "bar"]), SourceKind::Unknown);
        assert_eq!(classify_columns::<&str>(&[]), SourceKind::Unknown);
    }

    #[test]
    fn test_map_link_takes_precedence() {
        assert_eq!(
            classify_columns(&["Kabupaten", "link_peta", "01"]),
            SourceKind::MapReferenceTable
        );
    }

    #[test]
    fn test_classify_source() {
        let source = RawSource::from_grid(
            "sheet",
            vec![vec!["KABUPATEN".to_string(), "01".to_string()]],
        );
        assert_eq!(classify(&source), SourceKind::RainfallTable);
    }
}
