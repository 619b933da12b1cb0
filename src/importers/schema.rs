use std::collections::HashMap;

use crate::importers::source::RawSource;

/// Identity and summary fields carried by every reshaped rainfall row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationField {
    Regency,
    District,
    StationName,
    LatLong,
    Elevation,
    Das1,
    Das2,
    Das3,
    MonthTotal,
    WetDays,
    Availability,
}

/// Accepted header spellings per field, matched case-insensitively after trimming
const STATION_FIELD_ALIASES: &[(StationField, &[&str])] = &[
    (StationField::Regency, &["Kabupaten"]),
    (StationField::District, &["Kecamatan"]),
    (StationField::StationName, &["Nama Pos", "Nama_Pos"]),
    (StationField::LatLong, &["Latlong"]),
    (StationField::Elevation, &["Elevasi"]),
    (StationField::Das1, &["DAS1"]),
    (StationField::Das2, &["DAS2"]),
    (StationField::Das3, &["DAS3"]),
    (StationField::MonthTotal, &["Total"]),
    (StationField::WetDays, &["HH"]),
    (StationField::Availability, &["Data"]),
];

/// Column positions of the station fields present in one rainfall source
///
/// A field may map to several columns when a sheet carries more than one of
/// its spellings; they are tried in alias order for each row.
#[derive(Debug, Clone, Default)]
pub struct StationColumns {
    indices: HashMap<StationField, Vec<usize>>,
}

impl StationColumns {
    pub fn resolve(source: &RawSource) -> Self {
        let mut indices = HashMap::new();
        for (field, aliases) in STATION_FIELD_ALIASES {
            let found: Vec<usize> = aliases
                .iter()
                .filter_map(|alias| source.column_index(alias))
                .collect();
            if !found.is_empty() {
                indices.insert(*field, found);
            }
        }
        Self { indices }
    }

    pub fn has(&self, field: StationField) -> bool {
        self.indices.contains_key(&field)
    }

    /// Read one data row into a typed station row
    pub fn read_row(&self, row: &[String]) -> StationRow {
        StationRow {
            regency: self.text(row, StationField::Regency),
            district: self.text(row, StationField::District),
            station_name: self.text(row, StationField::StationName),
            latlong: self.text(row, StationField::LatLong),
            elevation: self.text(row, StationField::Elevation),
            das1: self.text(row, StationField::Das1),
            das2: self.text(row, StationField::Das2),
            das3: self.text(row, StationField::Das3),
            month_total: self.text(row, StationField::MonthTotal),
            wet_days: self.text(row, StationField::WetDays),
            availability: self.text(row, StationField::Availability),
        }
    }

    /// First non-blank cell among the field's columns
    fn text(&self, row: &[String], field: StationField) -> Option<String> {
        self.indices
            .get(&field)?
            .iter()
            .filter_map(|idx| row.get(*idx))
            .map(|cell| cell.trim())
            .find(|cell| !cell.is_empty())
            .map(str::to_string)
    }
}

/// Station identity and sourced summary cells of one sheet row; blank cells are `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRow {
    pub regency: Option<String>,
    pub district: Option<String>,
    pub station_name: Option<String>,
    pub latlong: Option<String>,
    pub elevation: Option<String>,
    pub das1: Option<String>,
    pub das2: Option<String>,
    pub das3: Option<String>,
    pub month_total: Option<String>,
    pub wet_days: Option<String>,
    pub availability: Option<String>,
}

/// Day-of-month columns: zero-padded `01`..`31`, else unpadded `1`..`31`
///
/// Returns `(day, column index)` pairs in day order.
pub fn day_columns(source: &RawSource) -> Vec<(u32, usize)> {
    let padded: Vec<(u32, usize)> = (1..=31u32)
        .filter_map(|day| {
            source
                .exact_column_index(&format!("{day:02}"))
                .map(|idx| (day, idx))
        })
        .collect();

    if !padded.is_empty() {
        return padded;
    }

    (1..=31u32)
        .filter_map(|day| {
            source
                .exact_column_index(&day.to_string())
                .map(|idx| (day, idx))
        })
        .collect()
}

/// Date and URL columns of a map reference sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapColumns {
    pub date: usize,
    pub url: usize,
}

impl MapColumns {
    /// `url_peta` is preferred over `link_peta` when a sheet has both
    pub fn resolve(source: &RawSource) -> Option<Self> {
        let date = source.column_index("date")?;
        let url = source
            .column_index("url_peta")
            .or_else(|| source.column_index("link_peta"))?;
        Some(Self { date, url })
    }
}
