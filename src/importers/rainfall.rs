use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::importers::geo::parse_latlong;
use crate::importers::map_reference::MapReference;
use crate::importers::sanitizer::{clean_numeric, sanitize_value, StatusData};
use crate::importers::schema::{day_columns, StationColumns, StationField, StationRow};
use crate::importers::source::RawSource;
use crate::period::TargetMonth;

/// One daily rainfall observation for a station, ready to be loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub kabupaten: Option<String>,
    pub kecamatan: Option<String>,
    pub nama_pos: String,
    pub lat_long_raw: Option<String>,
    pub lintang: Option<f64>,
    pub bujur: Option<f64>,
    pub elevasi: Option<String>,
    pub link_peta: Option<String>,
    pub das1: f64,
    pub das2: f64,
    pub das3: f64,
    pub total_ch: f64,
    pub hh: f64,
    pub status_ketersediaan: Option<String>,
    pub tanggal: NaiveDate,
    pub curah_hujan: Option<f64>,
    pub status_data: StatusData,
    pub raw_value: String,
}

/// Result of reshaping one rainfall sheet
#[derive(Debug, Clone, Default)]
pub struct ReshapedSheet {
    pub records: Vec<ObservationRecord>,
    /// Station rows read from the sheet, kept for the summary consistency check
    pub stations: Vec<ReshapedStation>,
    pub dropped_invalid_days: usize,
    pub dropped_missing_station: usize,
}

/// A station row together with the range of its records in `ReshapedSheet::records`
#[derive(Debug, Clone)]
pub struct ReshapedStation {
    pub row: StationRow,
    pub records: std::ops::Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReshapeError {
    NoDayColumns,
    MissingStationColumn,
}

/// Unpivots day-of-month columns of rainfall sheets into daily records
pub struct RainfallReshaper<'a> {
    target: TargetMonth,
    map_reference: &'a MapReference,
}

impl<'a> RainfallReshaper<'a> {
    pub fn new(target: TargetMonth, map_reference: &'a MapReference) -> Self {
        Self {
            target,
            map_reference,
        }
    }

    /// Reshape one rainfall sheet into one record per (station, day)
    ///
    /// Days that do not exist in the target month (e.g. day 31 in April) and
    /// rows without a station name are dropped and counted.
    #[instrument(skip(self, source), fields(source = %source.label, month = %self.target))]
    pub fn reshape(&self, source: &RawSource) -> Result<ReshapedSheet, ReshapeError> {
        let days = day_columns(source);
        if days.is_empty() {
            warn!("No day-of-month columns found, skipping rainfall sheet");
            return Err(ReshapeError::NoDayColumns);
        }
        debug!("Found {} day columns", days.len());

        let columns = StationColumns::resolve(source);
        if !columns.has(StationField::StationName) {
            warn!("No Nama Pos/Nama_Pos column found, skipping rainfall sheet");
            return Err(ReshapeError::MissingStationColumn);
        }

        let dates: Vec<(Option<NaiveDate>, usize)> = days
            .iter()
            .map(|(day, idx)| (self.target.day(*day), *idx))
            .collect();

        let mut sheet = ReshapedSheet::default();

        for row in &source.rows {
            let station = columns.read_row(row);
            let Some(nama_pos) = station.station_name.clone() else {
                sheet.dropped_missing_station += 1;
                continue;
            };

            let point = station.latlong.as_deref().and_then(parse_latlong);
            let start = sheet.records.len();

            for (date, idx) in &dates {
                let Some(tanggal) = *date else {
                    sheet.dropped_invalid_days += 1;
                    continue;
                };
                debug_assert!(self.target.contains(tanggal));

                let raw_value = row.get(*idx).cloned().unwrap_or_default();
                let (curah_hujan, status_data) = sanitize_value(&raw_value);

                let link_peta = self
                    .map_reference
                    .get(tanggal)
                    .map(str::to_string)
                    .or_else(|| point.map(|p| p.maps_url()));

                sheet.records.push(ObservationRecord {
                    kabupaten: station.regency.clone(),
                    kecamatan: station.district.clone(),
                    nama_pos: nama_pos.clone(),
                    lat_long_raw: station.latlong.clone(),
                    lintang: point.map(|p| p.latitude),
                    bujur: point.map(|p| p.longitude),
                    elevasi: station.elevation.clone(),
                    link_peta,
                    das1: summary_value(&station.das1),
                    das2: summary_value(&station.das2),
                    das3: summary_value(&station.das3),
                    total_ch: summary_value(&station.month_total),
                    hh: summary_value(&station.wet_days),
                    status_ketersediaan: station.availability.clone(),
                    tanggal,
                    curah_hujan,
                    status_data,
                    raw_value,
                });
            }

            let end = sheet.records.len();
            sheet.stations.push(ReshapedStation {
                row: station,
                records: start..end,
            });
        }

        if sheet.dropped_missing_station > 0 {
            warn!(
                "Dropped {} rows without a station name",
                sheet.dropped_missing_station
            );
        }
        if sheet.dropped_invalid_days > 0 {
            debug!(
                "Dropped {} cells for days outside {}",
                sheet.dropped_invalid_days, self.target
            );
        }
        info!(
            records = sheet.records.len(),
            stations = sheet.stations.len(),
            "Reshaped rainfall sheet"
        );

        Ok(sheet)
    }
}

fn summary_value(cell: &Option<String>) -> f64 {
    cell.as_deref().map(clean_numeric).unwrap_or(0.0)
}
