use chrono::Datelike;
use serde::Serialize;
use tracing::warn;

use crate::importers::rainfall::{ObservationRecord, ReshapedSheet};
use crate::importers::sanitizer::clean_numeric;

/// Allowed difference between a sourced total and the sum of daily values
pub const TOTAL_TOLERANCE: f64 = 0.05;

/// Daily amount from which a day counts as a rain day (HH column)
pub const WET_DAY_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryField {
    Das1,
    Das2,
    Das3,
    Total,
    Hh,
}

/// A sourced summary cell that disagrees with the reshaped daily values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMismatch {
    pub nama_pos: String,
    pub field: SummaryField,
    pub sourced: f64,
    pub computed: f64,
}

/// Compare the sheet's DAS1..3, Total and HH cells against its daily values
///
/// Only cells that are filled in are checked. Mismatches are logged and
/// returned; records are never modified.
pub fn check_summaries(sheet: &ReshapedSheet) -> Vec<SummaryMismatch> {
    let mut mismatches = Vec::new();

    for station in &sheet.stations {
        let records = &sheet.records[station.records.clone()];
        let Some(first) = records.first() else {
            continue;
        };
        let nama_pos = first.nama_pos.clone();

        let sum_days = |from: u32, to: u32| -> f64 {
            records
                .iter()
                .filter(|r| (from..=to).contains(&r.tanggal.day()))
                .filter_map(|r| r.curah_hujan)
                .sum()
        };

        let checks = [
            (SummaryField::Das1, &station.row.das1, sum_days(1, 10)),
            (SummaryField::Das2, &station.row.das2, sum_days(11, 20)),
            (SummaryField::Das3, &station.row.das3, sum_days(21, 31)),
            (SummaryField::Total, &station.row.month_total, sum_days(1, 31)),
            (SummaryField::Hh, &station.row.wet_days, wet_days(records)),
        ];

        for (field, cell, computed) in checks {
            let Some(cell) = cell.as_deref() else {
                continue;
            };
            let sourced = clean_numeric(cell);
            if (sourced - computed).abs() > TOTAL_TOLERANCE {
                warn!(
                    nama_pos = %nama_pos,
                    field = ?field,
                    sourced,
                    computed,
                    "Sourced summary disagrees with daily values"
                );
                mismatches.push(SummaryMismatch {
                    nama_pos: nama_pos.clone(),
                    field,
                    sourced,
                    computed,
                });
            }
        }
    }

    mismatches
}

fn wet_days(records: &[ObservationRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.curah_hujan.is_some_and(|v| v >= WET_DAY_THRESHOLD))
        .count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::map_reference::MapReference;
    use crate::importers::rainfall::RainfallReshaper;
    use crate::importers::source::RawSource;
    use crate::period::TargetMonth;

    fn reshape(rows: &[&[&str]]) -> ReshapedSheet {
        let source = RawSource::from_grid(
            "rain",
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        );
        let reference = MapReference::default();
        RainfallReshaper::new(TargetMonth::new(2024, 3).unwrap(), &reference)
            .reshape(&source)
            .unwrap()
    }

    #[test]
    fn test_consistent_summaries() {
        let sheet = reshape(&[
            &["Kabupaten", "Nama Pos", "DAS1", "DAS2", "Total", "HH", "01", "02", "11"],
            &["Kutai", "Pos A", "12,5", "3", "15.5", "3", "10", "2.5", "3"],
        ]);
        assert!(check_summaries(&sheet).is_empty());
    }

    #[test]
    fn test_das1_mismatch_reported() {
        let sheet = reshape(&[
            &["Kabupaten", "Nama Pos", "DAS1", "01", "02"],
            &["Kutai", "Pos A", "20", "10", "2.5"],
        ]);
        let mismatches = check_summaries(&sheet);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, SummaryField::Das1);
        assert_eq!(mismatches[0].sourced, 20.0);
        assert_eq!(mismatches[0].computed, 12.5);
        assert_eq!(mismatches[0].nama_pos, "Pos A");
    }

    #[test]
    fn test_blank_summary_cells_not_checked() {
        let sheet = reshape(&[
            &["Kabupaten", "Nama Pos", "DAS1", "Total", "01"],
            &["Kutai", "Pos A", "", "", "10"],
        ]);
        assert!(check_summaries(&sheet).is_empty());
    }

    #[test]
    fn test_sentinels_do_not_count_as_rain() {
        let sheet = reshape(&[
            &["Kabupaten", "Nama Pos", "Total", "HH", "01", "02", "03"],
            &["Kutai", "Pos A", "0", "0", "9999", "8888", ""],
        ]);
        assert!(check_summaries(&sheet).is_empty());
    }
}
