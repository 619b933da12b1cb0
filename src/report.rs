use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::importers::classifier::SourceKind;
use crate::importers::consistency::SummaryMismatch;
use crate::period::TargetMonth;

/// Why a source contributed nothing to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    FetchFailed(String),
    UnrecognizedColumns,
    MissingMapColumns,
    NoDayColumns,
    MissingStationColumn,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            SkipReason::UnrecognizedColumns => {
                f.write_str("columns match neither a rainfall nor a map sheet")
            }
            SkipReason::MissingMapColumns => f.write_str("map sheet lacks date or url column"),
            SkipReason::NoDayColumns => f.write_str("rainfall sheet has no day columns"),
            SkipReason::MissingStationColumn => {
                f.write_str("rainfall sheet has no Nama Pos/Nama_Pos column")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Processed { produced: usize },
    Skipped(SkipReason),
}

/// Per-source outcome, in enumeration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub kind: Option<SourceKind>,
    pub status: SourceStatus,
}

/// Row-level drops, summed over all sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub invalid_day: usize,
    pub missing_station: usize,
    pub bad_map_rows: usize,
}

/// Everything a run did, for logging and `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: TargetMonth,
    pub sources: Vec<SourceOutcome>,
    pub map_references: usize,
    pub dropped: DropCounts,
    pub summary_mismatches: Vec<SummaryMismatch>,
    pub records_built: usize,
    pub rows_deleted: u64,
    pub rows_inserted: u64,
    pub loaded: bool,
}

impl RunReport {
    pub fn new(target: TargetMonth) -> Self {
        Self {
            target,
            sources: Vec::new(),
            map_references: 0,
            dropped: DropCounts::default(),
            summary_mismatches: Vec::new(),
            records_built: 0,
            rows_deleted: 0,
            rows_inserted: 0,
            loaded: false,
        }
    }

    pub fn record_processed(&mut self, source: &str, kind: SourceKind, produced: usize) {
        self.sources.push(SourceOutcome {
            source: source.to_string(),
            kind: Some(kind),
            status: SourceStatus::Processed { produced },
        });
    }

    pub fn record_skipped(&mut self, source: &str, kind: Option<SourceKind>, reason: SkipReason) {
        self.sources.push(SourceOutcome {
            source: source.to_string(),
            kind,
            status: SourceStatus::Skipped(reason),
        });
    }

    pub fn skipped_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Skipped(_)))
            .count()
    }

    pub fn log_summary(&self) {
        for outcome in &self.sources {
            match &outcome.status {
                SourceStatus::Processed { produced } => info!(
                    source = %outcome.source,
                    kind = ?outcome.kind,
                    produced,
                    "Source processed"
                ),
                SourceStatus::Skipped(reason) => warn!(
                    source = %outcome.source,
                    kind = ?outcome.kind,
                    "Source skipped: {}",
                    reason
                ),
            }
        }

        info!(
            month = %self.target,
            sources = self.sources.len(),
            skipped = self.skipped_sources(),
            map_references = self.map_references,
            records = self.records_built,
            dropped_invalid_day = self.dropped.invalid_day,
            dropped_missing_station = self.dropped.missing_station,
            dropped_bad_map_rows = self.dropped.bad_map_rows,
            summary_mismatches = self.summary_mismatches.len(),
            deleted = self.rows_deleted,
            inserted = self.rows_inserted,
            loaded = self.loaded,
            "Ingest run summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_sources_count() {
        let mut report = RunReport::new(TargetMonth::new(2024, 3).unwrap());
        report.record_processed("a.csv", SourceKind::RainfallTable, 62);
        report.record_skipped("b.csv", Some(SourceKind::Unknown), SkipReason::UnrecognizedColumns);
        report.record_skipped("c.csv", None, SkipReason::FetchFailed("timeout".to_string()));

        assert_eq!(report.sources.len(), 3);
        assert_eq!(report.skipped_sources(), 2);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = RunReport::new(TargetMonth::new(2024, 3).unwrap());
        report.record_skipped("c.csv", None, SkipReason::FetchFailed("timeout".to_string()));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["target"]["year"], 2024);
        assert_eq!(json["sources"][0]["status"]["status"], "skipped");
        assert_eq!(json["sources"][0]["status"]["reason"], "fetch_failed");
        assert_eq!(json["sources"][0]["status"]["detail"], "timeout");
    }
}
