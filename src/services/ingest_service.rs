use tracing::{error, info, instrument, warn};

use crate::db::{DbError, ObservationRepository};
use crate::fetcher::SheetFetcher;
use crate::importers::classifier::{classify, SourceKind};
use crate::importers::consistency::check_summaries;
use crate::importers::map_reference::{MapReferenceBuilder, MapSheetOutcome};
use crate::importers::rainfall::{ObservationRecord, RainfallReshaper, ReshapeError};
use crate::importers::source::RawSource;
use crate::period::TargetMonth;
use crate::report::{RunReport, SkipReason};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to load records: {0}")]
    Load(#[from] DbError),
}

/// Records built from all sources of a run, before loading
#[derive(Debug)]
pub struct PreparedRun {
    pub records: Vec<ObservationRecord>,
    pub report: RunReport,
}

/// Runs the monthly ingest: fetch every source, build the dataset, replace the month
///
/// Errors are absorbed at the smallest scope that contains them: a bad cell
/// drops the cell, a bad sheet drops the sheet. Only a failed load fails the run.
#[derive(Clone)]
pub struct IngestService {
    fetcher: SheetFetcher,
}

impl IngestService {
    pub fn new(fetcher: SheetFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch sources one at a time, in order, and build the month's records
    #[instrument(skip(self, sources), fields(month = %target, sources = sources.len()))]
    pub async fn prepare(&self, sources: &[String], target: TargetMonth) -> PreparedRun {
        let mut report = RunReport::new(target);
        let mut fetched = Vec::with_capacity(sources.len());

        for (i, source) in sources.iter().enumerate() {
            info!("Reading source {} of {}", i + 1, sources.len());
            match self.fetcher.fetch(source).await {
                Ok(grid) => fetched.push(RawSource::from_grid(source.clone(), grid)),
                Err(e) => {
                    error!("Failed to read source {}: {}", source, e);
                    report.record_skipped(source, None, SkipReason::FetchFailed(e.to_string()));
                }
            }
        }

        let records = build_dataset(&fetched, target, &mut report);
        PreparedRun { records, report }
    }

    /// Prepare the dataset and atomically replace the target month with it
    ///
    /// An empty dataset leaves the stored month untouched and is only a warning.
    #[instrument(skip(self, repo, sources), fields(month = %target))]
    pub async fn run(
        &self,
        repo: &ObservationRepository,
        sources: &[String],
        target: TargetMonth,
    ) -> Result<RunReport, IngestError> {
        let PreparedRun {
            records,
            mut report,
        } = self.prepare(sources, target).await;

        if records.is_empty() {
            warn!("No records were produced, leaving {} untouched", target);
            return Ok(report);
        }

        info!("Saving {} records for {}", records.len(), target);
        let summary = repo.replace_month(target, &records).await.map_err(|e| {
            error!("Failed to replace {}: {}", target, e);
            e
        })?;

        report.rows_deleted = summary.deleted;
        report.rows_inserted = summary.inserted;
        report.loaded = true;
        Ok(report)
    }
}

/// Classify sources and turn them into the month's records
///
/// Map sheets are read before any rainfall sheet so every rainfall sheet sees
/// the complete map reference; among map sheets a later one overrides an
/// earlier one for the same date. Outcomes are recorded on `report` in
/// processing order.
pub fn build_dataset(
    sources: &[RawSource],
    target: TargetMonth,
    report: &mut RunReport,
) -> Vec<ObservationRecord> {
    let classified: Vec<(SourceKind, &RawSource)> =
        sources.iter().map(|s| (classify(s), s)).collect();

    for (kind, source) in &classified {
        info!(source = %source.label, kind = ?kind, "Detected source kind");
        if *kind == SourceKind::Unknown {
            warn!(
                source = %source.label,
                columns = ?source.columns,
                "Unrecognized sheet layout, skipping"
            );
            report.record_skipped(
                &source.label,
                Some(SourceKind::Unknown),
                SkipReason::UnrecognizedColumns,
            );
        }
    }

    let mut builder = MapReferenceBuilder::new();
    for (_, source) in classified
        .iter()
        .filter(|(kind, _)| *kind == SourceKind::MapReferenceTable)
    {
        match builder.add_source(source) {
            MapSheetOutcome::Loaded {
                links,
                skipped_rows,
            } => {
                report.dropped.bad_map_rows += skipped_rows;
                report.record_processed(&source.label, SourceKind::MapReferenceTable, links);
            }
            MapSheetOutcome::MissingColumns => {
                report.record_skipped(
                    &source.label,
                    Some(SourceKind::MapReferenceTable),
                    SkipReason::MissingMapColumns,
                );
            }
        }
    }
    let reference = builder.build();
    report.map_references = reference.len();
    info!("Map reference holds {} dated links", reference.len());

    let reshaper = RainfallReshaper::new(target, &reference);
    let mut records = Vec::new();
    for (_, source) in classified
        .iter()
        .filter(|(kind, _)| *kind == SourceKind::RainfallTable)
    {
        match reshaper.reshape(source) {
            Ok(mut sheet) => {
                report.dropped.invalid_day += sheet.dropped_invalid_days;
                report.dropped.missing_station += sheet.dropped_missing_station;
                report.summary_mismatches.extend(check_summaries(&sheet));
                report.record_processed(
                    &source.label,
                    SourceKind::RainfallTable,
                    sheet.records.len(),
                );
                records.append(&mut sheet.records);
            }
            Err(e) => {
                let reason = match e {
                    ReshapeError::NoDayColumns => SkipReason::NoDayColumns,
                    ReshapeError::MissingStationColumn => SkipReason::MissingStationColumn,
                };
                report.record_skipped(&source.label, Some(SourceKind::RainfallTable), reason);
            }
        }
    }

    report.records_built = records.len();
    info!("Built {} records for {}", records.len(), target);
    records
}
