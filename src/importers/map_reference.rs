use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::importers::schema::MapColumns;
use crate::importers::source::RawSource;
use crate::utils::is_http_url;

/// Analysis map link per calendar date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReference {
    links: HashMap<NaiveDate, String>,
}

impl MapReference {
    pub fn get(&self, date: NaiveDate) -> Option<&str> {
        self.links.get(&date).map(String::as_str)
    }

    /// Insert a link, replacing any earlier link for the same date
    pub fn insert(&mut self, date: NaiveDate, url: impl Into<String>) {
        self.links.insert(date, url.into());
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Outcome of reading one map reference sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSheetOutcome {
    Loaded { links: usize, skipped_rows: usize },
    MissingColumns,
}

/// Accumulates map references across all map sheets of a run, in scan order
#[derive(Debug, Default)]
pub struct MapReferenceBuilder {
    reference: MapReference,
}

impl MapReferenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every valid `(date, url)` row of a map sheet
    ///
    /// Rows with an unreadable date or a missing or non-HTTP link are skipped;
    /// these sheets are edited by hand and partial rows are normal.
    pub fn add_source(&mut self, source: &RawSource) -> MapSheetOutcome {
        let Some(columns) = MapColumns::resolve(source) else {
            warn!(
                source = %source.label,
                "Map sheet has no 'date' or 'url_peta'/'link_peta' column, skipping"
            );
            return MapSheetOutcome::MissingColumns;
        };

        let mut links = 0;
        let mut skipped_rows = 0;

        for row in &source.rows {
            let date = row.get(columns.date).and_then(|d| parse_sheet_date(d));
            let url = row
                .get(columns.url)
                .map(|u| u.trim())
                .filter(|u| !u.is_empty() && is_http_url(u));

            match (date, url) {
                (Some(date), Some(url)) => {
                    if self.reference.get(date).is_some() {
                        debug!("Map link for {} replaced by later entry", date);
                    }
                    self.reference.insert(date, url);
                    links += 1;
                }
                _ => skipped_rows += 1,
            }
        }

        info!(
            source = %source.label,
            links,
            skipped_rows,
            "Loaded map references"
        );
        MapSheetOutcome::Loaded {
            links,
            skipped_rows,
        }
    }

    pub fn build(self) -> MapReference {
        self.reference
    }
}

const INDONESIAN_MONTHS: [(&str, &str); 12] = [
    ("januari", "january"),
    ("februari", "february"),
    ("maret", "march"),
    ("april", "april"),
    ("mei", "may"),
    ("juni", "june"),
    ("juli", "july"),
    ("agustus", "august"),
    ("september", "september"),
    ("oktober", "october"),
    ("nopember", "november"),
    ("desember", "december"),
];

const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Parse a date as typed into a spreadsheet
///
/// Slash dates are read month-first like the sheet export, falling back to
/// day-first when the month-first reading is impossible (`25/03/2024`).
/// Timestamps keep only their date; zoned RFC 3339 values keep the date
/// in their own offset. Indonesian month names are accepted alongside
/// English ones.
pub fn parse_sheet_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = translate_month_names(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(&normalized)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn translate_month_names(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            INDONESIAN_MONTHS
                .iter()
                .find(|(id, _)| *id == lower || (id.len() > 3 && lower == id[..3]))
                .map(|(_, en)| en.to_string())
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
