use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

// Database entity model for curah_hujan_harian.
// The insert side is importers::rainfall::ObservationRecord.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredObservation {
    pub id: i64,
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
    pub status_data: String,
    pub raw_value: String,
    pub created_at: DateTime<Utc>,
}

/// Row counts of one monthly replace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    pub deleted: u64,
    pub inserted: u64,
}
