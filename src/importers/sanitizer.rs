use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality tag stored alongside each daily reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusData {
    /// Cell empty or carrying the 9999 "no data" code
    #[serde(rename = "Kosong (9999)")]
    Missing,
    /// 8888 code: rain too small to measure
    #[serde(rename = "Trace (8888)")]
    Trace,
    #[serde(rename = "Terukur")]
    Measured,
    /// Cell text could not be read as a rainfall amount
    #[serde(rename = "Error")]
    Invalid,
}

impl StatusData {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusData::Missing => "Kosong (9999)",
            StatusData::Trace => "Trace (8888)",
            StatusData::Measured => "Terukur",
            StatusData::Invalid => "Error",
        }
    }
}

impl fmt::Display for StatusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusData {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kosong (9999)" => Ok(StatusData::Missing),
            "Trace (8888)" => Ok(StatusData::Trace),
            "Terukur" => Ok(StatusData::Measured),
            "Error" => Ok(StatusData::Invalid),
            other => Err(format!("unknown status_data value: {other}")),
        }
    }
}

const MISSING_CODE: &str = "9999";
const TRACE_CODE: &str = "8888";

/// Normalize a daily rainfall cell into `(curah_hujan, status_data)`
///
/// Sentinel codes are checked before numeric parsing, since both would
/// otherwise read as valid amounts. Negative and non-finite numbers are
/// rejected as `Error` so a stored amount is always a non-negative number.
pub fn sanitize_value(raw: &str) -> (Option<f64>, StatusData) {
    let trimmed = raw.trim();

    if trimmed.is_empty()
        || trimmed == MISSING_CODE
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("none")
    {
        return (None, StatusData::Missing);
    }

    if trimmed == TRACE_CODE {
        return (Some(0.0), StatusData::Trace);
    }

    match parse_decimal(trimmed) {
        Some(value) if value >= 0.0 => (Some(value), StatusData::Measured),
        _ => (None, StatusData::Invalid),
    }
}

/// Numeric cleaner for pre-aggregated summary columns (DAS1..3, Total, HH)
///
/// Absence means "not reported" here, so empty, `-` and unreadable cells all count as zero.
pub fn clean_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return 0.0;
    }
    parse_decimal(trimmed).unwrap_or(0.0)
}

/// Parse a number written with either `.` or `,` as decimal separator
pub(crate) fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
