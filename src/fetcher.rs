use backon::{ExponentialBuilder, Retryable};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::fetch_error::FetchError;
use crate::utils::{is_http_url, normalize_sheet_url};

/// Raw cell grid of one source, rows top to bottom.
pub type CellGrid = Vec<Vec<String>>;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

#[derive(Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    max_retries: usize,
    min_retry_delay: Duration,
}

impl SheetFetcher {
    pub fn new(timeout_secs: u64, max_retries: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_retries,
            min_retry_delay: Duration::from_secs(1),
        })
    }

    /// Shorter backoff, mostly for tests against a local mock server
    pub fn with_min_retry_delay(mut self, delay: Duration) -> Self {
        self.min_retry_delay = delay;
        self
    }

    /// Fetch a source (HTTP(S) URL or local path) and decode it into a cell grid
    #[instrument(skip(self), fields(source = %source))]
    pub async fn fetch(&self, source: &str) -> Result<CellGrid, FetchError> {
        let (bytes, name) = if is_http_url(source) {
            let url = normalize_sheet_url(source.trim());
            if url != source.trim() {
                debug!("Rewrote published sheet link to CSV export: {}", url);
            }
            let bytes = self.download_with_retry(&url).await?;
            (bytes, url)
        } else {
            debug!("Reading local source file");
            let bytes = tokio::fs::read(source).await?;
            (bytes, source.to_string())
        };

        info!("Fetched source ({} bytes)", bytes.len());
        decode_sheet(&name, &bytes)
    }

    async fn download_with_retry(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_delay(self.min_retry_delay * 10)
            .with_max_times(self.max_retries);

        (|| async { self.download(url).await })
            .retry(backoff)
            .when(FetchError::is_transient)
            .notify(|err: &FetchError, delay: Duration| {
                warn!("Fetch failed ({}), retrying in {:?}", err, delay);
            })
            .await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if status.as_u16() == 404 {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if status.is_server_error() {
            return Err(FetchError::ServerError(format!("{status} from {url}")));
        }

        let bytes = response.error_for_status()?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Decode source bytes as an `.xlsx` workbook or CSV text depending on name and content
pub fn decode_sheet(name: &str, bytes: &[u8]) -> Result<CellGrid, FetchError> {
    let path = name.split('?').next().unwrap_or(name);
    if path.to_ascii_lowercase().ends_with(".xlsx") || bytes.starts_with(ZIP_SIGNATURE) {
        parse_xlsx(bytes)
    } else {
        parse_csv(bytes)
    }
}

/// Parse CSV text without assuming a header row; record lengths may vary
pub fn parse_csv(bytes: &[u8]) -> Result<CellGrid, FetchError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect());
    }

    debug!("Parsed {} CSV rows", grid.len());
    Ok(grid)
}

/// Read the first worksheet of an `.xlsx` workbook
pub fn parse_xlsx(bytes: &[u8]) -> Result<CellGrid, FetchError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| FetchError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FetchError::Workbook("workbook has no worksheets".to_string()))?
        .map_err(|e| FetchError::Workbook(e.to_string()))?;

    let grid: CellGrid = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    debug!("Read {} worksheet rows", grid.len());
    Ok(grid)
}

/// Render a worksheet cell the way a CSV export of the same sheet would
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_flexible_rows() {
        let csv = "Title row\nKabupaten,Kecamatan,01,02\nKutai,Loa Janan,12.5\n";
        let grid = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec!["Title row"]);
        assert_eq!(grid[1], vec!["Kabupaten", "Kecamatan", "01", "02"]);
        assert_eq!(grid[2], vec!["Kutai", "Loa Janan", "12.5"]);
    }

    #[test]
    fn test_parse_csv_strips_bom_and_keeps_quoted_commas() {
        let csv = "\u{feff}Nama Pos,Latlong\nPos A,\"-0.5,117.1\"\n";
        let grid = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(grid[0][0], "Nama Pos");
        assert_eq!(grid[1][1], "-0.5,117.1");
    }

    #[test]
    fn test_decode_sheet_bad_workbook() {
        let result = decode_sheet("rain.xlsx", b"definitely not a zip");
        assert!(matches!(result, Err(FetchError::Workbook(_))));
    }

    #[test]
    fn test_decode_sheet_defaults_to_csv() {
        let grid = decode_sheet("https://example.com/pub?output=csv", b"date,url_peta\n").unwrap();
        assert_eq!(grid, vec![vec!["date".to_string(), "url_peta".to_string()]]);
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(8888.0)), "8888");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Int(3)), "3");
        assert_eq!(cell_to_string(&Data::String("Pos A".to_string())), "Pos A");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
