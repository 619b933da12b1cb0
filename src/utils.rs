/// Shared utility functions for the rainfall ingest pipeline
///
/// Rewrite a Google Sheets "publish to web" HTML link into its CSV export link
///
/// Sheets published to the web are often copied from the browser as a `pubhtml`
/// page. The CSV export lives at the same path with `pub` and an
/// `output=csv` query parameter. Links that are already CSV exports, and
/// links to anything else, are returned unchanged.
///
/// # Examples
///
/// ```
/// use rainfall_ingest::utils::normalize_sheet_url;
///
/// assert_eq!(
///     normalize_sheet_url("https://docs.google.com/spreadsheets/d/e/X/pubhtml"),
///     "https://docs.google.com/spreadsheets/d/e/X/pub?output=csv"
/// );
/// assert_eq!(
///     normalize_sheet_url("https://docs.google.com/spreadsheets/d/e/X/pubhtml?gid=7&single=true"),
///     "https://docs.google.com/spreadsheets/d/e/X/pub?output=csv&gid=7&single=true"
/// );
/// assert_eq!(
///     normalize_sheet_url("https://docs.google.com/spreadsheets/d/e/X/pub?output=csv"),
///     "https://docs.google.com/spreadsheets/d/e/X/pub?output=csv"
/// );
/// ```
pub fn normalize_sheet_url(url: &str) -> String {
    if !url.contains("pubhtml") {
        return url.to_string();
    }

    let rewritten = url.replacen("pubhtml", "pub", 1);
    if rewritten.contains("output=csv") {
        return rewritten;
    }

    match rewritten.split_once('?') {
        Some((path, query)) if !query.is_empty() => format!("{path}?output=csv&{query}"),
        Some((path, _)) => format!("{path}?output=csv"),
        None => format!("{rewritten}?output=csv"),
    }
}

/// True for `http://` and `https://` locations (case-insensitive scheme).
pub fn is_http_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sheet_url_plain_pubhtml() {
        assert_eq!(
            normalize_sheet_url("https://docs.google.com/spreadsheets/d/e/ABC/pubhtml"),
            "https://docs.google.com/spreadsheets/d/e/ABC/pub?output=csv"
        );
    }

    #[test]
    fn test_normalize_sheet_url_keeps_existing_query() {
        assert_eq!(
            normalize_sheet_url(
                "https://docs.google.com/spreadsheets/d/e/ABC/pubhtml?gid=770549085&single=true"
            ),
            "https://docs.google.com/spreadsheets/d/e/ABC/pub?output=csv&gid=770549085&single=true"
        );
    }

    #[test]
    fn test_normalize_sheet_url_already_csv() {
        let url = "https://docs.google.com/spreadsheets/d/e/ABC/pub?gid=1&single=true&output=csv";
        assert_eq!(normalize_sheet_url(url), url);
    }

    #[test]
    fn test_normalize_sheet_url_other_hosts_untouched() {
        assert_eq!(
            normalize_sheet_url("https://example.com/rain.csv"),
            "https://example.com/rain.csv"
        );
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://example.com"));
        assert!(is_http_url("HTTP://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("data/rain.csv"));
    }
}
