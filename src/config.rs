use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set unless running with --dry-run")]
    MissingDatabaseUrl,
    #[error("No sources configured (set SOURCE_URLS or pass --source)")]
    NoSources,
    #[error("Invalid target month {year}-{month}")]
    InvalidTargetMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub source_urls: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub fetch_retries: usize,
    pub insert_chunk_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            source_urls: parse_source_list(&env::var("SOURCE_URLS").unwrap_or_default()),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            fetch_retries: env::var("FETCH_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            insert_chunk_size: env::var("INSERT_CHUNK_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(1000),
        }
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}

/// Split a comma or newline separated list of source locations, dropping blanks.
pub fn parse_source_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_list_mixed_separators() {
        let sources = parse_source_list(
            "https://example.com/a.csv, https://example.com/b.csv\n\n data/local.xlsx ,",
        );
        assert_eq!(
            sources,
            vec![
                "https://example.com/a.csv",
                "https://example.com/b.csv",
                "data/local.xlsx"
            ]
        );
    }

    #[test]
    fn test_parse_source_list_empty() {
        assert!(parse_source_list("").is_empty());
        assert!(parse_source_list(" , \n").is_empty());
    }

    #[test]
    fn test_require_database_url() {
        let mut config = Config {
            database_url: None,
            source_urls: vec![],
            fetch_timeout_secs: 30,
            fetch_retries: 2,
            insert_chunk_size: 1000,
        };
        assert!(matches!(
            config.require_database_url(),
            Err(ConfigError::MissingDatabaseUrl)
        ));

        config.database_url = Some("postgres://localhost/rain".to_string());
        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://localhost/rain"
        );
    }
}
