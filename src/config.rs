//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Scoring API used when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://appliscoring-1f1f7c4e1003.herokuapp.com";

/// Where does `/distribution` read its values from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionSource {
    /// Built-in sample arrays, the uploaded dataset is ignored
    Synthetic,
    /// Uploaded CSV split by the target column
    Dataset,
}

impl DistributionSource {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "synthetic" => Some(Self::Synthetic),
            "dataset" => Some(Self::Dataset),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream scoring API (no trailing slash)
    pub api_url: String,

    /// Server port
    pub port: u16,

    /// Per-attempt timeout for upstream calls
    pub upstream_timeout_secs: u64,

    /// Extra attempts after a transport error or 5xx
    pub upstream_max_retries: u32,

    /// Pause between attempts
    pub upstream_retry_backoff_ms: u64,

    /// Uploaded training dataset location
    pub dataset_path: PathBuf,

    /// Binary column splitting the dataset into accepted/rejected
    pub target_column: String,

    pub distribution_source: DistributionSource,

    /// Client analysed to obtain the global importance report
    pub reference_client_id: u64,

    /// Request body limit, sized for dataset uploads
    pub max_upload_bytes: usize,

    /// Emit JSON log lines instead of the pretty format
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_url: lookup("API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),

            port: parse_var(&lookup, "PORT").unwrap_or(5000),

            upstream_timeout_secs: parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS").unwrap_or(10),

            upstream_max_retries: parse_var(&lookup, "UPSTREAM_MAX_RETRIES").unwrap_or(1),

            upstream_retry_backoff_ms: parse_var(&lookup, "UPSTREAM_RETRY_BACKOFF_MS").unwrap_or(200),

            dataset_path: lookup("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploaded_dataset.csv")),

            target_column: lookup("TARGET_COLUMN")
                .unwrap_or_else(|| "TARGET".to_string()),

            distribution_source: lookup("DISTRIBUTION_SOURCE")
                .and_then(|s| DistributionSource::parse(&s))
                .unwrap_or(DistributionSource::Dataset),

            reference_client_id: parse_var(&lookup, "REFERENCE_CLIENT_ID").unwrap_or(100002),

            max_upload_bytes: parse_var::<usize, _>(&lookup, "MAX_UPLOAD_MB")
                .unwrap_or(100)
                .saturating_mul(1024 * 1024),

            log_json: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.port, 5000);
        assert_eq!(config.upstream_max_retries, 1);
        assert_eq!(config.target_column, "TARGET");
        assert_eq!(config.distribution_source, DistributionSource::Dataset);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert!(!config.log_json);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("API_URL", "http://localhost:8000/"),
            ("PORT", "9000"),
            ("DISTRIBUTION_SOURCE", "Synthetic"),
            ("LOG_FORMAT", "JSON"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.port, 9000);
        assert_eq!(config.distribution_source, DistributionSource::Synthetic);
        assert!(config.log_json);
        assert!(config.is_production());
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_with(&[
            ("PORT", "not-a-port"),
            ("UPSTREAM_TIMEOUT_SECS", "-3"),
            ("DISTRIBUTION_SOURCE", "random"),
        ]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.upstream_timeout_secs, 10);
        assert_eq!(config.distribution_source, DistributionSource::Dataset);
    }
}
