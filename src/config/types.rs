use serde::Deserialize;

/// Browser-like identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for Sumi-Harvest
///
/// Every section may be omitted from the TOML file; missing keys take
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_concurrent_fetches: 4,
            request_timeout_ms: 10_000,
        }
    }
}

/// Client identity configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full `User-Agent` header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Extraction behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extensions that mark a data-file URL (matched case-insensitively)
    #[serde(rename = "file-extensions")]
    pub file_extensions: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            file_extensions: vec![".xml".to_string(), ".json".to_string()],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Line-delimited file receiving every data-file URL of the session
    #[serde(rename = "data-files-path")]
    pub data_files_path: String,

    /// Root folder for per-site email files
    #[serde(rename = "emails-dir")]
    pub emails_dir: String,

    /// Root folder for per-site categorized API endpoint files
    #[serde(rename = "apis-dir")]
    pub apis_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_files_path: "extracted_urls.txt".to_string(),
            emails_dir: "Mails".to_string(),
            apis_dir: "APIs".to_string(),
        }
    }
}
