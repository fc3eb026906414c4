use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ScrapeError;

pub const DEFAULT_BASE_URL: &str = "https://movie.douban.com/top250";
pub const DEFAULT_OUTPUT_PATH: &str = "douban_movies.csv";
pub const DEFAULT_JSON_OUTPUT_PATH: &str = "douban_movies.json";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const PAGE_SIZE: usize = 25;
pub const DEFAULT_PAGE_COUNT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MIN_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_MAX_DELAY_SECS: f64 = 3.0;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "top250",
    version,
    about = "Douban Top 250 listing scraper with CSV/JSON export"
)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value_t = FileFormatArg::Csv)]
    pub format: FileFormatArg,

    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_COUNT)]
    pub pages: usize,

    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_MIN_DELAY_SECS)]
    pub min_delay: f64,

    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_MAX_DELAY_SECS)]
    pub max_delay: f64,

    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Fetch and parse only the first page, printing up to three records.
    #[arg(long, default_value_t = false)]
    pub first_page: bool,

    /// Print the summary of a previous CSV/JSON export without crawling.
    #[arg(long = "review", value_name = "FILE", conflicts_with = "first_page")]
    pub review_file: Option<String>,
}

impl Cli {
    /// Export path and format. An explicit `--output` extension wins over
    /// `--format`; without `--output` the default file name follows `--format`.
    pub fn output_target(&self) -> (String, DataFormat) {
        let configured: DataFormat = self.format.into();
        match self.output.as_deref() {
            Some(path) => (path.to_string(), detect_data_format(path, configured)),
            None => (default_output_path(configured).to_string(), configured),
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum, PartialEq, Eq)]
pub enum FileFormatArg {
    Csv,
    Json,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl From<FileFormatArg> for DataFormat {
    fn from(value: FileFormatArg) -> Self {
        match value {
            FileFormatArg::Csv => DataFormat::Csv,
            FileFormatArg::Json => DataFormat::Json,
        }
    }
}

/// One movie entry scraped from a listing page.
///
/// `rank` is the position within the page the record was parsed from, so it
/// restarts at 1 on every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub rank: usize,
    pub title: String,
    pub rating: String,
    pub vote_count: String,
    pub quote: String,
    pub info: String,
}

/// Inclusive range, in seconds, of the pause taken after each page request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min_secs: f64,
    max_secs: f64,
}

impl DelayRange {
    pub fn new(first: f64, second: f64) -> Self {
        let first = sanitize_delay_secs(first);
        let second = sanitize_delay_secs(second);
        Self {
            min_secs: first.min(second),
            max_secs: first.max(second),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn min_secs(&self) -> f64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> f64 {
        self.max_secs
    }

    pub fn is_disabled(&self) -> bool {
        self.max_secs <= 0.0
    }

    pub fn sample(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        if self.min_secs >= self.max_secs {
            return Duration::from_secs_f64(self.max_secs);
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs_f64(secs)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY_SECS, DEFAULT_MAX_DELAY_SECS)
    }
}

fn sanitize_delay_secs(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Resolved crawl settings shared by the fetcher and the driver loop.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: Url,
    pub pages: usize,
    pub timeout: Duration,
    pub delay: DelayRange,
    pub user_agent: String,
}

impl CrawlConfig {
    pub fn new(base_url: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            pages: DEFAULT_PAGE_COUNT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: DelayRange::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ScrapeError> {
        let mut config = Self::new(&cli.base_url)?
            .with_pages(cli.pages)
            .with_timeout(Duration::from_secs(cli.timeout_secs.max(1)))
            .with_delay(DelayRange::new(cli.min_delay, cli.max_delay));
        if let Some(ref ua) = cli.user_agent {
            config.user_agent = ua.clone();
        }
        Ok(config)
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }
}

pub fn default_output_path(format: DataFormat) -> &'static str {
    match format {
        DataFormat::Csv => DEFAULT_OUTPUT_PATH,
        DataFormat::Json => DEFAULT_JSON_OUTPUT_PATH,
    }
}

pub fn detect_data_format(path: &str, fallback: DataFormat) -> DataFormat {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".json") {
        DataFormat::Json
    } else if lower.ends_with(".csv") {
        DataFormat::Csv
    } else {
        fallback
    }
}
