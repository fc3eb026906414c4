mod crawl;
mod data_io;
mod error;
mod parse;
mod runtime;
mod types;

pub use crawl::{PageFetcher, crawl_pages, display_rank, page_offset, page_url, preview_first_page};
pub use data_io::{CSV_HEADERS, export_records, load_records_from_file};
pub use error::ScrapeError;
pub use parse::{
    DEFAULT_RATING, DEFAULT_VOTE_COUNT, ListingSelectors, NO_QUOTE_PLACEHOLDER,
    UNKNOWN_PLACEHOLDER, normalize_text, strip_vote_count, truncate_info,
};
pub use runtime::{run, run_with};
pub use types::{
    Cli, CrawlConfig, DEFAULT_BASE_URL, DEFAULT_JSON_OUTPUT_PATH, DEFAULT_OUTPUT_PATH,
    DEFAULT_USER_AGENT, DataFormat, DelayRange, FileFormatArg, ListingRecord, PAGE_SIZE,
    default_output_path, detect_data_format,
};
