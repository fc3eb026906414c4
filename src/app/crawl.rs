use std::time::Instant;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use super::error::ScrapeError;
use super::parse::ListingSelectors;
use super::types::{CrawlConfig, ListingRecord, PAGE_SIZE};

const PREVIEW_RECORDS: usize = 3;

pub fn page_offset(page_index: usize) -> usize {
    page_index * PAGE_SIZE
}

/// Console label for the first movie of a page, derived from the page offset.
pub fn display_rank(page_index: usize) -> usize {
    page_offset(page_index) + 1
}

pub fn page_url(base_url: &Url, page_index: usize) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair("start", &page_offset(page_index).to_string());
    url
}

pub struct PageFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl PageFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn page_url(&self, page_index: usize) -> Url {
        page_url(&self.base_url, page_index)
    }

    /// Fetches one listing page. Failures are reported on stdout and
    /// collapse to `None` so the crawl can move on.
    pub async fn fetch(&self, page_index: usize) -> Option<String> {
        let page_number = page_index + 1;
        let url = self.page_url(page_index);
        println!("正在抓取第 {page_number} 页...");

        let started = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%url, error = %err, "page request failed");
                println!("第 {page_number} 页出错：{err}");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "unexpected page status");
            println!("第 {page_number} 页请求失败，状态码：{}", status.as_u16());
            return None;
        }

        match response.bytes().await {
            Ok(body) => {
                debug!(
                    %url,
                    bytes = body.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fetched page"
                );
                Some(String::from_utf8_lossy(&body).into_owned())
            }
            Err(err) => {
                warn!(%url, error = %err, "page body read failed");
                println!("第 {page_number} 页出错：{err}");
                None
            }
        }
    }
}

/// Fetches every configured page in order and accumulates the parsed records.
///
/// A page that fails to fetch contributes nothing. A pause drawn from the
/// configured delay range follows every page attempt, the last one included.
pub async fn crawl_pages(config: &CrawlConfig) -> Result<Vec<ListingRecord>, ScrapeError> {
    let fetcher = PageFetcher::new(config)?;
    let selectors = ListingSelectors::new()?;
    let mut all_records = Vec::new();

    for page_index in 0..config.pages {
        if let Some(html) = fetcher.fetch(page_index).await {
            let records = selectors.parse_page(&html);
            if let Some(first) = records.first() {
                println!(
                    "  第{}名：{} - {}分",
                    display_rank(page_index),
                    first.title,
                    first.rating
                );
            }
            all_records.extend(records);
        }

        let pause = config.delay.sample();
        if !pause.is_zero() {
            debug!(page = page_index + 1, pause_ms = pause.as_millis() as u64, "throttling");
            tokio::time::sleep(pause).await;
        }
        println!();
    }

    Ok(all_records)
}

/// Debug run: fetches and parses the first page only.
pub async fn preview_first_page(config: &CrawlConfig) -> Result<Vec<ListingRecord>, ScrapeError> {
    let fetcher = PageFetcher::new(config)?;
    let selectors = ListingSelectors::new()?;

    println!("测试模式：只抓取第一页");
    let Some(html) = fetcher.fetch(0).await else {
        return Ok(Vec::new());
    };

    let records = selectors.parse_page(&html);
    println!("第一页有 {} 部电影：", records.len());
    for record in records.iter().take(PREVIEW_RECORDS) {
        println!("  {} - {}分", record.title, record.rating);
    }
    Ok(records)
}
