use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::error::ScrapeError;
use super::types::ListingRecord;

pub const UNKNOWN_PLACEHOLDER: &str = "未知";
pub const NO_QUOTE_PLACEHOLDER: &str = "无";
pub const DEFAULT_RATING: &str = "0.0";
pub const DEFAULT_VOTE_COUNT: &str = "0";

const VOTE_COUNT_SUFFIX: &str = "人评价";
// The vote count is the fourth span inside `div.star`.
const VOTE_COUNT_SPAN_INDEX: usize = 3;
// On live pages the second `p` in `div.bd` is `p.quote`, so info repeats the quote.
const INFO_PARAGRAPH_INDEX: usize = 1;
const INFO_MAX_CHARS: usize = 50;
const TRUNCATION_MARKER: &str = "...";

/// Compiled selectors for the Top 250 listing markup.
pub struct ListingSelectors {
    item: Selector,
    title: Selector,
    rating: Selector,
    star: Selector,
    span: Selector,
    quote: Selector,
    body: Selector,
    paragraph: Selector,
}

impl ListingSelectors {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            item: compile_selector("div.item")?,
            title: compile_selector("span.title")?,
            rating: compile_selector("span.rating_num")?,
            star: compile_selector("div.star")?,
            span: compile_selector("span")?,
            quote: compile_selector("span.inq")?,
            body: compile_selector("div.bd")?,
            paragraph: compile_selector("p")?,
        })
    }

    /// Extracts one record per `div.item` block, in document order.
    ///
    /// Every field falls back to its default on its own, so a block with
    /// missing markup still yields a record.
    pub fn parse_page(&self, html: &str) -> Vec<ListingRecord> {
        if html.is_empty() {
            return Vec::new();
        }

        let doc = Html::parse_document(html);
        let mut records = Vec::new();
        for item in doc.select(&self.item) {
            let record = ListingRecord {
                rank: records.len() + 1,
                title: first_text(item, &self.title)
                    .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string()),
                rating: first_text(item, &self.rating)
                    .unwrap_or_else(|| DEFAULT_RATING.to_string()),
                vote_count: self.vote_count(item),
                quote: first_text(item, &self.quote)
                    .unwrap_or_else(|| NO_QUOTE_PLACEHOLDER.to_string()),
                info: self.info(item),
            };
            records.push(record);
        }

        debug!(blocks = records.len(), "parsed listing page");
        println!("本页解析到 {} 部电影", records.len());
        records
    }

    fn vote_count(&self, item: ElementRef<'_>) -> String {
        let Some(star) = item.select(&self.star).next() else {
            return DEFAULT_VOTE_COUNT.to_string();
        };

        match star.select(&self.span).nth(VOTE_COUNT_SPAN_INDEX) {
            Some(span) => strip_vote_count(&element_text(span)),
            None => DEFAULT_VOTE_COUNT.to_string(),
        }
    }

    fn info(&self, item: ElementRef<'_>) -> String {
        let info = item
            .select(&self.body)
            .next()
            .and_then(|body| body.select(&self.paragraph).nth(INFO_PARAGRAPH_INDEX))
            .map(|paragraph| normalize_text(&element_text(paragraph)))
            .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
        truncate_info(&info)
    }
}

fn compile_selector(selector: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|err| ScrapeError::Selector {
        selector,
        reason: err.to_string(),
    })
}

fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(element_text)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips the parentheses and the "people rated" suffix around a vote count,
/// e.g. `(1,234,567人评价)` becomes `1,234,567`.
pub fn strip_vote_count(raw: &str) -> String {
    raw.replace(['(', ')'], "").replace(VOTE_COUNT_SUFFIX, "")
}

pub fn truncate_info(text: &str) -> String {
    if text.chars().count() <= INFO_MAX_CHARS {
        return text.to_string();
    }
    let mut out = text.chars().take(INFO_MAX_CHARS).collect::<String>();
    out.push_str(TRUNCATION_MARKER);
    out
}
