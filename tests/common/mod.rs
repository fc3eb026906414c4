#![allow(dead_code)]

use top250::{CrawlConfig, DelayRange, PAGE_SIZE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn movie_title(position: usize) -> String {
    format!("Movie {position:03}")
}

fn listing_block(position: usize) -> String {
    format!(
        r#"<li>
  <div class="item">
    <div class="pic"><em class="">{position}</em></div>
    <div class="info">
      <div class="hd">
        <a href="https://movie.douban.com/subject/{position}/">
          <span class="title">{title}</span>
          <span class="title">&nbsp;/&nbsp;Original {position}</span>
        </a>
      </div>
      <div class="bd">
        <p class="">导演: Director {position}<br>2001&nbsp;/&nbsp;美国&nbsp;/&nbsp;剧情</p>
        <div class="star">
          <span class="rating5-t"></span>
          <span class="rating_num" property="v:average">9.{digit}</span>
          <span property="v:best" content="10.0"></span>
          <span>({votes}人评价)</span>
        </div>
        <p class="quote"><span class="inq">Quote {position}</span></p>
      </div>
    </div>
  </div>
</li>"#,
        title = movie_title(position),
        digit = position % 10,
        votes = 100_000 + position,
    )
}

/// A listing page whose movies occupy global positions `offset + 1 ..= offset + count`.
pub fn listing_page(offset: usize, count: usize) -> String {
    let blocks = (1..=count)
        .map(|n| listing_block(offset + n))
        .collect::<String>();
    format!(
        r#"<!DOCTYPE html><html><head><title>豆瓣电影 Top 250</title></head>
<body><div id="content"><ol class="grid_view">{blocks}</ol></div></body></html>"#
    )
}

pub async fn mount_page(server: &MockServer, page_index: usize, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/top250"))
        .and(query_param("start", (page_index * PAGE_SIZE).to_string()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_full_page(server: &MockServer, page_index: usize) {
    let html = listing_page(page_index * PAGE_SIZE, PAGE_SIZE);
    mount_page(
        server,
        page_index,
        ResponseTemplate::new(200).set_body_raw(html.into_bytes(), "text/html; charset=utf-8"),
    )
    .await;
}

pub fn test_config(server: &MockServer) -> CrawlConfig {
    CrawlConfig::new(&format!("{}/top250", server.uri()))
        .unwrap()
        .with_delay(DelayRange::disabled())
}
