mod common;

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use common::{mount_full_page, mount_page};
use top250::{Cli, DEFAULT_JSON_OUTPUT_PATH, ListingRecord, load_records_from_file, run_with};
use wiremock::{MockServer, ResponseTemplate};

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("top250").chain(args.iter().copied()))
}

#[tokio::test]
async fn full_run_exports_every_fetched_page() {
    let server = MockServer::start().await;
    for page_index in 0..3 {
        mount_full_page(&server, page_index).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movies.csv");
    let base_url = format!("{}/top250", server.uri());
    let out_arg = out.to_string_lossy().into_owned();

    run_with(cli(&[
        "--base-url",
        &base_url,
        "--pages",
        "3",
        "--min-delay",
        "0",
        "--max-delay",
        "0",
        "--output",
        &out_arg,
    ]))
    .await
    .unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 76);

    let reviewed = load_records_from_file(&out).unwrap();
    assert_eq!(reviewed.len(), 75);
    assert_eq!(
        reviewed[26],
        ListingRecord {
            rank: 2,
            title: "Movie 027".to_string(),
            rating: "9.7".to_string(),
            vote_count: "100027".to_string(),
            quote: "Quote 27".to_string(),
            info: "Quote 27".to_string(),
        }
    );
}

#[tokio::test]
async fn run_with_every_page_failing_writes_no_file() {
    let server = MockServer::start().await;
    mount_page(&server, 0, ResponseTemplate::new(404)).await;
    mount_page(&server, 1, ResponseTemplate::new(500)).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movies.csv");
    let base_url = format!("{}/top250", server.uri());
    let out_arg = out.to_string_lossy().into_owned();

    run_with(cli(&[
        "--base-url",
        &base_url,
        "--pages",
        "2",
        "--max-delay",
        "0",
        "--min-delay",
        "0",
        "-o",
        &out_arg,
    ]))
    .await
    .unwrap();

    assert!(!out.exists());
}

#[tokio::test]
async fn json_output_extension_selects_json_export() {
    let server = MockServer::start().await;
    mount_full_page(&server, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movies.json");
    let base_url = format!("{}/top250", server.uri());
    let out_arg = out.to_string_lossy().into_owned();

    run_with(cli(&[
        "--base-url",
        &base_url,
        "--pages",
        "1",
        "--min-delay",
        "0",
        "--max-delay",
        "0",
        "--output",
        &out_arg,
    ]))
    .await
    .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(25));
    assert_eq!(value[0]["title"], "Movie 001");
}

struct RestoreDir(PathBuf);

impl Drop for RestoreDir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.0);
    }
}

#[tokio::test]
async fn json_format_without_output_writes_default_json_file() {
    let server = MockServer::start().await;
    mount_full_page(&server, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let _restore = RestoreDir(env::current_dir().unwrap());
    env::set_current_dir(dir.path()).unwrap();

    let base_url = format!("{}/top250", server.uri());
    run_with(cli(&[
        "--base-url",
        &base_url,
        "--pages",
        "1",
        "--min-delay",
        "0",
        "--max-delay",
        "0",
        "--format",
        "json",
    ]))
    .await
    .unwrap();

    let out = dir.path().join(DEFAULT_JSON_OUTPUT_PATH);
    assert!(!dir.path().join("douban_movies.csv").exists());
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(25));
    assert_eq!(value[0]["rank"], 1);
}

#[tokio::test]
async fn review_mode_reads_previous_export_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("previous.csv");
    fs::write(
        &out,
        "\u{feff}排名,电影名,评分,评价人数,短评,信息\r\n1,霸王别姬,9.6,\"2,000,000\",风华绝代。,1993 / 中国大陆\r\n",
    )
    .unwrap();

    let out_arg = out.to_string_lossy().into_owned();
    run_with(cli(&["--review", &out_arg])).await.unwrap();

    let records = load_records_from_file(&out).unwrap();
    assert_eq!(records[0].title, "霸王别姬");
    assert_eq!(records[0].vote_count, "2,000,000");
}

#[tokio::test]
async fn review_of_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    let arg = missing.to_string_lossy().into_owned();
    assert!(run_with(cli(&["--review", &arg])).await.is_err());
}
