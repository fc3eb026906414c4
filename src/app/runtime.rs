use clap::Parser;
use tracing_subscriber::EnvFilter;

use super::crawl::{crawl_pages, preview_first_page};
use super::data_io::{export_records, load_records_from_file};
use super::error::ScrapeError;
use super::types::{Cli, CrawlConfig, ListingRecord};

const SUMMARY_TOP_N: usize = 5;
const RULE_WIDTH: usize = 50;

pub async fn run() -> Result<(), ScrapeError> {
    init_tracing();
    run_with(Cli::parse()).await
}

pub async fn run_with(cli: Cli) -> Result<(), ScrapeError> {
    if let Some(review_file) = cli.review_file.as_deref() {
        return run_review(review_file);
    }

    let config = CrawlConfig::from_cli(&cli)?;
    if cli.first_page {
        preview_first_page(&config).await?;
        return Ok(());
    }

    let (output_path, output_format) = cli.output_target();

    print_rule();
    println!("豆瓣电影TOP250爬虫 - 开始运行");
    print_rule();

    let records = crawl_pages(&config).await?;

    print_rule();
    println!("抓取完成！总共获取 {} 部电影", records.len());
    print_top_records(&records);

    export_records(&records, &output_path, output_format)?;

    println!("\n程序运行结束！");
    println!("可以打开 {output_path} 查看完整数据");
    Ok(())
}

fn run_review(review_file: &str) -> Result<(), ScrapeError> {
    let records = load_records_from_file(review_file)?;
    print_rule();
    println!("已载入 {review_file}，共 {} 部电影", records.len());
    print_top_records(&records);
    Ok(())
}

fn print_top_records(records: &[ListingRecord]) {
    println!("\n豆瓣电影TOP{SUMMARY_TOP_N}：");
    for record in records.iter().take(SUMMARY_TOP_N) {
        println!(
            "{}. {} - {}分（{}人评价）",
            record.rank, record.title, record.rating, record.vote_count
        );
        println!("   短评：{}", record.quote);
    }
}

fn print_rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("top250=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
