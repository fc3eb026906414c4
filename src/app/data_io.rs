use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::error::ScrapeError;
use super::types::{DataFormat, ListingRecord, detect_data_format};

pub const CSV_HEADERS: [&str; 6] = ["排名", "电影名", "评分", "评价人数", "短评", "信息"];

const UTF8_BOM: &str = "\u{feff}";

struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    fn new(path: &Path) -> Result<Self, ScrapeError> {
        let mut file = File::create(path)?;
        file.write_all(UTF8_BOM.as_bytes())?;
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);
        writer.write_record(CSV_HEADERS)?;
        Ok(Self { writer })
    }

    fn write_row(&mut self, record: &ListingRecord) -> Result<(), ScrapeError> {
        let rank = record.rank.to_string();
        self.writer.write_record([
            rank.as_str(),
            record.title.as_str(),
            record.rating.as_str(),
            record.vote_count.as_str(),
            record.quote.as_str(),
            record.info.as_str(),
        ])?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ScrapeError> {
        self.writer.flush()?;
        Ok(())
    }
}

struct JsonSink {
    file: BufWriter<File>,
    first: bool,
}

impl JsonSink {
    fn new(path: &Path) -> Result<Self, ScrapeError> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(b"[\n")?;
        Ok(Self { file, first: true })
    }

    fn write_row(&mut self, record: &ListingRecord) -> Result<(), ScrapeError> {
        if !self.first {
            self.file.write_all(b",\n")?;
        }
        self.first = false;
        serde_json::to_writer_pretty(&mut self.file, record)?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ScrapeError> {
        if self.first {
            self.file.write_all(b"]\n")?;
        } else {
            self.file.write_all(b"\n]\n")?;
        }
        self.file.flush()?;
        Ok(())
    }
}

enum OutputSink {
    Csv(CsvSink),
    Json(JsonSink),
}

impl OutputSink {
    fn new(path: &Path, format: DataFormat) -> Result<Self, ScrapeError> {
        match format {
            DataFormat::Csv => Ok(OutputSink::Csv(CsvSink::new(path)?)),
            DataFormat::Json => Ok(OutputSink::Json(JsonSink::new(path)?)),
        }
    }

    fn write_row(&mut self, record: &ListingRecord) -> Result<(), ScrapeError> {
        match self {
            OutputSink::Csv(sink) => sink.write_row(record),
            OutputSink::Json(sink) => sink.write_row(record),
        }
    }

    fn finalize(&mut self) -> Result<(), ScrapeError> {
        match self {
            OutputSink::Csv(sink) => sink.finalize(),
            OutputSink::Json(sink) => sink.finalize(),
        }
    }
}

/// Writes every record to `path`, replacing any existing file.
///
/// An empty slice is reported and leaves the filesystem untouched.
pub fn export_records(
    records: &[ListingRecord],
    path: impl AsRef<Path>,
    format: DataFormat,
) -> Result<(), ScrapeError> {
    let path = path.as_ref();
    if records.is_empty() {
        println!("没有数据可保存");
        return Ok(());
    }

    let mut sink = OutputSink::new(path, format)?;
    for record in records {
        sink.write_row(record)?;
    }
    sink.finalize()?;

    debug!(path = %path.display(), ?format, rows = records.len(), "export written");
    println!("数据已保存到 {}，共 {} 条记录", path.display(), records.len());
    Ok(())
}

fn load_records_from_csv(path: &Path) -> Result<Vec<ListingRecord>, ScrapeError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut index = HashMap::<String, usize>::new();
    for (idx, header) in headers.iter().enumerate() {
        index.insert(header.trim_start_matches(UTF8_BOM).trim().to_string(), idx);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let get = |name: &str| -> String {
            index
                .get(name)
                .and_then(|idx| row.get(*idx))
                .unwrap_or_default()
                .to_string()
        };

        let [rank, title, rating, vote_count, quote, info] = CSV_HEADERS;
        let raw_rank = get(rank);
        let rank = match raw_rank.trim().parse::<usize>() {
            Ok(value) if value > 0 => value,
            _ => {
                return Err(ScrapeError::InvalidRank {
                    line: row.position().map(|pos| pos.line()).unwrap_or(0),
                    value: raw_rank,
                });
            }
        };
        records.push(ListingRecord {
            rank,
            title: get(title),
            rating: get(rating),
            vote_count: get(vote_count),
            quote: get(quote),
            info: get(info),
        });
    }

    Ok(records)
}

fn load_records_from_json(path: &Path) -> Result<Vec<ListingRecord>, ScrapeError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str::<Vec<ListingRecord>>(&content)?)
}

/// Reads a previous export back into records, choosing the format from the
/// file extension (CSV when unknown).
pub fn load_records_from_file(path: impl AsRef<Path>) -> Result<Vec<ListingRecord>, ScrapeError> {
    let path = path.as_ref();
    match detect_data_format(&path.to_string_lossy(), DataFormat::Csv) {
        DataFormat::Csv => load_records_from_csv(path),
        DataFormat::Json => load_records_from_json(path),
    }
}
