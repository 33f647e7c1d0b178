// File: crates/fibdash-core/tests/provider.rs
// Purpose: Validate CSV loading (flat and multi-row headers), date filtering, and provider errors.

use std::path::PathBuf;

use chrono::NaiveDate;
use fibdash_core::provider::{load_raw_csv, parse_date};
use fibdash_core::raw::Cell;
use fibdash_core::{CsvDirectoryProvider, DateRange, FetchError, InMemoryProvider, MarketDataProvider, RawFrame};

fn test_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("provider").join(name);
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const FLAT: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,10,11,9,10.5,10.4,100
2024-01-03,10.5,12,10,11.5,11.4,120
2024-01-04,11.5,11.8,n/a,11,10.9,90
2024-01-05,11,11.5,10.5,,11,80
";

const MULTI_ROW: &str = "\
Price,Close,High,Low,Open,Volume
Ticker,MSFT,MSFT,MSFT,MSFT,MSFT
Date,,,,,
2024-01-02 00:00:00+00:00,370.8,375.9,366.8,373.9,25258600
2024-01-03 00:00:00+00:00,370.6,373.3,368.5,369.0,23083500
";

#[test]
fn loads_flat_csv_as_raw_cells() {
    let dir = test_dir("flat");
    let path = dir.join("AAPL.csv");
    std::fs::write(&path, FLAT).unwrap();

    let frame = load_raw_csv(&path).expect("load");
    assert_eq!(frame.len(), 4);
    assert_eq!(frame.index[0], ymd(2024, 1, 2));
    assert!(frame.column("Date").is_none(), "index column is not a data column");
    let low = frame.column("low").unwrap();
    assert_eq!(low.cells[2], Cell::Text("n/a".into()));
    let close = frame.column("Close").unwrap();
    assert_eq!(close.cells[3], Cell::Missing);
    assert_eq!(close.cells[0], Cell::Number(10.5));
}

#[test]
fn loads_multi_row_headers() {
    let dir = test_dir("multi");
    let path = dir.join("MSFT.csv");
    std::fs::write(&path, MULTI_ROW).unwrap();

    let frame = load_raw_csv(&path).expect("load");
    assert_eq!(frame.index, vec![ymd(2024, 1, 2), ymd(2024, 1, 3)]);
    let close = frame.column("Close").unwrap();
    assert_eq!(close.header, vec!["Close", "MSFT", ""]);
    assert_eq!(close.cells[1], Cell::Number(370.6));
}

#[test]
fn malformed_date_after_data_is_an_error() {
    let dir = test_dir("malformed");
    let path = dir.join("BAD.csv");
    std::fs::write(&path, "Date,Open,High,Low,Close\n2024-01-02,1,2,0.5,1.5\nyesterday,1,2,0.5,1.5\n").unwrap();
    match load_raw_csv(&path) {
        Err(FetchError::Malformed { line, value }) => {
            assert_eq!(line, 3);
            assert_eq!(value, "yesterday");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn directory_provider_filters_by_range() {
    let dir = test_dir("range");
    std::fs::write(dir.join("AAPL.csv"), FLAT).unwrap();
    let provider = CsvDirectoryProvider::new(&dir);

    let all = provider.fetch("aapl", &DateRange::All).expect("all");
    assert_eq!(all.len(), 4);

    let range = DateRange::Between { start: ymd(2024, 1, 3), end: ymd(2024, 1, 5) };
    let some = provider.fetch("AAPL", &range).expect("range");
    assert_eq!(some.index, vec![ymd(2024, 1, 3), ymd(2024, 1, 4)]);
    assert!(some.columns.iter().all(|c| c.cells.len() == 2));

    let none = DateRange::Between { start: ymd(2030, 1, 1), end: ymd(2031, 1, 1) };
    assert!(matches!(provider.fetch("AAPL", &none), Err(FetchError::Empty { .. })));
}

#[test]
fn directory_provider_reports_unknown_ticker() {
    let provider = CsvDirectoryProvider::new(test_dir("empty"));
    assert!(matches!(provider.fetch("ZZZZ", &DateRange::All), Err(FetchError::NotFound { .. })));
}

#[test]
fn in_memory_provider_is_case_insensitive() {
    let frame = RawFrame::new(vec![ymd(2024, 1, 2)]);
    let provider = InMemoryProvider::new().with_frame("tsla", frame.clone());
    assert_eq!(provider.fetch("TSLA", &DateRange::All).unwrap(), frame);
    assert!(provider.fetch("NVDA", &DateRange::All).is_err());
}

#[test]
fn default_date_range_ends_yesterday() {
    let range = DateRange::default_between(ymd(2024, 6, 15));
    assert_eq!(range, DateRange::Between { start: ymd(2020, 1, 1), end: ymd(2024, 6, 14) });
    assert!(range.contains(ymd(2020, 1, 1)));
    assert!(!range.contains(ymd(2024, 6, 14)));
}

#[test]
fn parses_common_date_encodings() {
    assert_eq!(parse_date("2024-02-29"), Some(ymd(2024, 2, 29)));
    assert_eq!(parse_date("2024-02-29 00:00:00-05:00"), Some(ymd(2024, 2, 29)));
    assert_eq!(parse_date("2024-02-29 16:00:00"), Some(ymd(2024, 2, 29)));
    assert_eq!(parse_date("1704153600"), Some(ymd(2024, 1, 2)));
    assert_eq!(parse_date("1704153600000"), Some(ymd(2024, 1, 2)));
    assert_eq!(parse_date("Ticker"), None);
    assert_eq!(parse_date("42"), None);
    assert_eq!(parse_date("20240102"), Some(ymd(2024, 1, 2)));
    assert_eq!(parse_date("20241301"), None);
    assert_eq!(parse_date(""), None);
}
