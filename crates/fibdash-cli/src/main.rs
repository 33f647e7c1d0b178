// File: crates/fibdash-cli/src/main.rs
// Summary: CLI front end: renders the candlestick chart section to PNG and prints Fibonacci levels.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fibdash_core::config::{DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_TICKER};
use fibdash_core::fibonacci::{Action, FibMethod};
use fibdash_core::{
    build_chart_section, run_chart_section, run_session, theme, ChartSection, CsvDirectoryProvider, DashboardConfig,
    DateRange, FibonacciEntry, FibonacciLevelSet, PngFileSink, PriceSeries, RenderOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fibdash")]
#[command(about = "Candlestick chart with moving averages and a Fibonacci level calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, clean and render the candlestick chart to PNG
    Chart {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Compute Fibonacci levels from entered or auto-derived prices
    Fib {
        #[command(flatten)]
        fib: FibArgs,
        /// Derive missing high/low/pivot from this ticker's price history
        #[arg(long)]
        ticker: Option<String>,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Run both sections; a chart failure does not stop the calculator
    Session {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        chart: ChartArgs,
        #[command(flatten)]
        fib: FibArgs,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Directory holding <TICKER>.csv price files
    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// First date to include (YYYY-MM-DD); enables a date range
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Date to stop before (YYYY-MM-DD); enables a date range
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl DataArgs {
    fn range(&self) -> DateRange {
        if self.start.is_none() && self.end.is_none() {
            return DateRange::All;
        }
        let today = chrono::Local::now().date_naive();
        match DateRange::default_between(today) {
            DateRange::Between { start, end } => DateRange::Between {
                start: self.start.unwrap_or(start),
                end: self.end.unwrap_or(end),
            },
            DateRange::All => DateRange::All,
        }
    }
}

#[derive(Args)]
struct ChartArgs {
    /// Stock ticker (e.g., AAPL, MSFT, TSLA)
    #[arg(short, long, default_value = DEFAULT_TICKER)]
    ticker: String,

    /// Period of the first moving average
    #[arg(long, default_value = "20", value_parser = parse_window)]
    sma1: usize,

    /// Period of the second moving average
    #[arg(long, default_value = "50", value_parser = parse_window)]
    sma2: usize,

    /// Horizontal line values, separated by commas
    #[arg(long, default_value = "")]
    lines: String,

    /// Horizontal line colors, separated by commas (e.g., #177e89,#084c61)
    #[arg(long, default_value = "")]
    colors: String,

    /// Output PNG path (defaults to target/out/<TICKER>_chart.png)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Theme preset (dark, light)
    #[arg(long, default_value = "dark")]
    theme: String,

    #[arg(long, default_value = "1100")]
    width: i32,

    #[arg(long, default_value = "640")]
    height: i32,
}

impl ChartArgs {
    fn config(&self, data: &DataArgs) -> DashboardConfig {
        DashboardConfig::new(self.ticker.clone())
            .with_range(data.range())
            .with_windows(self.sma1, self.sma2)
            .with_lines(self.lines.clone(), self.colors.clone())
    }

    fn sink(&self, cfg: &DashboardConfig) -> PngFileSink {
        let theme = theme::find(&self.theme);
        let out = self
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from("target/out").join(format!("{}_chart.png", cfg.display_ticker())));
        let opts = RenderOptions { width: self.width, height: self.height, theme, ..RenderOptions::default() };
        PngFileSink::new(out, opts)
    }
}

#[derive(Args)]
struct FibArgs {
    #[arg(long)]
    high: Option<f64>,

    #[arg(long)]
    low: Option<f64>,

    #[arg(long)]
    pivot: Option<f64>,

    /// buy or sell
    #[arg(long, default_value = "buy")]
    action: Action,

    /// retracement, extension, price-projection, expansion, retracement-extension, projection-expansion
    #[arg(long, default_value = "retracement")]
    method: FibMethod,

    /// Records used when deriving high/low/pivot from a ticker (all when omitted)
    #[arg(long)]
    lookback: Option<usize>,

    /// Print levels as JSON
    #[arg(long)]
    json: bool,
}

impl FibArgs {
    fn entry(&self) -> FibonacciEntry {
        FibonacciEntry {
            high: self.high,
            low: self.low,
            pivot: self.pivot,
            action: self.action,
            method: self.method,
            lookback: self.lookback,
        }
    }
}

fn parse_window(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("window must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Chart { data, chart } => {
            let provider = CsvDirectoryProvider::new(&data.data_dir);
            let cfg = chart.config(&data);
            let mut sink = chart.sink(&cfg);
            let theme = sink.options.theme;
            let section = run_chart_section(&provider, &cfg, &theme, &mut sink)
                .with_context(|| format!("chart for {}", cfg.display_ticker()))?;
            print_section(&section);
            println!("Wrote {}", sink.path.display());
        }
        Commands::Fib { fib, ticker, data } => {
            let entry = fib.entry();
            let series = match ticker {
                Some(t) if entry.needs_series() => Some(load_series(&data, &t)?),
                _ => None,
            };
            let input = entry.resolve(series.as_ref());
            info!(high = input.high, low = input.low, pivot = input.pivot, "fibonacci inputs");
            let levels = input.levels()?;
            print_levels(&levels, fib.json)?;
        }
        Commands::Session { data, chart, fib } => {
            let provider = CsvDirectoryProvider::new(&data.data_dir);
            let cfg = chart.config(&data);
            let mut sink = chart.sink(&cfg);
            let theme = sink.options.theme;
            let entry = fib.entry();
            let report = run_session(&provider, &cfg, &theme, &mut sink, Some(&entry));
            match &report.chart {
                Ok(section) => {
                    print_section(section);
                    println!("Wrote {}", sink.path.display());
                }
                Err(e) => eprintln!("Error: {e}"),
            }
            match report.fibonacci {
                Some(Ok(levels)) => print_levels(&levels, fib.json)?,
                Some(Err(e)) => eprintln!("Fibonacci: {e}"),
                None => {}
            }
        }
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_series(data: &DataArgs, ticker: &str) -> Result<PriceSeries> {
    let provider = CsvDirectoryProvider::new(&data.data_dir);
    // Windows of 1 keep every cleaned row usable.
    let cfg = DashboardConfig::new(ticker).with_range(data.range()).with_windows(1, 1);
    let section = build_chart_section(&provider, &cfg).with_context(|| format!("deriving prices from {ticker}"))?;
    Ok(section.prepared.series)
}

fn print_section(section: &ChartSection) {
    let report = &section.prepared.report;
    println!("Showing data for {}", section.ticker);
    println!(
        "{} rows fetched, {} dropped, {} charted",
        report.input_rows,
        report.dropped_rows,
        section.prepared.series.len()
    );
    for notice in &section.notices {
        if notice.is_warning() {
            eprintln!("Warning: {notice}");
        } else {
            println!("{notice}");
        }
    }
    println!("{:<12} {:>12} {:>12} {:>12} {:>12}", "Date", "Open", "High", "Low", "Close");
    for r in section.prepared.series.tail(5) {
        println!("{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2}", r.date, r.open, r.high, r.low, r.close);
    }
}

fn print_levels(levels: &FibonacciLevelSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(levels)?);
        return Ok(());
    }
    println!("Fibonacci {} Levels:", levels.method);
    for level in levels.iter() {
        println!("{}: {:.2}", level.label, level.price);
    }
    Ok(())
}
