//! Almanac CLI binary.
//!
//! Provides the command-line interface for the seasonality screener.

mod integration;

use almanac::{Tier, Universe, WatchlistUniverse};
use almanac_data::{
    PriceIndex, loader,
    validate::{DEFAULT_TOLERANCE_PCT, read_reference, validate_close_max},
    yahoo::YahooQuoteProvider,
};
use almanac_output::{ExportFormat, Exporter, ProfileSummary, ReportBuilder, ScreenerSummary};
use almanac_returns::{CalcMethod, build_profile, compute_benchmark_aggregates};
use almanac_screener::{DEFAULT_BENCHMARKS, Screener, ScreenerConfig};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::{
    cache_manager,
    data_pipeline::{
        DEFAULT_CONCURRENCY, DEFAULT_START_YEAR, FetchConfig, entries_for, print_store_info,
        update_store,
    },
};
use serde_json::json;
use std::{
    error::Error,
    fs::File,
    path::{Path, PathBuf},
    process,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "Almanac: calendar-month seasonality screener", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the monthly price store (defaults to the platform cache directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the universe for the strongest seasonal entry months
    Screen(ScreenArgs),

    /// Seasonality profile for one ticker
    Analyze {
        /// Stock symbol
        ticker: String,

        /// Holding period in months
        #[arg(long, default_value_t = 3)]
        period: u32,

        /// Pricing convention (openToClose or maxToMax)
        #[arg(long, default_value_t = CalcMethod::OpenToClose)]
        method: CalcMethod,

        /// Restrict outlier detection to returns entered in this month (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Years of history
        #[arg(long, default_value_t = 10)]
        lookback_years: u32,

        /// Benchmark tickers, comma-separated
        #[arg(long, value_delimiter = ',')]
        benchmarks: Option<Vec<String>>,

        /// Read monthly prices from a CSV file instead of the store
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Output format (csv, json or pretty-json); prints a table when omitted
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fetch quotes from Yahoo Finance into the store
    Update {
        /// Only update tickers in this tier
        #[arg(long, conflicts_with = "tickers")]
        tier: Option<Tier>,

        /// Update these tickers, comma-separated
        #[arg(long, value_delimiter = ',')]
        tickers: Option<Vec<String>>,

        /// First year fetched for tickers with no stored history
        #[arg(long, default_value_t = DEFAULT_START_YEAR)]
        start_year: i32,

        /// Maximum concurrent requests
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Refetch full history even for stored tickers
        #[arg(long)]
        refresh: bool,
    },

    /// List watchlist tickers by tier
    Universe {
        /// Only list this tier
        #[arg(long)]
        tier: Option<Tier>,
    },

    /// Compare stored monthly closeMax against reference values
    Validate {
        /// Stock symbol
        ticker: String,

        /// Reference CSV with columns year, month, close_max
        #[arg(long)]
        reference: PathBuf,

        /// Relative difference in percent below which a month matches
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_PCT)]
        tolerance: f64,

        /// Read monthly prices from a CSV file instead of the store
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Output format (csv, json or pretty-json); prints a summary when omitted
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ScreenArgs {
    /// Read monthly prices from a CSV file instead of the store
    #[arg(long)]
    prices: Option<PathBuf>,

    /// JSON screener configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Holding periods in months, comma-separated
    #[arg(long, value_delimiter = ',')]
    periods: Option<Vec<u32>>,

    /// Pricing convention (openToClose or maxToMax)
    #[arg(long)]
    method: Option<CalcMethod>,

    /// Minimum win rate in percent
    #[arg(long)]
    min_win_rate: Option<f64>,

    /// Minimum average per-month return in percent
    #[arg(long, allow_negative_numbers = true)]
    min_avg_per_month: Option<f64>,

    /// Minimum number of distinct entry years
    #[arg(long)]
    min_sample_years: Option<usize>,

    /// Maximum number of rows returned
    #[arg(long)]
    limit: Option<usize>,

    /// Years of history
    #[arg(long)]
    lookback_years: Option<u32>,

    /// Benchmark tickers, comma-separated
    #[arg(long, value_delimiter = ',')]
    benchmarks: Option<Vec<String>>,

    /// Screen only this watchlist tier
    #[arg(long, conflicts_with = "tickers")]
    tier: Option<Tier>,

    /// Screen only these tickers, comma-separated
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Output format (csv, json or pretty-json); prints a table when omitted
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Write to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ScreenArgs {
    /// Configuration file (or defaults) with flag overrides applied.
    fn screener_config(&self) -> Result<ScreenerConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => ScreenerConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => ScreenerConfig::default(),
        };

        if let Some(periods) = &self.periods {
            config.holding_periods.clone_from(periods);
        }
        if let Some(method) = self.method {
            config.calc_method = method;
        }
        if let Some(v) = self.min_win_rate {
            config.min_win_rate_pct = v;
        }
        if let Some(v) = self.min_avg_per_month {
            config.min_avg_per_month_pct = v;
        }
        if let Some(v) = self.min_sample_years {
            config.min_sample_years = v;
        }
        if let Some(v) = self.limit {
            config.result_limit = v;
        }
        if let Some(v) = self.lookback_years {
            config.lookback_years = v;
        }
        if let Some(benchmarks) = &self.benchmarks {
            config.benchmarks.clone_from(benchmarks);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Screen(args) => run_screen(&args, db)?,
        Commands::Analyze {
            ticker,
            period,
            method,
            month,
            lookback_years,
            benchmarks,
            prices,
            format,
            output,
        } => {
            let benchmarks = benchmarks
                .unwrap_or_else(|| DEFAULT_BENCHMARKS.iter().map(ToString::to_string).collect());
            analyze_ticker(
                &ticker,
                period,
                method,
                month,
                lookback_years,
                &benchmarks,
                prices.as_deref(),
                db,
                format,
                output.as_deref(),
            )?;
        }
        Commands::Update {
            tier,
            tickers,
            start_year,
            concurrency,
            refresh,
        } => {
            let config = FetchConfig {
                start_year,
                concurrency,
                force_refresh: refresh,
            };
            update_data(tier, tickers, config, db).await?;
        }
        Commands::Universe { tier } => list_universe(tier, db),
        Commands::Validate {
            ticker,
            reference,
            tolerance,
            prices,
            format,
            output,
        } => {
            validate_ticker(
                &ticker,
                &reference,
                tolerance,
                prices.as_deref(),
                db,
                format,
                output.as_deref(),
            )?;
        }
    }

    Ok(())
}

fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Monthly prices from `prices` when given, otherwise from the store.
fn load_prices(
    prices: Option<&Path>,
    db: Option<&Path>,
    min_year: i32,
) -> Result<PriceIndex, Box<dyn Error>> {
    let index = match prices {
        Some(path) => loader::load_csv(path)?.since_year(min_year),
        None => {
            let index = cache_manager::open_store(db)?.load_index(min_year)?;
            if index.is_empty() {
                return Err("the price store is empty; run `almanac update` first".into());
            }
            index
        }
    };
    Ok(index)
}

/// Infer the export format from the output file extension.
fn resolve_format(format: Option<ExportFormat>, output: Option<&Path>) -> Option<ExportFormat> {
    format.or_else(|| {
        output.map(|path| match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::PrettyJson,
        })
    })
}

fn write_export<E: Exporter>(
    value: &E,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            value.export_to_file(path, format)?;
            eprintln!("Wrote {} ({})", path.display(), format);
        }
        None => println!("{}", value.export_to_string(format)?),
    }
    Ok(())
}

fn run_screen(args: &ScreenArgs, db: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = args.screener_config()?;
    let prices = load_prices(args.prices.as_deref(), db, config.min_year())?;

    let universe: Vec<String> = if let Some(tickers) = &args.tickers {
        tickers.clone()
    } else if let Some(tier) = args.tier {
        WatchlistUniverse::new().symbols_in_tier(tier)
    } else {
        prices.tickers().map(ToString::to_string).collect()
    };

    let screener = Screener::new(config)?;
    let output = screener.screen(&universe, &prices)?;

    match resolve_format(args.format, args.output.as_deref()) {
        Some(format) => write_export(&output, format, args.output.as_deref())?,
        None => {
            let config = screener.config();
            print_header("SEASONALITY SCREENER");
            println!(
                "Holding periods: {:?}  Method: {}  Lookback: {} years (from {})",
                config.distinct_holding_periods(),
                config.calc_method,
                config.lookback_years,
                config.min_year()
            );
            println!("Benchmarks: {}", config.benchmark_tickers().join(", "));
            print!("{}", ScreenerSummary::new(&output).to_ascii_table());
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn analyze_ticker(
    ticker: &str,
    period: u32,
    method: CalcMethod,
    month: Option<u32>,
    lookback_years: u32,
    benchmarks: &[String],
    prices: Option<&Path>,
    db: Option<&Path>,
    format: Option<ExportFormat>,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let ticker = ticker.trim().to_uppercase();
    let window = ScreenerConfig {
        holding_periods: vec![period],
        lookback_years,
        ..ScreenerConfig::default()
    };
    window.validate()?;
    let min_year = window.min_year();

    let prices = load_prices(prices, db, min_year)?;
    let series = prices
        .get(&ticker)
        .ok_or_else(|| format!("no price data for {ticker} since {min_year}"))?;

    let benchmark_map = compute_benchmark_aggregates(&prices, &[period], method, benchmarks)?;
    let profile = build_profile(series, period, method, &benchmark_map, month)?;

    match resolve_format(format, output) {
        Some(ExportFormat::Csv) => write_export(&profile, ExportFormat::Csv, output)?,
        Some(format) => {
            let report = ReportBuilder::new()
                .subject(ticker.as_str())
                .lookback_years(lookback_years)
                .config(&json!({
                    "holdingPeriod": period,
                    "calcMethod": method,
                    "peerMonth": month,
                    "benchmarks": benchmarks,
                    "minYear": min_year,
                }))?
                .contents(&profile)?
                .build()?;
            let content = if format == ExportFormat::PrettyJson {
                report.to_json()?
            } else {
                serde_json::to_string(&report)?
            };
            match output {
                Some(path) => {
                    std::fs::write(path, content)?;
                    eprintln!("Wrote {} ({})", path.display(), format);
                }
                None => println!("{}", content),
            }
        }
        None => {
            print_header(&format!("SEASONALITY ANALYSIS: {}", ticker));
            if let Some((first, last)) = series.span() {
                println!("History: {} to {} ({} months)", first, last, series.len());
            }
            println!("Benchmarks: {}", benchmarks.join(", "));
            print!("{}", ProfileSummary::new(&profile).to_ascii_table());
        }
    }

    Ok(())
}

async fn update_data(
    tier: Option<Tier>,
    tickers: Option<Vec<String>>,
    config: FetchConfig,
    db: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let watchlist = WatchlistUniverse::new();
    let entries = match (tickers, tier) {
        (Some(tickers), _) => entries_for(&tickers, &watchlist),
        (None, Some(tier)) => watchlist
            .entries()
            .iter()
            .filter(|e| e.tier == tier)
            .cloned()
            .collect(),
        (None, None) => watchlist.entries().to_vec(),
    };

    let store = cache_manager::open_store(db)?;

    print_header("UPDATE MONTHLY PRICES");
    print_store_info(&store, &cache_manager::store_path(db));
    if config.force_refresh {
        println!("  Mode: Full refresh from {}", config.start_year);
    }
    println!();

    let provider = YahooQuoteProvider::new()?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let summary = match update_store(&provider, &store, &entries, &config, Some(&pb)).await {
        Ok(summary) => {
            pb.finish_with_message(format!(
                "Updated {} tickers ({} monthly rows)",
                summary.updated, summary.rows_written
            ));
            summary
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    if !summary.failed.is_empty() {
        println!("\nFailed tickers:");
        for (ticker, reason) in &summary.failed {
            println!("  {:<8} {}", ticker, reason);
        }
    }
    println!();
    print_store_info(&store, &cache_manager::store_path(db));

    Ok(())
}

fn list_universe(tier: Option<Tier>, db: Option<&Path>) {
    let universe = WatchlistUniverse::new();

    println!("Almanac Watchlist");
    println!("=================\n");
    println!("Total tickers: {}\n", universe.size());

    let tiers = tier.map_or_else(|| Tier::ALL.to_vec(), |t| vec![t]);
    for tier in tiers {
        let symbols = universe.symbols_in_tier(tier);
        println!("{} (tier {}): {} tickers", tier, tier.level(), symbols.len());
        for chunk in symbols.chunks(10) {
            println!("  {}", chunk.join(" "));
        }
        println!();
    }

    if let Ok(store) = cache_manager::open_store(db) {
        print_store_info(&store, &cache_manager::store_path(db));
    }
}

fn validate_ticker(
    ticker: &str,
    reference: &Path,
    tolerance: f64,
    prices: Option<&Path>,
    db: Option<&Path>,
    format: Option<ExportFormat>,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let ticker = ticker.trim().to_uppercase();
    let points = read_reference(File::open(reference)?)?;

    let prices = load_prices(prices, db, i32::MIN)?;
    let series = prices
        .get(&ticker)
        .ok_or_else(|| format!("no price data for {ticker}"))?;

    let report = validate_close_max(series, &points, tolerance);

    match resolve_format(format, output) {
        Some(format) => write_export(&report, format, output)?,
        None => {
            print_header(&format!("CLOSE MAX VALIDATION: {}", ticker));
            println!("Reference: {} ({} points)", reference.display(), points.len());
            println!("Tolerance: {:.2}%", tolerance);
            println!(
                "Matched:   {}/{} ({:.1}%)",
                report.matches, report.total, report.match_pct
            );
            println!("Status:    {}", report.status);

            if !report.mismatches.is_empty() {
                println!(
                    "\n{:<8} {:>12} {:>12} {:>9}",
                    "Month", "Stored", "Reference", "Diff %"
                );
                println!("─────────────────────────────────────────────");
                for m in &report.mismatches {
                    let stored = m
                        .stored
                        .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
                    let diff = m
                        .diff_pct
                        .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
                    println!(
                        "{:<8} {:>12} {:>12.2} {:>9}",
                        m.key.to_string(),
                        stored,
                        m.reference,
                        diff
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}
