//! Screener behavior over a CSV-loaded universe.

use almanac_data::{PriceIndex, loader::read_records};
use almanac_returns::CalcMethod;
use almanac_screener::{
    MAX_HOLDING_PERIOD, ScreenerConfig, ScreenerError, ScreenerParams, screen,
};
use approx::assert_relative_eq;

/// Two years of October→January data: WMT gains 6 % over three months each
/// year, SPY and DIA gain 2.4 %.
const PRICES: &str = "\
ticker,year,month,open_first,close_last,close_max
WMT,2022,10,100,101,102
WMT,2023,1,104,106,106
WMT,2023,10,100,101,102
WMT,2024,1,104,106,106
SPY,2022,10,100,101,101
SPY,2023,1,101,102.4,102.4
SPY,2023,10,100,101,101
SPY,2024,1,101,102.4,102.4
DIA,2022,10,100,101,101
DIA,2023,1,101,102.4,102.4
DIA,2023,10,100,101,101
DIA,2024,1,101,102.4,102.4
";

fn prices() -> PriceIndex {
    PriceIndex::from_records(read_records(PRICES.as_bytes()).unwrap())
}

#[test]
fn test_screen_from_params() {
    let params = ScreenerParams {
        periods: Some("3".into()),
        calc_method: Some("openToClose".into()),
        min_sample_years: Some("2".into()),
        ..Default::default()
    };
    let config = ScreenerConfig {
        current_year: Some(2024),
        ..ScreenerConfig::try_from(params).unwrap()
    };
    assert_eq!(config.calc_method, CalcMethod::OpenToClose);

    let universe = vec!["WMT".to_string(), "SPY".to_string(), "DIA".to_string()];
    let output = screen(&universe, &prices(), &config).unwrap();

    assert_eq!(output.total_tickers, 1);
    assert_eq!(output.total_matched, 1);

    let oct = &output.results[0];
    assert_eq!((oct.ticker.as_str(), oct.month, oct.holding_period), ("WMT", 10, 3));
    assert_eq!(oct.month_name, "Oct");
    // 6 % over four calendar months
    assert_relative_eq!(oct.stats.avg_per_month_pct, 1.5);
    // Benchmark 2.4 % / 4 = 0.6
    let bench = oct.benchmark.as_ref().unwrap();
    assert_relative_eq!(bench.avg_per_month_pct, 0.6);
    assert_relative_eq!(oct.alpha_pct(), 0.9, epsilon = 1e-9);
    assert_relative_eq!(oct.stats.win_rate_pct, 100.0);
    assert_eq!(oct.stats.sample_years, 2);
}

#[test]
fn test_min_sample_years_filters_everything() {
    let config = ScreenerConfig {
        holding_periods: vec![3],
        min_sample_years: 3,
        current_year: Some(2024),
        ..Default::default()
    };
    let output = screen(&["WMT".to_string()], &prices(), &config).unwrap();
    assert_eq!(output.total_tickers, 1);
    assert_eq!(output.total_matched, 0);
    assert!(output.results.is_empty());
}

#[test]
fn test_huge_holding_period_rejected() {
    let params = ScreenerParams {
        periods: Some("4294967295".into()),
        ..Default::default()
    };
    assert!(matches!(
        ScreenerConfig::try_from(params),
        Err(ScreenerError::InvalidConfiguration(_))
    ));

    let config = ScreenerConfig {
        holding_periods: vec![u32::MAX],
        current_year: Some(2024),
        ..Default::default()
    };
    assert!(matches!(
        screen(&["WMT".to_string()], &prices(), &config),
        Err(ScreenerError::InvalidConfiguration(_))
    ));

    // Longest accepted period runs past the data and matches nothing.
    let config = ScreenerConfig {
        holding_periods: vec![MAX_HOLDING_PERIOD],
        min_sample_years: 1,
        current_year: Some(2024),
        ..Default::default()
    };
    let output = screen(&["WMT".to_string()], &prices(), &config).unwrap();
    assert_eq!(output.total_matched, 0);
}

#[test]
fn test_huge_lookback_rejected() {
    let config = ScreenerConfig {
        holding_periods: vec![3],
        lookback_years: u32::MAX,
        current_year: Some(2024),
        ..Default::default()
    };
    assert!(matches!(
        screen(&["WMT".to_string()], &prices(), &config),
        Err(ScreenerError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_output_json_shape() {
    let config = ScreenerConfig {
        holding_periods: vec![3],
        current_year: Some(2024),
        ..Default::default()
    };
    let output = screen(&["wmt".to_string()], &prices(), &config).unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["totalMatched"], 1);
    assert_eq!(json["results"][0]["ticker"], "WMT");
    assert_eq!(json["results"][0]["monthName"], "Oct");
    assert_eq!(json["results"][0]["benchmark"]["sampleYears"], 2);
}
