//! Terminal and Markdown rendering of screener output and profiles.

use almanac_returns::SeasonalityProfile;
use almanac_screener::{DEFAULT_MONTH_LABELS, ScreenerOutput};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 96;

/// Tabular view of a screener run.
#[derive(Debug, Clone, Copy)]
pub struct ScreenerSummary<'a> {
    output: &'a ScreenerOutput,
}

impl<'a> ScreenerSummary<'a> {
    /// Wrap screener output for rendering.
    pub const fn new(output: &'a ScreenerOutput) -> Self {
        Self { output }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\nScreener: {} of {} matches shown ({} tickers with data)",
            self.output.results.len(),
            self.output.total_matched,
            self.output.total_tickers
        );
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');

        if self.output.results.is_empty() {
            out.push_str("  No results matched the filters.\n");
        } else {
            let _ = writeln!(
                out,
                "{:>4} {:<8} {:<5} {:>4} {:>10} {:>10} {:>8} {:>6} {:>9} {:>9} {:>9}",
                "#", "Ticker", "Month", "Hold", "Avg %", "Avg/Mo %", "Win %", "Years", "Min %",
                "Max %", "Alpha %"
            );
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');

            for (rank, r) in self.output.results.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>4} {:<8} {:<5} {:>3}m {:>10.2} {:>10.2} {:>8.0} {:>6} {:>9.2} {:>9.2} {:>+9.2}",
                    rank + 1,
                    r.ticker,
                    r.month_name,
                    r.holding_period,
                    r.stats.avg_return_pct,
                    r.stats.avg_per_month_pct,
                    r.stats.win_rate_pct,
                    r.stats.sample_years,
                    r.stats.min_return_pct,
                    r.stats.max_return_pct,
                    r.alpha_pct()
                );
            }
        }

        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Seasonality Screener\n\n");
        let _ = writeln!(
            out,
            "**Matched:** {} | **Tickers:** {}\n",
            self.output.total_matched, self.output.total_tickers
        );
        out.push_str("| Ticker | Month | Hold | Avg/Mo % | Win % | Years | Alpha % |\n");
        out.push_str("|--------|-------|------|----------|-------|-------|---------|\n");
        for r in &self.output.results {
            let _ = writeln!(
                out,
                "| {} | {} | {}m | {:.2} | {:.0} | {} | {:.2} |",
                r.ticker,
                r.month_name,
                r.holding_period,
                r.stats.avg_per_month_pct,
                r.stats.win_rate_pct,
                r.stats.sample_years,
                r.alpha_pct()
            );
        }
        out
    }
}

impl fmt::Display for ScreenerSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Screener: {} matched, {} shown, {} tickers",
            self.output.total_matched,
            self.output.results.len(),
            self.output.total_tickers
        )?;
        if let Some(top) = self.output.results.first() {
            writeln!(
                f,
                "  Top: {} {} {}m at {:.2}%/mo",
                top.ticker, top.month_name, top.holding_period, top.stats.avg_per_month_pct
            )?;
        }
        Ok(())
    }
}

/// Month-by-month view of a single ticker's profile.
#[derive(Debug, Clone, Copy)]
pub struct ProfileSummary<'a> {
    profile: &'a SeasonalityProfile,
}

impl<'a> ProfileSummary<'a> {
    /// Wrap a profile for rendering.
    pub const fn new(profile: &'a SeasonalityProfile) -> Self {
        Self { profile }
    }

    fn label(month: u32) -> &'static str {
        (month as usize)
            .checked_sub(1)
            .and_then(|i| DEFAULT_MONTH_LABELS.get(i))
            .copied()
            .unwrap_or("?")
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let p = self.profile;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\nSeasonality: {} ({}m hold, {})",
            p.ticker, p.holding_period, p.calc_method
        );
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        let _ = writeln!(
            out,
            "{:<6} {:>10} {:>10} {:>8} {:>6} {:>12} {:>9}",
            "Month", "Avg %", "Avg/Mo %", "Win %", "Years", "Bench/Mo %", "Alpha %"
        );
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');

        for m in &p.months {
            let bench = m
                .benchmark
                .as_ref()
                .map_or_else(|| "-".to_string(), |b| format!("{:.2}", b.avg_per_month_pct));
            match &m.aggregate {
                Some(a) => {
                    let _ = writeln!(
                        out,
                        "{:<6} {:>10.2} {:>10.2} {:>8.0} {:>6} {:>12} {:>+9.2}",
                        Self::label(m.month),
                        a.avg_return_pct,
                        a.avg_per_month_pct,
                        a.win_rate_pct,
                        a.sample_years,
                        bench,
                        a.alpha_pct.unwrap_or(0.0)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "{:<6} {:>10} {:>10} {:>8} {:>6} {:>12} {:>9}",
                        Self::label(m.month),
                        "-",
                        "-",
                        "-",
                        "-",
                        bench,
                        "-"
                    );
                }
            }
        }

        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        let peer = p
            .peer_month
            .map_or_else(|| "all months".to_string(), |m| Self::label(m).to_string());
        let _ = write!(
            out,
            "Outliers ({peer}): {} of {}",
            p.outlier_count(),
            p.returns.len()
        );
        if !p.bounds.is_unbounded() {
            let _ = write!(
                out,
                ", fences [{:.2}%, {:.2}%]",
                p.bounds.lower_bound, p.bounds.upper_bound
            );
        }
        out.push('\n');

        for r in p.returns.iter().filter(|r| r.is_outlier) {
            let _ = writeln!(
                out,
                "  {} {}: {:+.2}%",
                r.observation.entry_year,
                Self::label(r.observation.entry_month),
                r.observation.return_pct
            );
        }

        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let p = self.profile;
        let mut out = String::new();
        let _ = writeln!(out, "# Seasonality: {}\n", p.ticker);
        let _ = writeln!(
            out,
            "**Holding period:** {} months | **Method:** {}\n",
            p.holding_period, p.calc_method
        );
        out.push_str("| Month | Avg/Mo % | Win % | Years | Alpha % |\n");
        out.push_str("|-------|----------|-------|-------|---------|\n");
        for m in &p.months {
            match &m.aggregate {
                Some(a) => {
                    let _ = writeln!(
                        out,
                        "| {} | {:.2} | {:.0} | {} | {:.2} |",
                        Self::label(m.month),
                        a.avg_per_month_pct,
                        a.win_rate_pct,
                        a.sample_years,
                        a.alpha_pct.unwrap_or(0.0)
                    );
                }
                None => {
                    let _ = writeln!(out, "| {} | - | - | - | - |", Self::label(m.month));
                }
            }
        }
        out
    }
}

impl fmt::Display for ProfileSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.profile;
        writeln!(f, "Seasonality: {} ({}m, {})", p.ticker, p.holding_period, p.calc_method)?;
        if let Some(best) = p.best_month()
            && let Some(a) = &best.aggregate
        {
            writeln!(
                f,
                "  Best month: {} at {:.2}%/mo ({:.0}% wins over {} years)",
                Self::label(best.month),
                a.avg_per_month_pct,
                a.win_rate_pct,
                a.sample_years
            )?;
        }
        writeln!(f, "  Outliers: {}", p.outlier_count())?;
        Ok(())
    }
}
