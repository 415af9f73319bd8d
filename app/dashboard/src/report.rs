//! FILENAME: app/dashboard/src/report.rs
//! PURPOSE: Render a summary bundle as a terminal report or as JSON.
//! CONTEXT: Sections follow the published dashboard layout: daily sales
//! with headline metrics, best and worst product categories, customer
//! demographics, then orders by location.

use std::fmt;

use serde::Serialize;

use dataset::DateRange;
use summary_engine::{DailyOrders, GroupCount, Headline, SummaryBundle};

use crate::config::DEFAULT_TOP_N;
use crate::format::{format_count, format_currency, CurrencyStyle};

pub const REPORT_TITLE: &str = "E-Commerce Public Dashboard";
const CAPTION: &str = "Copyright (c) E-Commerce-Public 2024";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Rows in each ranked section.
    pub top_n: usize,
    pub currency: CurrencyStyle,
    /// Width of the longest bar in the daily chart, in characters.
    pub chart_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            top_n: DEFAULT_TOP_N,
            currency: CurrencyStyle::default(),
            chart_width: 40,
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// A summary bundle paired with display options. Implements `Display`.
pub struct TextReport<'a> {
    bundle: &'a SummaryBundle,
    options: &'a ReportOptions,
}

impl<'a> TextReport<'a> {
    pub fn new(bundle: &'a SummaryBundle, options: &'a ReportOptions) -> Self {
        TextReport { bundle, options }
    }

    fn write_daily(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headline = self.bundle.headline();
        let currency = &self.options.currency;

        writeln!(f, "Daily Sales")?;
        writeln!(f, "  Total orders:  {}", format_count(headline.total_orders, currency))?;
        writeln!(f, "  Total revenue: {}", format_currency(headline.total_revenue, currency))?;
        writeln!(f)?;

        if self.bundle.daily_orders.is_empty() {
            return writeln!(f, "  (no days in range)");
        }

        let max = self
            .bundle
            .daily_orders
            .iter()
            .map(|d| d.order_count)
            .max()
            .unwrap_or(0);
        for day in &self.bundle.daily_orders {
            let bar = "#".repeat(bar_length(day.order_count, max, self.options.chart_width));
            writeln!(
                f,
                "  {} |{:<width$} {}",
                day.date,
                bar,
                format_count(day.order_count, currency),
                width = self.options.chart_width
            )?;
        }
        Ok(())
    }

    fn write_ranking(&self, f: &mut fmt::Formatter<'_>, title: &str, rows: &[GroupCount]) -> fmt::Result {
        writeln!(f, "{}", title)?;
        if rows.is_empty() {
            return writeln!(f, "  (none)");
        }
        let key_width = rows.iter().map(|r| r.key.chars().count()).max().unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            writeln!(
                f,
                "  {:>2}. {:<key_width$}  {}",
                i + 1,
                row.key,
                format_count(row.count, &self.options.currency),
                key_width = key_width
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bundle = self.bundle;
        let n = self.options.top_n;

        writeln!(f, "{}", REPORT_TITLE)?;
        writeln!(f, "{}", "=".repeat(REPORT_TITLE.len()))?;
        writeln!(f, "Purchase dates: {}", describe_range(&bundle.range))?;
        writeln!(f)?;

        self.write_daily(f)?;
        writeln!(f)?;

        writeln!(f, "Best & Worst Performing Product Categories")?;
        self.write_ranking(f, "Best performing", &bundle.best_categories(n))?;
        self.write_ranking(f, "Worst performing", &bundle.worst_categories(n))?;
        writeln!(f)?;

        writeln!(f, "Customer Demographics")?;
        self.write_ranking(f, "Customers by city", &bundle.top_cities_by_customers(n))?;
        self.write_ranking(f, "Customers by state", &bundle.top_states_by_customers(n))?;
        writeln!(f)?;

        writeln!(f, "Orders by Location")?;
        self.write_ranking(f, "Orders by city", &bundle.top_cities_by_orders(n))?;
        self.write_ranking(f, "Orders by state", &bundle.top_states_by_orders(n))?;
        writeln!(f)?;

        writeln!(f, "{}", CAPTION)
    }
}

pub fn render_text(bundle: &SummaryBundle, options: &ReportOptions) -> String {
    TextReport::new(bundle, options).to_string()
}

fn describe_range(range: &DateRange) -> String {
    if range.is_empty() {
        format!("{} (empty range)", range)
    } else {
        format!("{} to {} ({} days)", range.start, range.end, range.day_count())
    }
}

/// Bar length for `count` scaled so `max` fills `width`. Any non-zero count
/// gets at least one character.
fn bar_length(count: u64, max: u64, width: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as u128 * width as u128).div_ceil(max as u128);
    scaled.min(width as u128) as usize
}

// ============================================================================
// JSON
// ============================================================================

/// Machine-readable report: the headline, the full daily table and the
/// ranked windows the text report shows.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub range: DateRange,
    pub headline: Headline,
    pub daily_orders: &'a [DailyOrders],
    pub best_categories: Vec<GroupCount>,
    pub worst_categories: Vec<GroupCount>,
    pub customers_by_city: Vec<GroupCount>,
    pub customers_by_state: Vec<GroupCount>,
    pub orders_by_city: Vec<GroupCount>,
    pub orders_by_state: Vec<GroupCount>,
}

impl<'a> JsonReport<'a> {
    pub fn new(bundle: &'a SummaryBundle, top_n: usize) -> Self {
        JsonReport {
            range: bundle.range,
            headline: bundle.headline(),
            daily_orders: &bundle.daily_orders,
            best_categories: bundle.best_categories(top_n),
            worst_categories: bundle.worst_categories(top_n),
            customers_by_city: bundle.top_cities_by_customers(top_n),
            customers_by_state: bundle.top_states_by_customers(top_n),
            orders_by_city: bundle.top_cities_by_orders(top_n),
            orders_by_state: bundle.top_states_by_orders(top_n),
        }
    }
}
