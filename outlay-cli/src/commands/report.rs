//! Report command - aggregate figures for a date range

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use super::{display_currency, get_context};
use crate::output;

pub fn run(start: &str, end: &str, json: bool) -> Result<()> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("Invalid start date: {}", start))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .with_context(|| format!("Invalid end date: {}", end))?;

    let ctx = get_context()?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    bar.set_message("Fetching report...");
    bar.enable_steady_tick(Duration::from_millis(100));
    let result = ctx.report_service.get_report(start, end);
    bar.finish_and_clear();

    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let currency = display_currency(&ctx);
    println!(
        "Report {} to {}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    );
    println!(
        "Total expenses: {}",
        output::format_money(report.total_expenses, &currency)
    );

    if !report.expenses_by_category.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Spent"]);
        for entry in &report.expenses_by_category {
            table.add_row(vec![
                entry.category.display_name().to_string(),
                output::format_money(entry.total, &currency),
            ]);
        }
        println!("{table}");
    }

    if !report.budget_comparison.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Budgeted", "Spent", "Remaining"]);
        for entry in &report.budget_comparison {
            table.add_row(vec![
                entry.category.display_name().to_string(),
                output::format_money(entry.budgeted, &currency),
                output::format_money(entry.spent, &currency),
                output::format_money(entry.budgeted - entry.spent, &currency),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
