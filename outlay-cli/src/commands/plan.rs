//! Plan commands - generate and browse budget plans

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

use super::{display_currency, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a budget plan from a total amount using the configured
    /// category weights
    Generate {
        /// Total amount to distribute
        total: Decimal,
        /// Plan name (month names and years in the name drive grouping,
        /// e.g. "May 2025 Budget")
        name: String,
    },

    /// List generated plans grouped by month
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: PlanCommands) -> Result<()> {
    match command {
        PlanCommands::Generate { total, name } => generate(total, &name),
        PlanCommands::List { json } => list(json),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn generate(total: Decimal, name: &str) -> Result<()> {
    let ctx = get_context()?;
    let weights = ctx.allocation_service.weights()?;

    let bar = spinner("Generating budget plan...");
    let result = ctx.allocation_service.generate_plan(total, name, &weights);
    bar.finish_and_clear();

    let plan = result?;

    let currency = display_currency(&ctx);
    let mut table = output::create_table();
    table.set_header(vec!["Category", "Amount"]);
    for allocation in &plan.allocations {
        table.add_row(vec![
            allocation.category.display_name().to_string(),
            output::format_money(allocation.amount, &currency),
        ]);
    }
    println!("{table}");
    println!("Plan ID: {}", plan.plan_id);

    Ok(())
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let budgets = ctx.budget_service.list()?;
    let buckets = ctx.allocation_service.plans_by_month(&budgets);

    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    if buckets.is_empty() {
        output::info("No budget plans yet. Use 'ol plan generate' to create one.");
        return Ok(());
    }

    let currency = display_currency(&ctx);
    for bucket in &buckets {
        println!();
        output::info(&bucket.label);
        for plan in &bucket.plans {
            println!(
                "  {} - {} ({} budgets)",
                plan.name,
                output::format_money(plan.total, &currency),
                plan.budgets.len()
            );
            for budget in &plan.budgets {
                println!(
                    "    {:<20} {}",
                    budget.category.display_name(),
                    output::format_money(budget.amount, &currency)
                );
            }
        }
    }

    Ok(())
}
