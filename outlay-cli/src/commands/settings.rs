//! Settings commands - local preferences

use anyhow::{anyhow, Result};
use clap::Subcommand;
use rust_decimal::Decimal;

use outlay_core::ports::{keys, KeyValueStore};
use outlay_core::services::CategoryWeight;
use outlay_core::Category;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show or set the preferred display currency
    Currency {
        /// Currency code to set (e.g. USD, EUR); omit to show
        code: Option<String>,
    },

    /// Manage budget category weights for plan generation
    Weights {
        #[command(subcommand)]
        command: WeightsCommands,
    },
}

#[derive(Subcommand)]
pub enum WeightsCommands {
    /// Show the weight table
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a category's percentage
    Set {
        /// Category (food, utilities, ...)
        category: String,
        /// Percentage (weights are normalized, so they need not sum to 100)
        percentage: Decimal,
    },

    /// Include a category in plan generation
    Enable { category: String },

    /// Exclude a category from plan generation
    Disable { category: String },
}

pub fn run(command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Currency { code } => currency(code),
        SettingsCommands::Weights { command } => weights(command),
    }
}

fn currency(code: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    match code {
        Some(code) => {
            let code = code.to_uppercase();
            ctx.store.set(keys::DEFAULT_CURRENCY, &code)?;
            output::success(&format!("Default currency updated to {}", code));
        }
        None => {
            let current = ctx
                .store
                .get(keys::DEFAULT_CURRENCY)?
                .unwrap_or_else(|| "USD".to_string());
            println!("{}", current);
        }
    }
    Ok(())
}

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).ok_or_else(|| anyhow!("Unknown category: {}", s))
}

fn weights(command: WeightsCommands) -> Result<()> {
    let ctx = get_context()?;
    let mut weights = ctx.allocation_service.weights()?;

    match command {
        WeightsCommands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&weights)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Category", "Enabled", "Percentage"]);
            for (category, weight) in &weights {
                table.add_row(vec![
                    category.display_name().to_string(),
                    if weight.enabled { "yes" } else { "no" }.to_string(),
                    format!("{}%", weight.percentage),
                ]);
            }
            println!("{table}");
        }
        WeightsCommands::Set {
            category,
            percentage,
        } => {
            let category = parse_category(&category)?;
            let entry = weights.entry(category).or_insert(CategoryWeight {
                enabled: true,
                percentage: Decimal::ZERO,
            });
            entry.percentage = percentage;
            ctx.allocation_service.save_weights(&weights)?;
            output::success(&format!(
                "{} set to {}%",
                category.display_name(),
                percentage
            ));
        }
        WeightsCommands::Enable { category } => {
            let category = parse_category(&category)?;
            let entry = weights.entry(category).or_insert(CategoryWeight {
                enabled: false,
                percentage: Decimal::ZERO,
            });
            entry.enabled = true;
            ctx.allocation_service.save_weights(&weights)?;
            output::success(&format!("{} enabled", category.display_name()));
        }
        WeightsCommands::Disable { category } => {
            let category = parse_category(&category)?;
            let entry = weights.entry(category).or_insert(CategoryWeight {
                enabled: true,
                percentage: Decimal::ZERO,
            });
            entry.enabled = false;
            ctx.allocation_service.save_weights(&weights)?;
            output::success(&format!("{} disabled", category.display_name()));
        }
    }

    Ok(())
}
