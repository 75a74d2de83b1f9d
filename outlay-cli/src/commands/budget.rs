//! Budget commands - standalone budget CRUD

use anyhow::{anyhow, Result};
use clap::Subcommand;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use outlay_core::{Category, NewBudget, Period};

use super::{display_currency, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// List all budgets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a standalone budget
    Add {
        /// Budget name
        name: String,
        /// Budgeted amount
        amount: Decimal,
        /// Category (food, transportation, utilities, ...)
        #[arg(long, default_value = "other")]
        category: String,
        /// Period (weekly, monthly, quarterly, yearly)
        #[arg(long, default_value = "monthly")]
        period: String,
    },

    /// Remove a budget
    Rm {
        /// Budget ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Remove ALL budgets
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: BudgetCommands) -> Result<()> {
    match command {
        BudgetCommands::List { json } => list(json),
        BudgetCommands::Add {
            name,
            amount,
            category,
            period,
        } => add(name, amount, &category, &period),
        BudgetCommands::Rm { id, force } => remove(&id, force),
        BudgetCommands::Clear { force } => clear(force),
    }
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let budgets = ctx.budget_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&budgets)?);
        return Ok(());
    }

    if budgets.is_empty() {
        output::info("No budgets yet. Use 'ol budget add' or 'ol plan generate'.");
        return Ok(());
    }

    let currency = display_currency(&ctx);
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Category", "Period", "Plan", "Amount"]);
    for budget in &budgets {
        table.add_row(vec![
            budget.id.clone(),
            budget.name.clone(),
            budget.category.display_name().to_string(),
            budget.period.as_str().to_string(),
            budget.plan_name.clone().unwrap_or_default(),
            output::format_money(budget.amount, &currency),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn add(name: String, amount: Decimal, category: &str, period: &str) -> Result<()> {
    let ctx = get_context()?;

    let budget = NewBudget {
        name,
        amount,
        category: Category::parse(category).ok_or_else(|| anyhow!("Unknown category: {}", category))?,
        period: Period::parse(period).ok_or_else(|| anyhow!("Unknown period: {}", period))?,
        plan_id: None,
        plan_name: None,
    };

    let created = ctx.budget_service.create(&budget)?;
    output::success(&format!("Budget created successfully ({})", created.id));
    Ok(())
}

fn remove(id: &str, force: bool) -> Result<()> {
    if !force
        && !Confirm::new()
            .with_prompt("Are you sure you want to delete this budget?")
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    let ctx = get_context()?;
    ctx.budget_service.delete(id)?;
    output::success("Budget deleted successfully");
    Ok(())
}

fn clear(force: bool) -> Result<()> {
    if !force
        && !Confirm::new()
            .with_prompt("Delete ALL budgets? This action cannot be undone.")
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    let ctx = get_context()?;
    let deleted = ctx.budget_service.delete_all()?;
    output::success(&format!("Deleted {} budgets", deleted));
    Ok(())
}
