//! Expense commands

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use outlay_core::{Category, NewExpense};

use super::{display_currency, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List all expenses
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an expense
    Add {
        /// What the money went to
        description: String,
        /// Amount spent
        amount: Decimal,
        /// Category (food, transportation, utilities, ...)
        #[arg(long, default_value = "other")]
        category: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Remove an expense
    Rm {
        /// Expense ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: ExpenseCommands) -> Result<()> {
    match command {
        ExpenseCommands::List { json } => list(json),
        ExpenseCommands::Add {
            description,
            amount,
            category,
            date,
        } => add(description, amount, &category, date),
        ExpenseCommands::Edit {
            id,
            description,
            amount,
            category,
            date,
        } => edit(&id, description, amount, category, date),
        ExpenseCommands::Rm { id, force } => remove(&id, force),
    }
}

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).ok_or_else(|| anyhow!("Unknown category: {}", s))
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let expenses = ctx.expense_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    if expenses.is_empty() {
        output::info("No expenses recorded yet. Use 'ol expense add' to create one.");
        return Ok(());
    }

    let currency = display_currency(&ctx);
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Amount"]);
    let mut total = Decimal::ZERO;
    for expense in &expenses {
        total += expense.amount;
        table.add_row(vec![
            expense.id.clone(),
            expense.date.to_string(),
            expense.description.clone(),
            expense.category.display_name().to_string(),
            output::format_money(expense.amount, &currency),
        ]);
    }
    println!("{table}");
    println!("Total: {}", output::format_money(total, &currency));

    Ok(())
}

fn add(description: String, amount: Decimal, category: &str, date: Option<NaiveDate>) -> Result<()> {
    let ctx = get_context()?;

    let expense = NewExpense {
        description,
        amount,
        category: parse_category(category)?,
        date: date.unwrap_or_else(|| Utc::now().naive_utc().date()),
    };

    let created = ctx.expense_service.create(&expense)?;
    output::success(&format!("Expense added successfully ({})", created.id));
    Ok(())
}

fn edit(
    id: &str,
    description: Option<String>,
    amount: Option<Decimal>,
    category: Option<String>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let ctx = get_context()?;

    // Fetch the current record and overlay the provided fields
    let current = ctx.expense_service.get(id)?;
    let update = NewExpense {
        description: description.unwrap_or(current.description),
        amount: amount.unwrap_or(current.amount),
        category: match category {
            Some(s) => parse_category(&s)?,
            None => current.category,
        },
        date: date.unwrap_or(current.date),
    };

    ctx.expense_service.update(id, &update)?;
    output::success("Expense updated successfully");
    Ok(())
}

fn remove(id: &str, force: bool) -> Result<()> {
    if !force
        && !Confirm::new()
            .with_prompt("Are you sure you want to delete this expense?")
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    let ctx = get_context()?;
    ctx.expense_service.delete(id)?;
    output::success("Expense deleted successfully");
    Ok(())
}
