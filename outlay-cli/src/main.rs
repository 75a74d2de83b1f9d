//! Outlay CLI - expense tracking in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod notify;
mod output;

use commands::{auth, budget, document, expense, plan, report, settings, team};

/// Outlay - expense tracking in your terminal
#[derive(Parser)]
#[command(name = "ol", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the backend
    Login {
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Create a new account
    Register {
        /// Display name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Log out and clear the local session
    Logout,

    /// Show the current session
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage expenses
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCommands,
    },

    /// Manage budgets
    Budget {
        #[command(subcommand)]
        command: budget::BudgetCommands,
    },

    /// Generate and browse budget plans
    Plan {
        #[command(subcommand)]
        command: plan::PlanCommands,
    },

    /// Manage documents
    Document {
        #[command(subcommand)]
        command: document::DocumentCommands,
    },

    /// Manage team members
    Team {
        #[command(subcommand)]
        command: team::TeamCommands,
    },

    /// Fetch the expense report for a date range
    Report {
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Local preferences (currency, category weights)
    Settings {
        #[command(subcommand)]
        command: settings::SettingsCommands,
    },
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email } => auth::login(email),
        Commands::Register { name, email } => auth::register(name, email),
        Commands::Logout => auth::logout(),
        Commands::Whoami { json } => auth::whoami(json),
        Commands::Expense { command } => expense::run(command),
        Commands::Budget { command } => budget::run(command),
        Commands::Plan { command } => plan::run(command),
        Commands::Document { command } => document::run(command),
        Commands::Team { command } => team::run(command),
        Commands::Report { start, end, json } => report::run(&start, &end, json),
        Commands::Settings { command } => settings::run(command),
    }
}
