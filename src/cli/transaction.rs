//! Transaction CLI commands
//!
//! Implements CLI commands for recording deposits and withdrawals.

use clap::Subcommand;

use super::goal::parse_local_date;
use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_register, format_transaction_short};
use crate::error::{GoalStashError, GoalStashResult};
use crate::models::{GoalId, TransactionId};
use crate::services::GoalService;
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TxnCommands {
    /// Put money towards a goal
    Deposit {
        /// Goal title or ID
        goal: String,
        /// Amount deposited
        amount: f64,
        /// Notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Transaction date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Take money out of a goal
    Withdraw {
        /// Goal title or ID
        goal: String,
        /// Amount withdrawn
        amount: f64,
        /// Notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Transaction date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List a goal's transactions
    List {
        /// Goal title or ID
        goal: String,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID (e.g. 12 or txn-12)
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TxnCommands,
) -> GoalStashResult<()> {
    let service = GoalService::new(storage);

    match cmd {
        TxnCommands::Deposit {
            goal,
            amount,
            notes,
            date,
        } => {
            let found = service.resolve(&goal)?;
            let timestamp = date.as_deref().map(parse_local_date).transpose()?;
            let txn = service.deposit(found.id, amount, &notes, timestamp)?;

            println!("Recorded: {}", format_transaction_short(&txn, settings));
            print_balance(&service, found.id, settings)?;
        }

        TxnCommands::Withdraw {
            goal,
            amount,
            notes,
            date,
        } => {
            let found = service.resolve(&goal)?;
            let timestamp = date.as_deref().map(parse_local_date).transpose()?;
            let txn = service.withdraw(found.id, amount, &notes, timestamp)?;

            println!("Recorded: {}", format_transaction_short(&txn, settings));
            print_balance(&service, found.id, settings)?;
        }

        TxnCommands::List { goal } => {
            let found = service.resolve(&goal)?;
            let aggregate = service.get_with_transactions(found.id)?;

            println!("Goal: {}", aggregate.goal.title);
            print!(
                "{}",
                format_transaction_register(&aggregate.transactions, settings)
            );
        }

        TxnCommands::Delete { id } => {
            let id: TransactionId = id.parse().map_err(|_| {
                GoalStashError::Validation(format!(
                    "Invalid transaction ID: '{}'",
                    id
                ))
            })?;

            let txn = service.delete_transaction(id)?;
            println!("Deleted: {}", format_transaction_short(&txn, settings));
        }
    }

    Ok(())
}

fn print_balance(
    service: &GoalService<'_>,
    id: GoalId,
    settings: &Settings,
) -> GoalStashResult<()> {
    let aggregate = service.get_with_transactions(id)?;
    println!(
        "Saved for '{}': {} of {}",
        aggregate.goal.title,
        settings.format_amount(aggregate.saved_amount()),
        settings.format_amount(aggregate.goal.target_amount)
    );
    Ok(())
}
