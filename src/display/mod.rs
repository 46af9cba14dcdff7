//! Display formatting for terminal output
//!
//! Provides utilities for formatting goals and transactions for terminal
//! display as tables and detail views.

pub mod goal;
pub mod transaction;

pub use goal::{format_goal_details, format_goal_list};
pub use transaction::{format_date, format_transaction_register, format_transaction_short};
