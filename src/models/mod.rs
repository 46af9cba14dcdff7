//! Core data models for goalstash
//!
//! This module contains the data structures of the savings domain: goals,
//! the transactions recorded against them, and the goal-with-transactions
//! aggregate that backups are made of.

pub mod aggregate;
pub mod goal;
pub mod ids;
pub mod image;
pub mod transaction;

pub use aggregate::GoalWithTransactions;
pub use goal::{Goal, GoalPriority, GoalValidationError};
pub use ids::{GoalId, TransactionId};
pub use image::GoalImage;
pub use transaction::{Transaction, TransactionType};
