//! Service layer for goalstash
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, computed fields, and cross-entity operations.

pub mod goal;
pub mod progress;

pub use goal::{GoalEdit, GoalService, NewGoal};
pub use progress::{GoalProgress, SavingSuggestion};
