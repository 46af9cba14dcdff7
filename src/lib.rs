//! goalstash - Terminal savings-goal tracker
//!
//! This library provides the core functionality for the goalstash
//! application: savings goals, the deposits and withdrawals made towards
//! them, and a versioned JSON/CSV backup format that older backups are
//! upgraded from on restore.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (goals, transactions, ids)
//! - `storage`: JSON file storage layer
//! - `exchange`: Backup payload format, CSV/JSON codecs and schema migrations
//! - `services`: Business logic layer
//! - `backup`: Backup creation, retention and restore
//! - `cli`, `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use goalstash::config::{paths::AppPaths, settings::Settings};
//!
//! let paths = AppPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod exchange;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{GoalStashError, GoalStashResult};
