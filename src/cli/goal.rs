//! Goal CLI commands
//!
//! Implements CLI commands for goal management.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, TimeZone};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::goal::{format_goal_details, format_goal_list};
use crate::error::{GoalStashError, GoalStashResult};
use crate::models::{GoalImage, GoalPriority};
use crate::services::progress::GoalProgress;
use crate::services::{GoalEdit, GoalService, NewGoal};
use crate::storage::Storage;

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new goal
    Add {
        /// Goal title
        title: String,
        /// Amount to save
        target: f64,
        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: Option<String>,
        /// Priority (high, normal, low)
        #[arg(short, long, default_value = "normal", value_parser = parse_priority)]
        priority: GoalPriority,
        /// Remind me about this goal
        #[arg(short, long)]
        reminder: bool,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Path to a PNG image
        #[arg(long)]
        image: Option<PathBuf>,
        /// Notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// List goals
    List {
        /// Show archived goals
        #[arg(short, long)]
        all: bool,
    },
    /// Show goal details and progress
    Show {
        /// Goal title or ID
        goal: String,
    },
    /// Edit a goal
    Edit {
        /// Goal title or ID
        goal: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New target amount
        #[arg(long)]
        target: Option<f64>,
        /// New deadline (YYYY-MM-DD, or "none" to clear)
        #[arg(short, long)]
        deadline: Option<String>,
        /// New priority (high, normal, low)
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<GoalPriority>,
        /// Turn the reminder on or off
        #[arg(long)]
        reminder: Option<bool>,
        /// New icon name ("none" to clear)
        #[arg(long)]
        icon: Option<String>,
        /// Path to a new PNG image ("none" to clear)
        #[arg(long)]
        image: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Archive a goal
    Archive {
        /// Goal title or ID
        goal: String,
    },
    /// Unarchive a goal
    Unarchive {
        /// Goal title or ID
        goal: String,
    },
    /// Delete a goal and its transactions
    Delete {
        /// Goal title or ID
        goal: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GoalCommands,
) -> GoalStashResult<()> {
    let service = GoalService::new(storage);

    match cmd {
        GoalCommands::Add {
            title,
            target,
            deadline,
            priority,
            reminder,
            icon,
            image,
            notes,
        } => {
            let deadline = match deadline {
                Some(date) => parse_deadline(&date)?,
                None => 0,
            };
            let goal_image = image.map(|path| read_image(&path)).transpose()?;

            let goal = service.create(NewGoal {
                title,
                target_amount: target,
                deadline,
                priority,
                reminder,
                goal_icon_id: icon,
                additional_notes: notes,
                goal_image,
            })?;

            println!("Created goal: {}", goal.title);
            println!("  Target: {}", settings.format_amount(goal.target_amount));
            println!("  Priority: {}", goal.priority);
            println!("  ID: {}", goal.id);
        }

        GoalCommands::List { all } => {
            let goals = service.list(all)?;
            print!("{}", format_goal_list(&goals, settings));
        }

        GoalCommands::Show { goal } => {
            let found = service.resolve(&goal)?;
            let aggregate = service.get_with_transactions(found.id)?;
            let progress = GoalProgress::calculate(&aggregate, &Local::now());
            print!("{}", format_goal_details(&aggregate, &progress, settings));
        }

        GoalCommands::Edit {
            goal,
            title,
            target,
            deadline,
            priority,
            reminder,
            icon,
            image,
            notes,
        } => {
            let found = service.resolve(&goal)?;

            let edit = GoalEdit {
                title,
                target_amount: target,
                deadline: deadline.as_deref().map(parse_deadline).transpose()?,
                priority,
                reminder,
                goal_icon_id: icon.map(|icon| clearable(&icon).map(str::to_string)),
                additional_notes: notes,
                goal_image: image
                    .as_deref()
                    .map(|image| clearable(image).map(|p| read_image(Path::new(p))).transpose())
                    .transpose()?,
            };

            if edit.is_empty() {
                println!("No changes specified. Run 'goalstash goal edit --help' for options.");
                return Ok(());
            }

            let updated = service.edit(found.id, edit)?;
            println!("Updated goal: {}", updated.title);
        }

        GoalCommands::Archive { goal } => {
            let found = service.resolve(&goal)?;
            let archived = service.set_archived(found.id, true)?;
            println!("Archived goal: {}", archived.title);
        }

        GoalCommands::Unarchive { goal } => {
            let found = service.resolve(&goal)?;
            let unarchived = service.set_archived(found.id, false)?;
            println!("Unarchived goal: {}", unarchived.title);
        }

        GoalCommands::Delete { goal, force } => {
            let found = service.resolve(&goal)?;

            if !force {
                let count = storage.transactions.get_by_goal(found.id)?.len();
                println!(
                    "This will delete '{}' and its {} transaction(s).",
                    found.title, count
                );
                println!("To proceed, run again with --force flag:");
                println!("  goalstash goal delete {} --force", found.id.value());
                return Ok(());
            }

            let (deleted, removed) = service.delete(found.id)?;
            println!(
                "Deleted goal: {} ({} transaction(s) removed)",
                deleted.title, removed
            );
        }
    }

    Ok(())
}

/// Parse a priority name, ignoring case
pub fn parse_priority(s: &str) -> Result<GoalPriority, String> {
    match s.to_ascii_lowercase().as_str() {
        "high" => Ok(GoalPriority::High),
        "normal" => Ok(GoalPriority::Normal),
        "low" => Ok(GoalPriority::Low),
        _ => Err(format!(
            "invalid priority '{}' (expected high, normal or low)",
            s
        )),
    }
}

/// Parse a `YYYY-MM-DD` date into local-midnight epoch milliseconds
///
/// `none` yields 0, the "no deadline" value.
pub fn parse_deadline(s: &str) -> GoalStashResult<i64> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(0);
    }
    parse_local_date(s)
}

/// Parse a `YYYY-MM-DD` date into local-midnight epoch milliseconds
pub fn parse_local_date(s: &str) -> GoalStashResult<i64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        GoalStashError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s))
    })?;

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        GoalStashError::Validation(format!("Invalid date '{}'", s))
    })?;

    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| GoalStashError::Validation(format!("Date '{}' does not exist locally", s)))
}

/// `None` when the argument asks to clear a field
fn clearable(value: &str) -> Option<&str> {
    if value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value)
    }
}

fn read_image(path: &Path) -> GoalStashResult<GoalImage> {
    let bytes = fs::read(path).map_err(|e| {
        GoalStashError::Io(format!("Failed to read image {}: {}", path.display(), e))
    })?;
    Ok(GoalImage::from_bytes(bytes))
}
