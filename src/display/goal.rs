//! Goal display formatting
//!
//! Formats goals for terminal output in table and detail views.

use chrono::Local;

use super::transaction::format_date;
use crate::config::settings::Settings;
use crate::models::GoalWithTransactions;
use crate::services::progress::GoalProgress;

/// Format a list of goals with their saved amounts as a table
pub fn format_goal_list(goals: &[GoalWithTransactions], settings: &Settings) -> String {
    if goals.is_empty() {
        return "No goals found.".to_string();
    }

    let title_width = goals
        .iter()
        .map(|g| g.goal.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<title_width$}  {:>12}  {:>12}  {:>5}  {:<12}  {}\n",
        "ID",
        "Title",
        "Saved",
        "Target",
        "%",
        "Deadline",
        "Status",
        title_width = title_width,
    ));

    output.push_str(&format!(
        "{:-<8}  {:-<title_width$}  {:->12}  {:->12}  {:->5}  {:-<12}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        title_width = title_width,
    ));

    for aggregate in goals {
        let goal = &aggregate.goal;
        let progress = GoalProgress::calculate(aggregate, &Local::now());

        let deadline = if goal.has_deadline() {
            format_date(goal.deadline, &Local, &settings.date_format)
        } else {
            "-".to_string()
        };

        let status = if goal.archived {
            "Archived"
        } else if progress.achieved {
            "Achieved"
        } else if progress.days_left.is_some_and(|d| d < 0) {
            "Overdue"
        } else {
            ""
        };

        output.push_str(&format!(
            "{:<8}  {:<title_width$}  {:>12}  {:>12}  {:>4}%  {:<12}  {}\n",
            goal.id.to_string(),
            goal.title,
            settings.format_amount(progress.saved),
            settings.format_amount(goal.target_amount),
            progress.percent,
            deadline,
            status,
            title_width = title_width,
        ));
    }

    output
}

/// Format a single goal's details with its progress
pub fn format_goal_details(
    aggregate: &GoalWithTransactions,
    progress: &GoalProgress,
    settings: &Settings,
) -> String {
    let goal = &aggregate.goal;
    let mut output = String::new();

    output.push_str(&format!("Goal: {}\n", goal.title));
    output.push_str(&format!("  ID:        {}\n", goal.id));
    output.push_str(&format!("  Priority:  {}\n", goal.priority));
    output.push_str(&format!(
        "  Reminder:  {}\n",
        if goal.reminder { "Yes" } else { "No" }
    ));
    if let Some(icon) = &goal.goal_icon_id {
        output.push_str(&format!("  Icon:      {}\n", icon));
    }
    if let Some(image) = &goal.goal_image {
        output.push_str(&format!("  Image:     {} bytes\n", image.len()));
    }
    output.push_str(&format!(
        "  Archived:  {}\n",
        if goal.archived { "Yes" } else { "No" }
    ));

    output.push('\n');
    output.push_str(&format!(
        "  Target:    {}\n",
        settings.format_amount(goal.target_amount)
    ));
    output.push_str(&format!(
        "  Saved:     {} ({}%)\n",
        settings.format_amount(progress.saved),
        progress.percent
    ));
    output.push_str(&format!(
        "  Remaining: {}\n",
        settings.format_amount(progress.remaining)
    ));
    output.push_str(&format!("  {}\n", progress_bar(progress.percent, 30)));

    if goal.has_deadline() {
        output.push('\n');
        output.push_str(&format!(
            "  Deadline:  {}\n",
            format_date(goal.deadline, &Local, &settings.date_format)
        ));
        match progress.days_left {
            Some(days) if days < 0 => {
                output.push_str(&format!("  Overdue by {} days\n", -days));
            }
            Some(days) => {
                output.push_str(&format!("  Days left: {}\n", days));
            }
            None => {}
        }
    }

    if let Some(suggestion) = &progress.suggestion {
        output.push('\n');
        output.push_str("  To reach the target in time, save:\n");
        output.push_str(&format!(
            "    {} per day\n",
            settings.format_amount(suggestion.per_day)
        ));
        if let Some(per_week) = suggestion.per_week {
            output.push_str(&format!("    {} per week\n", settings.format_amount(per_week)));
        }
        if let Some(per_month) = suggestion.per_month {
            output.push_str(&format!(
                "    {} per month\n",
                settings.format_amount(per_month)
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!("  {}\n", progress.encouragement()));

    if !goal.additional_notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", goal.additional_notes));
    }

    output.push_str(&format!(
        "\n  Transactions: {}\n",
        aggregate.transactions.len()
    ));

    output
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
