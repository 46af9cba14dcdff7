//! Nested JSON backup format

use std::io::Write;

use serde_json::Value;

use crate::error::{GoalStashError, GoalStashResult};

use super::draft::PayloadDraft;
use super::{migrations, BackupPayload, OLDEST_SCHEMA_VERSION};

/// Write a payload as JSON
pub fn write_json<W: Write>(payload: &BackupPayload, writer: W, pretty: bool) -> GoalStashResult<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, payload)?;
    } else {
        serde_json::to_writer(writer, payload)?;
    }
    Ok(())
}

/// Serialize a payload to a JSON string
pub fn to_json_string(payload: &BackupPayload, pretty: bool) -> GoalStashResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    Ok(json)
}

/// Icon v1 documents imply for goals that carry none
pub const LEGACY_DEFAULT_ICON: &str = "Image";

/// Parse a JSON document, upgrading older schemas
pub fn from_json_str(text: &str) -> GoalStashResult<BackupPayload> {
    let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;

    let version = match value.get("version") {
        None | Some(Value::Null) => OLDEST_SCHEMA_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GoalStashError::Parse(format!("invalid version '{}'", v)))?,
    };
    migrations::check_version(version)?;

    let mut draft: PayloadDraft = serde_json::from_value(value)
        .map_err(|e| GoalStashError::Parse(format!("malformed backup document: {}", e)))?;
    draft.version = version;

    if version == OLDEST_SCHEMA_VERSION {
        for goal in draft.goals_mut() {
            goal.goal_icon_id.get_or_insert_with(|| LEGACY_DEFAULT_ICON.to_string());
        }
    }

    migrations::upgrade(&mut draft)?;
    draft.finish()
}
