//! Backup schema upgraders
//!
//! Each entry upgrades a draft from `from_version` to `from_version + 1`.
//! Reading a document applies, in order, every upgrader at or above the
//! document's declared version, so new schema changes are added by appending
//! an entry and bumping [`CURRENT_SCHEMA_VERSION`].

use tracing::debug;

use crate::error::{GoalStashError, GoalStashResult};

use super::draft::{PayloadDraft, RawDeadline};
use super::legacy::parse_legacy_deadline;
use super::{CURRENT_SCHEMA_VERSION, OLDEST_SCHEMA_VERSION};

/// Signature of a single upgrade step
pub type UpgradeFn = fn(&mut PayloadDraft) -> GoalStashResult<()>;

/// One step in the upgrade chain
pub struct Migration {
    pub from_version: u32,
    pub description: &'static str,
    pub apply: UpgradeFn,
}

/// Ordered upgrade chain, one entry per schema bump
pub const MIGRATIONS: &[Migration] = &[Migration {
    from_version: 1,
    description: "goal deadline display strings to epoch milliseconds",
    apply: deadline_text_to_millis,
}];

/// Fail for versions this build cannot read
pub fn check_version(version: u32) -> GoalStashResult<()> {
    if (OLDEST_SCHEMA_VERSION..=CURRENT_SCHEMA_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(GoalStashError::UnsupportedSchemaVersion {
            found: version,
            supported: format!("{}-{}", OLDEST_SCHEMA_VERSION, CURRENT_SCHEMA_VERSION),
        })
    }
}

/// Bring a draft up to the current schema
pub fn upgrade(draft: &mut PayloadDraft) -> GoalStashResult<()> {
    let declared = draft.version;
    check_version(declared)?;

    for migration in MIGRATIONS.iter().filter(|m| m.from_version >= declared) {
        debug!(
            "Upgrading backup draft from v{} to v{}: {}",
            migration.from_version,
            migration.from_version + 1,
            migration.description
        );
        (migration.apply)(draft)?;
    }

    Ok(())
}

/// v1 → v2: deadlines were `dd/MM/yyyy` or `yyyy/MM/dd` strings
fn deadline_text_to_millis(draft: &mut PayloadDraft) -> GoalStashResult<()> {
    for goal in draft.goals_mut() {
        if let RawDeadline::Text(text) = &goal.deadline {
            let trimmed = text.trim();
            // Some v1 writers already stored millis under the old tag
            let millis = match trimmed.parse::<i64>() {
                Ok(millis) => millis,
                Err(_) => parse_legacy_deadline(trimmed),
            };
            goal.deadline = RawDeadline::Millis(millis);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::draft::{AggregateDraft, GoalDraft};
    use crate::models::{GoalId, GoalPriority};

    fn draft_with_deadline(version: u32, deadline: RawDeadline) -> PayloadDraft {
        PayloadDraft {
            version,
            timestamp: 0,
            data: vec![AggregateDraft {
                goal: GoalDraft {
                    id: GoalId::new(1),
                    title: "Trip".into(),
                    target_amount: 800.0,
                    deadline,
                    goal_image: None,
                    additional_notes: String::new(),
                    priority: GoalPriority::Normal,
                    reminder: false,
                    goal_icon_id: None,
                    archived: false,
                },
                transactions: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_chain_covers_every_version() {
        for version in OLDEST_SCHEMA_VERSION..CURRENT_SCHEMA_VERSION {
            let steps = MIGRATIONS
                .iter()
                .filter(|m| m.from_version == version)
                .count();
            assert_eq!(steps, 1, "expected exactly one upgrader from v{}", version);
        }
        assert!(MIGRATIONS
            .windows(2)
            .all(|pair| pair[0].from_version < pair[1].from_version));
    }

    #[test]
    fn test_v1_text_deadline_is_converted() {
        let mut draft = draft_with_deadline(1, RawDeadline::Text("25/12/2023".into()));
        upgrade(&mut draft).unwrap();
        assert_eq!(
            draft.data[0].goal.deadline,
            RawDeadline::Millis(parse_legacy_deadline("25/12/2023"))
        );
    }

    #[test]
    fn test_v1_blank_deadline_becomes_zero() {
        let mut draft = draft_with_deadline(1, RawDeadline::Text(String::new()));
        upgrade(&mut draft).unwrap();
        assert_eq!(draft.data[0].goal.deadline, RawDeadline::Millis(0));
    }

    #[test]
    fn test_v1_numeric_text_is_kept() {
        let mut draft = draft_with_deadline(1, RawDeadline::Text("1703462400000".into()));
        upgrade(&mut draft).unwrap();
        assert_eq!(
            draft.data[0].goal.deadline,
            RawDeadline::Millis(1_703_462_400_000)
        );
    }

    #[test]
    fn test_upgrade_keeps_declared_version() {
        let mut draft = draft_with_deadline(1, RawDeadline::Text("2023/12/25".into()));
        upgrade(&mut draft).unwrap();
        assert_eq!(draft.version, 1);
        assert!(matches!(draft.data[0].goal.deadline, RawDeadline::Millis(_)));
    }

    #[test]
    fn test_current_version_is_untouched() {
        let mut draft = draft_with_deadline(
            CURRENT_SCHEMA_VERSION,
            RawDeadline::Text("25/12/2023".into()),
        );
        upgrade(&mut draft).unwrap();
        assert_eq!(
            draft.data[0].goal.deadline,
            RawDeadline::Text("25/12/2023".into())
        );
    }

    #[test]
    fn test_future_and_zero_versions_are_rejected() {
        assert!(matches!(
            check_version(CURRENT_SCHEMA_VERSION + 1),
            Err(GoalStashError::UnsupportedSchemaVersion { .. })
        ));
        assert!(check_version(0).is_err());
        assert!(check_version(CURRENT_SCHEMA_VERSION).is_ok());
    }
}
