//! Strongly-typed ID wrappers for goals and transactions
//!
//! Identifiers are integers assigned by the store on insert. Zero is the
//! "unassigned" sentinel carried by freshly built or freshly imported records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// The sentinel for records the store has not numbered yet
            pub const UNASSIGNED: Self = Self(0);

            /// Wrap a raw integer identifier
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw integer value
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Whether the store has assigned this identifier
            pub const fn is_assigned(&self) -> bool {
                self.0 != 0
            }

            /// The identifier following this one
            pub const fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                // Accept both "7" and the display form "goal-7"
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(GoalId, "goal-");
define_id!(TransactionId, "txn-");
