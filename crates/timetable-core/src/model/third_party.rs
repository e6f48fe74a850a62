//! The discrete, as-received course form of the third-party exchange format.

use std::collections::BTreeSet;

use serde::Serialize;

/// A course before its week and period sets are folded into ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThirdPartyCourse {
    pub name: String,
    pub teacher: String,
    pub position: String,
    /// 1 = Monday .. 7 = Sunday
    pub day: u8,
    pub weeks: BTreeSet<u32>,
    pub periods: BTreeSet<u32>,
}

/// Parsed exchange payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThirdPartyResult {
    pub courses: Vec<ThirdPartyCourse>,
    /// Provider-specific secondary blob (usually period timing), passed through unvalidated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<serde_json::Value>,
}

impl ThirdPartyResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
