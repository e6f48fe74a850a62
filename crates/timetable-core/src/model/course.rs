//! Persisted course entity and color tagging.

use serde::{Deserialize, Serialize};

use super::session::CanonicalSession;

/// Color tags handed out to imported courses.
pub const PALETTE: [&str; 10] = [
    "#5B8FF9", "#5AD8A6", "#F6BD16", "#E8684A", "#6DC8EC", "#9270CA", "#FF9D4D", "#269A99",
    "#FF99C3", "#5D7092",
];

/// A canonical session bound to a semester and a display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCourse {
    #[serde(flatten)]
    pub session: CanonicalSession,
    pub semester_id: String,
    pub color: String,
}

/// ## Summary
/// Picks a palette color from the course name.
///
/// Stable across runs and platforms so re-importing a timetable keeps the
/// colors a user already knows.
#[must_use]
pub fn palette_color_for(name: &str) -> &'static str {
    // FNV-1a; std's hasher is not stable across releases
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.trim().bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PALETTE[(hash % 10) as usize]
}
