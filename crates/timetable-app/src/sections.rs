//! Section table read from a JSON file.

use serde::Deserialize;
use timetable_service::ingest::{SectionTime, SettingsSource};

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
struct SectionEntry {
    section: u32,
    start: String,
    end: String,
}

/// Settings collaborator backed by a fixed section table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    sections: Vec<SectionTime>,
    default_minutes: u32,
}

impl SectionTable {
    /// A table with no sections; sessions without an end time get
    /// `default_minutes`.
    #[must_use]
    pub const fn empty(default_minutes: u32) -> Self {
        Self {
            sections: Vec::new(),
            default_minutes,
        }
    }

    /// ## Summary
    /// Parses `[{"section": 1, "start": "08:00", "end": "08:45"}, ..]`.
    ///
    /// The default session length becomes the length of the first section.
    ///
    /// ## Errors
    /// Returns an error if the JSON is malformed, a time is not `HH:MM`, or a
    /// section ends before it starts.
    pub fn from_json(json: &str, fallback_minutes: u32) -> AppResult<Self> {
        let entries: Vec<SectionEntry> = serde_json::from_str(json)?;
        let mut sections = entries
            .iter()
            .map(|entry| {
                let start_minutes = parse_clock(&entry.start)?;
                let end_minutes = parse_clock(&entry.end)?;
                if end_minutes < start_minutes {
                    return Err(AppError::SectionTableError(format!(
                        "section {} ends before it starts",
                        entry.section
                    )));
                }
                Ok(SectionTime {
                    section: entry.section,
                    start_minutes,
                    end_minutes,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        sections.sort_by_key(|s| s.section);

        let default_minutes = sections
            .first()
            .map_or(fallback_minutes, |s| s.end_minutes - s.start_minutes);
        Ok(Self {
            sections,
            default_minutes,
        })
    }
}

impl SettingsSource for SectionTable {
    fn section_times(&self) -> Vec<SectionTime> {
        self.sections.clone()
    }

    fn default_session_minutes(&self) -> u32 {
        self.default_minutes
    }
}

fn parse_clock(text: &str) -> AppResult<u32> {
    let invalid = || AppError::SectionTableError(format!("'{text}' is not HH:MM"));
    let (hours, minutes) = text.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().ok().ok_or_else(invalid)?;
    let minutes: u32 = minutes.parse().ok().ok_or_else(invalid)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table() {
        let json = r#"[
            {"section": 2, "start": "08:55", "end": "09:40"},
            {"section": 1, "start": "8:00", "end": "08:45"}
        ]"#;
        let table = SectionTable::from_json(json, 60).unwrap();
        let sections = table.section_times();
        assert_eq!(sections[0].section, 1);
        assert_eq!(sections[0].start_minutes, 480);
        assert_eq!(sections[1].end_minutes, 580);
        assert_eq!(table.default_session_minutes(), 45);
    }

    #[test]
    fn empty_table_uses_fallback() {
        let table = SectionTable::from_json("[]", 60).unwrap();
        assert_eq!(table, SectionTable::empty(60));
    }

    #[test]
    fn rejects_bad_times() {
        for json in [
            r#"[{"section": 1, "start": "8", "end": "09:00"}]"#,
            r#"[{"section": 1, "start": "24:00", "end": "09:00"}]"#,
            r#"[{"section": 1, "start": "10:00", "end": "09:00"}]"#,
        ] {
            assert!(matches!(
                SectionTable::from_json(json, 60),
                Err(AppError::SectionTableError(_))
            ));
        }
        assert!(matches!(
            SectionTable::from_json("{", 60),
            Err(AppError::JsonError(_))
        ));
    }
}
