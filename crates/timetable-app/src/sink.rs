//! Sink that writes the imported courses as JSON.

use std::io::Write;

use serde::Serialize;
use timetable_core::conflict::conflict_pairs;
use timetable_core::model::{CanonicalCourse, palette_color_for};
use timetable_service::error::{ServiceError, ServiceResult};
use timetable_service::ingest::{IngestReport, SessionSink, SourceFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    source: SourceFormat,
    max_period: u32,
    max_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    auxiliary: Option<&'a serde_json::Value>,
    courses: Vec<CanonicalCourse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<Vec<(usize, usize)>>,
}

/// Writes each accepted report as one pretty-printed JSON document.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
    semester_id: String,
    check_conflicts: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, semester_id: impl Into<String>, check_conflicts: bool) -> Self {
        Self {
            writer,
            semester_id: semester_id.into(),
            check_conflicts,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SessionSink for JsonSink<W> {
    fn accept(&mut self, report: &IngestReport) -> ServiceResult<()> {
        let conflicts = self.check_conflicts.then(|| conflict_pairs(&report.sessions));
        if let Some(pairs) = &conflicts {
            for (a, b) in pairs {
                tracing::warn!(
                    first = %report.sessions[*a],
                    second = %report.sessions[*b],
                    "Sessions conflict"
                );
            }
        }

        let courses = report
            .sessions
            .iter()
            .cloned()
            .map(|session| {
                let color = palette_color_for(&session.name);
                session.into_course(self.semester_id.clone(), color)
            })
            .collect();

        let document = Document {
            source: report.source,
            max_period: report.max_period,
            max_week: report.max_week,
            auxiliary: report.auxiliary.as_ref(),
            courses,
            conflicts,
        };

        serde_json::to_writer_pretty(&mut self.writer, &document)
            .map_err(|e| ServiceError::SinkError(e.to_string()))?;
        writeln!(self.writer).map_err(|e| ServiceError::SinkError(e.to_string()))?;
        Ok(())
    }
}
