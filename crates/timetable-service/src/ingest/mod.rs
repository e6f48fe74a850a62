//! Ingestion Orchestrator: format detection, fallback order and hand-off to
//! the persistence sink.

use std::fmt;

use serde::Serialize;
use timetable_core::config::{IcsConfig, Settings};
use timetable_core::model::{CanonicalSession, ThirdPartyResult};

use crate::error::{ServiceError, ServiceResult};
use crate::ics::IcsImporter;
pub use crate::ics::SectionTime;
use crate::normalize::{convert_to_canonical, parse_third_party_result};
use crate::script::{BoaFactory, DEFAULT_SCRAPER, ExecuteOptions, RuntimeFactory, ScriptHost};

/// Where the sessions of a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Exchange JSON given directly.
    Json,
    /// Exchange JSON produced by a script.
    Script,
    Ics,
}

impl SourceFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Script => "script",
            Self::Ics => "ics",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub source: SourceFormat,
    pub sessions: Vec<CanonicalSession>,
    /// Highest period any session occupies.
    pub max_period: u32,
    /// Highest week any session reaches.
    pub max_week: u32,
    /// Provider `timetable` payload, passed through unvalidated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<serde_json::Value>,
}

impl IngestReport {
    #[must_use]
    pub fn new(
        source: SourceFormat,
        sessions: Vec<CanonicalSession>,
        auxiliary: Option<serde_json::Value>,
    ) -> Self {
        let max_period = sessions.iter().map(CanonicalSession::end_period).max().unwrap_or(0);
        let max_week = sessions.iter().map(|s| s.end_week).max().unwrap_or(0);
        Self {
            source,
            sessions,
            max_period,
            max_week,
            auxiliary,
        }
    }

    fn from_third_party(source: SourceFormat, result: ThirdPartyResult) -> Self {
        Self::new(source, convert_to_canonical(&result.courses), result.auxiliary)
    }
}

/// Persistence collaborator receiving the sessions of a successful run.
pub trait SessionSink {
    /// ## Summary
    /// Stores the sessions of `report`.
    ///
    /// ## Errors
    /// Returns `ServiceError::SinkError` if the sessions cannot be stored.
    fn accept(&mut self, report: &IngestReport) -> ServiceResult<()>;
}

/// Read-only settings collaborator.
pub trait SettingsSource {
    /// Section number to wall-clock table; may be empty.
    fn section_times(&self) -> Vec<SectionTime>;

    /// Length of a session whose source gives no end time.
    fn default_session_minutes(&self) -> u32;
}

/// Runs the fallback chain for raw timetable text.
#[derive(Debug, Clone)]
pub struct Orchestrator<F = BoaFactory> {
    host: ScriptHost<F>,
    ics: IcsConfig,
}

impl Default for Orchestrator<BoaFactory> {
    fn default() -> Self {
        Self::with_host(ScriptHost::default(), IcsConfig::default())
    }
}

impl Orchestrator<BoaFactory> {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::with_host(ScriptHost::new(BoaFactory, settings.script), settings.ics)
    }
}

impl<F: RuntimeFactory> Orchestrator<F> {
    #[must_use]
    pub const fn with_host(host: ScriptHost<F>, ics: IcsConfig) -> Self {
        Self { host, ics }
    }

    /// ## Summary
    /// Ingests scraped text: exchange JSON first, then the bundled scraper
    /// applied to the same text, with its output parsed as exchange JSON.
    ///
    /// ## Errors
    /// Returns `NoSessionsRecognized` if neither step yields a course. A
    /// failure of the bundled scraper is logged and treated as no courses.
    #[tracing::instrument(skip(self, raw), fields(input_len = raw.len()))]
    pub fn ingest_text(&self, raw: &str) -> ServiceResult<IngestReport> {
        let direct = parse_third_party_result(raw);
        if !direct.is_empty() {
            tracing::debug!(courses = direct.courses.len(), "Recognized exchange JSON");
            return Ok(IngestReport::from_third_party(SourceFormat::Json, direct));
        }

        match self.host.execute(DEFAULT_SCRAPER, raw) {
            Ok(payload) => {
                let scraped = parse_third_party_result(&payload);
                if !scraped.is_empty() {
                    tracing::debug!(courses = scraped.courses.len(), "Recognized scraped page");
                    return Ok(IngestReport::from_third_party(SourceFormat::Script, scraped));
                }
            }
            Err(err) => tracing::warn!(%err, "Bundled scraper failed"),
        }

        Err(ServiceError::NoSessionsRecognized("timetable"))
    }

    /// ## Summary
    /// Runs a caller-supplied script against `raw` and normalizes its output.
    ///
    /// ## Errors
    /// Propagates script failures; returns `NoSessionsRecognized` if the
    /// output holds no course.
    #[tracing::instrument(skip_all, fields(input_len = raw.len()))]
    pub fn ingest_with_script(
        &self,
        script: &str,
        raw: &str,
        options: &ExecuteOptions,
    ) -> ServiceResult<IngestReport> {
        let payload = self.host.execute_with(script, raw, options)?;
        let result = parse_third_party_result(&payload);
        if result.is_empty() {
            return Err(ServiceError::NoSessionsRecognized("script"));
        }
        Ok(IngestReport::from_third_party(SourceFormat::Script, result))
    }

    /// ## Summary
    /// Expands an ICS document with the fixed period mapping.
    ///
    /// ## Errors
    /// Returns `NoSessionsRecognized` if the document yields no session.
    pub fn ingest_ics(&self, raw: &str) -> ServiceResult<IngestReport> {
        Self::fold_ics(&IcsImporter::new(&self.ics), raw)
    }

    /// ## Summary
    /// Expands an ICS document using the section table and default session
    /// length of `settings`.
    ///
    /// ## Errors
    /// Returns `NoSessionsRecognized` if the document yields no session.
    pub fn ingest_ics_with(
        &self,
        raw: &str,
        settings: &impl SettingsSource,
    ) -> ServiceResult<IngestReport> {
        let importer = IcsImporter::new(&self.ics)
            .with_sections(settings.section_times())
            .with_default_minutes(settings.default_session_minutes());
        Self::fold_ics(&importer, raw)
    }

    /// ## Summary
    /// Routes calendar exports to the ICS expander and everything else
    /// through [`Orchestrator::ingest_text`].
    ///
    /// ## Errors
    /// Returns `NoSessionsRecognized` if the chosen path yields no session.
    pub fn ingest_auto(&self, raw: &str) -> ServiceResult<IngestReport> {
        if looks_like_ics(raw) {
            self.ingest_ics(raw)
        } else {
            self.ingest_text(raw)
        }
    }

    /// ## Summary
    /// Same routing as [`Orchestrator::ingest_auto`], with calendar exports
    /// folded against the section table of `settings`.
    ///
    /// ## Errors
    /// Returns `NoSessionsRecognized` if the chosen path yields no session.
    pub fn ingest_auto_with(
        &self,
        raw: &str,
        settings: &impl SettingsSource,
    ) -> ServiceResult<IngestReport> {
        if looks_like_ics(raw) {
            self.ingest_ics_with(raw, settings)
        } else {
            self.ingest_text(raw)
        }
    }

    /// ## Summary
    /// Ingests `raw` and hands the sessions to `sink`.
    ///
    /// ## Errors
    /// - `NoSessionsRecognized` if no format yields a session.
    /// - Whatever [`deliver`] returns.
    pub fn import_into(
        &self,
        raw: &str,
        sink: &mut impl SessionSink,
        settings: &impl SettingsSource,
    ) -> ServiceResult<IngestReport> {
        let report = self.ingest_auto_with(raw, settings)?;
        deliver(&report, sink, settings)?;
        Ok(report)
    }

    fn fold_ics(importer: &IcsImporter, raw: &str) -> ServiceResult<IngestReport> {
        let sessions = importer.expand(raw);
        if sessions.is_empty() {
            return Err(ServiceError::NoSessionsRecognized("ICS"));
        }
        Ok(IngestReport::new(SourceFormat::Ics, sessions, None))
    }
}

/// ## Summary
/// Validates every session of `report` and hands it to `sink`.
///
/// Nothing reaches the sink unless every session is valid.
///
/// ## Errors
/// - `CoreError` if a session breaks an invariant.
/// - Whatever the sink returns.
pub fn deliver(
    report: &IngestReport,
    sink: &mut impl SessionSink,
    settings: &impl SettingsSource,
) -> ServiceResult<()> {
    for session in &report.sessions {
        session.validate()?;
    }

    let configured = settings
        .section_times()
        .iter()
        .map(|s| s.section)
        .max()
        .unwrap_or(0);
    if configured > 0 && report.max_period > configured {
        tracing::warn!(
            max_period = report.max_period,
            configured,
            "Imported sessions use more periods than the section table defines"
        );
    }

    sink.accept(report)?;
    tracing::info!(
        source = %report.source,
        sessions = report.sessions.len(),
        max_week = report.max_week,
        "Imported timetable"
    );
    Ok(())
}

fn looks_like_ics(raw: &str) -> bool {
    raw.trim_start()
        .get(..15)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
        || raw.contains("BEGIN:VCALENDAR")
}
