//! Orchestrator flows from raw text to the sink.

use timetable_core::config::{IcsConfig, Settings};
use timetable_core::model::WeekParity;
use timetable_service::error::{ServiceError, ServiceResult};
use timetable_service::ingest::{
    IngestReport, Orchestrator, SectionTime, SessionSink, SettingsSource, SourceFormat,
};
use timetable_service::script::ExecuteOptions;

const SEMESTER_ICS: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Campus//Timetable//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Asia/Shanghai\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0800\r\n\
TZOFFSETTO:+0800\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:1@campus\r\n\
SUMMARY:Operating Systems\r\n\
LOCATION:Lab 4\r\n\
DESCRIPTION:Course code: CS301\\nInstructor: Prof. Gao\r\n\
DTSTART:20240304T000000Z\r\n\
DTEND:20240304T014000Z\r\n\
RRULE:FREQ=WEEKLY;COUNT=16\r\n\
EXDATE:20240318T000000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:2@campus\r\n\
SUMMARY:Compilers\r\n\
LOCATION:Room 210\r\n\
DTSTART;TZID=Asia/Shanghai:20240306T140000\r\n\
DTEND;TZID=Asia/Shanghai:20240306T154000\r\n\
RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=WE;UNTIL=20240619T235959Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Broken\r\n\
DTSTART:not-a-date\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn shanghai() -> Orchestrator {
    let settings = Settings {
        ics: IcsConfig {
            utc_offset_minutes: 480,
            ..IcsConfig::default()
        },
        ..Settings::default()
    };
    Orchestrator::new(&settings)
}

#[test_log::test]
fn ics_document_end_to_end() {
    let report = shanghai().ingest_auto(SEMESTER_ICS).unwrap();
    assert_eq!(report.source, SourceFormat::Ics);
    assert_eq!(report.sessions.len(), 3);

    let os: Vec<_> = report
        .sessions
        .iter()
        .filter(|s| s.name == "Operating Systems")
        .collect();
    assert_eq!(os.len(), 2);
    assert_eq!((os[0].start_week, os[0].end_week), (1, 2));
    assert_eq!((os[1].start_week, os[1].end_week), (4, 16));
    assert!(os.iter().all(|s| s.day_of_week == 1));
    assert!(os.iter().all(|s| (s.start_period, s.duration) == (1, 2)));
    assert_eq!(os[0].teacher, "Prof. Gao");

    let compilers = &report.sessions[2];
    assert_eq!(compilers.day_of_week, 3);
    assert_eq!((compilers.start_week, compilers.end_week), (1, 15));
    assert_eq!(compilers.week_parity, WeekParity::Odd);
    assert_eq!((compilers.start_period, compilers.duration), (7, 2));
    assert_eq!(compilers.location, "Room 210");

    assert_eq!(report.max_week, 16);
    assert_eq!(report.max_period, 8);
}

#[test_log::test]
fn ics_without_events_is_unrecognized() {
    let err = shanghai()
        .ingest_auto("BEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n")
        .unwrap_err();
    assert!(matches!(err, ServiceError::NoSessionsRecognized("ICS")));
}

#[test_log::test]
fn scraped_page_falls_back_to_bundled_script() {
    let page = "<table>\
<tr><td></td><td>Monday</td><td>Tuesday</td></tr>\
<tr><td>1</td><td>Databases<br>Dr. Kim<br>Weeks 1-12<br>Room 5</td><td></td></tr>\
</table>";
    let report = Orchestrator::default().ingest_text(page).unwrap();
    assert_eq!(report.source, SourceFormat::Script);
    assert_eq!(report.sessions.len(), 1);
    let session = &report.sessions[0];
    assert_eq!(session.name, "Databases");
    assert_eq!(session.teacher, "Dr. Kim");
    assert_eq!(session.location, "Room 5");
    assert_eq!((session.start_week, session.end_week), (1, 12));
    assert_eq!((session.day_of_week, session.start_period), (1, 1));
}

#[test_log::test]
fn unrecognized_text_is_reported() {
    let err = Orchestrator::default().ingest_text("hello there").unwrap_err();
    assert!(matches!(err, ServiceError::NoSessionsRecognized(_)));
    assert_eq!(err.to_string(), "No sessions recognized in timetable input");
}

#[test_log::test]
fn custom_script_ingestion() {
    let script = "
        function scheduleHtmlParser(html) {
            return JSON.stringify([{ name: html.trim(), day: 5, weeks: [1, 3, 5], sections: [{ section: 9 }] }]);
        }";
    let report = Orchestrator::default()
        .ingest_with_script(script, " Ethics ", &ExecuteOptions::default())
        .unwrap();
    assert_eq!(report.sessions[0].name, "Ethics");
    assert_eq!(report.sessions[0].week_parity, WeekParity::Odd);
    assert_eq!(report.max_period, 9);

    let err = Orchestrator::default()
        .ingest_with_script("function nothing() {}", "", &ExecuteOptions::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::ScriptError(_)));
}

#[derive(Default)]
struct RecordingSink {
    received: Vec<IngestReport>,
    reject: bool,
}

impl SessionSink for RecordingSink {
    fn accept(&mut self, report: &IngestReport) -> ServiceResult<()> {
        if self.reject {
            return Err(ServiceError::SinkError("read-only store".to_string()));
        }
        self.received.push(report.clone());
        Ok(())
    }
}

struct FourSections;

impl SettingsSource for FourSections {
    fn section_times(&self) -> Vec<SectionTime> {
        [(1, 480), (2, 535), (3, 600), (4, 655)]
            .into_iter()
            .map(|(section, start_minutes)| SectionTime {
                section,
                start_minutes,
                end_minutes: start_minutes + 45,
            })
            .collect()
    }

    fn default_session_minutes(&self) -> u32 {
        45
    }
}

#[test_log::test]
fn import_hands_report_to_sink() {
    let mut sink = RecordingSink::default();
    let json = r#"[{"name": "Statistics", "day": 4, "weeks": [1, 2], "sections": [5, 6]}]"#;
    let report = Orchestrator::default()
        .import_into(json, &mut sink, &FourSections)
        .unwrap();
    assert_eq!(report.source, SourceFormat::Json);
    assert_eq!(sink.received, vec![report]);
}

#[test_log::test]
fn import_uses_section_table_for_ics() {
    let mut sink = RecordingSink::default();
    let ics = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:Seminar\n\
DTSTART:20240305T100000\nRRULE:FREQ=WEEKLY;COUNT=2\nEND:VEVENT\nEND:VCALENDAR\n";
    let report = Orchestrator::default()
        .import_into(ics, &mut sink, &FourSections)
        .unwrap();
    let seminar = &report.sessions[0];
    assert_eq!((seminar.start_period, seminar.duration), (3, 1));
    assert_eq!((seminar.start_week, seminar.end_week), (1, 2));
    assert_eq!(sink.received.len(), 1);
}

#[test_log::test]
fn sink_errors_propagate() {
    let mut sink = RecordingSink {
        reject: true,
        ..RecordingSink::default()
    };
    let json = r#"[{"name": "Statistics", "day": 4, "weeks": [1], "sections": [1]}]"#;
    let err = Orchestrator::default()
        .import_into(json, &mut sink, &FourSections)
        .unwrap_err();
    assert!(matches!(err, ServiceError::SinkError(_)));

    let err = Orchestrator::default()
        .import_into("???", &mut RecordingSink::default(), &FourSections)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NoSessionsRecognized(_)));
}
