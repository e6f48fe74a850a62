//! Lenient `VEVENT` extraction.
//!
//! Unlike a full iCalendar parser this never rejects a document: malformed
//! content lines are skipped, an event without a usable `DTSTART` is dropped,
//! and a malformed `RDATE`/`EXDATE` entry only loses that entry.

use chrono::{FixedOffset, Offset, Utc};

use super::error::ParseResult;
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date_time, parse_date_time_list, parse_rrule, unescape_text};
use crate::rfc::ical::core::{ContentLine, IcsDateTime, IcsEvent, RecurrenceRule};

/// Extracts every `VEVENT` from an iCalendar document, keeping UTC values in UTC.
#[must_use]
pub fn parse_events(input: &str) -> Vec<IcsEvent> {
    parse_events_with_offset(input, Utc.fix())
}

/// Extracts every `VEVENT` from an iCalendar document.
///
/// UTC date-times are shifted by `offset` so every value on the returned
/// events is a local wall-clock time.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_events_with_offset(input: &str, offset: FixedOffset) -> Vec<IcsEvent> {
    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;
    let mut nested = 0usize;

    for (line_num, line) in split_lines(input) {
        let content_line = match parse_content_line(&line, line_num) {
            Ok(cl) => cl,
            Err(err) => {
                tracing::debug!(%err, "Skipping malformed content line");
                continue;
            }
        };

        if content_line.is_boundary("BEGIN", "VEVENT") {
            if current.is_some() {
                tracing::warn!(line = line_num, "VEVENT opened before previous one closed");
            }
            current = Some(EventBuilder::new(line_num));
            nested = 0;
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };

        if content_line.is_boundary("END", "VEVENT") {
            if let Some(event) = current.take().and_then(|b| b.finish(offset)) {
                events.push(event);
            }
            continue;
        }

        // Properties of nested components (VALARM) do not describe the event
        match content_line.name.as_str() {
            "BEGIN" => nested += 1,
            "END" => nested = nested.saturating_sub(1),
            _ if nested == 0 => builder.apply(content_line, line_num),
            _ => {}
        }
    }

    if let Some(builder) = current {
        tracing::warn!(line = builder.begin_line, "Unterminated VEVENT at end of input");
        events.extend(builder.finish(offset));
    }

    tracing::debug!(count = events.len(), "Extracted events");
    events
}

/// Accumulates the recognized properties of one `VEVENT`.
struct EventBuilder {
    begin_line: usize,
    summary: String,
    location: String,
    description: String,
    start: Option<ParseResult<IcsDateTime>>,
    end: Option<ParseResult<IcsDateTime>>,
    rule: Option<RecurrenceRule>,
    rdates: Vec<IcsDateTime>,
    exdates: Vec<IcsDateTime>,
}

impl EventBuilder {
    fn new(begin_line: usize) -> Self {
        Self {
            begin_line,
            summary: String::new(),
            location: String::new(),
            description: String::new(),
            start: None,
            end: None,
            rule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
        }
    }

    fn apply(&mut self, cl: ContentLine, line_num: usize) {
        match cl.name.as_str() {
            "SUMMARY" => self.summary = unescape_text(cl.raw_value.trim()),
            "LOCATION" => self.location = unescape_text(cl.raw_value.trim()),
            "DESCRIPTION" => self.description = unescape_text(&cl.raw_value),
            "DTSTART" => {
                if let Some(tzid) = cl.get_param_value("TZID") {
                    tracing::trace!(tzid, line = line_num, "Reading zoned DTSTART as wall-clock time");
                }
                self.start = Some(parse_date_time(&cl.raw_value, line_num));
            }
            "DTEND" => self.end = Some(parse_date_time(&cl.raw_value, line_num)),
            "RRULE" => match parse_rrule(&cl.raw_value, line_num) {
                Ok(rule) => self.rule = Some(rule),
                Err(err) => tracing::debug!(%err, "Ignoring malformed RRULE"),
            },
            "RDATE" => self.rdates.extend(parse_date_time_list(&cl.raw_value, line_num)),
            "EXDATE" => self.exdates.extend(parse_date_time_list(&cl.raw_value, line_num)),
            _ => {}
        }
    }

    fn finish(self, offset: FixedOffset) -> Option<IcsEvent> {
        let start = match self.start {
            Some(Ok(start)) => start,
            Some(Err(err)) => {
                tracing::warn!(%err, line = self.begin_line, "Dropping VEVENT with unparseable DTSTART");
                return None;
            }
            None => {
                tracing::warn!(line = self.begin_line, "Dropping VEVENT without DTSTART");
                return None;
            }
        };

        let end = match self.end {
            Some(Ok(end)) => Some(end.to_local(offset)),
            Some(Err(err)) => {
                tracing::debug!(%err, "Ignoring unparseable DTEND");
                None
            }
            None => None,
        };

        tracing::trace!(
            summary = %self.summary,
            start = %start,
            rdates = self.rdates.len(),
            exdates = self.exdates.len(),
            "Accepted VEVENT"
        );

        let (day_exdates, exdates): (Vec<_>, Vec<_>) =
            self.exdates.into_iter().partition(IcsDateTime::is_date_only);

        Some(IcsEvent {
            summary: self.summary,
            location: self.location,
            description: self.description,
            start: start.to_local(offset),
            end,
            recurrence_rule: self.rule,
            recurrence_dates: self.rdates.iter().map(|dt| dt.to_local(offset)).collect(),
            exception_dates: exdates.iter().map(|dt| dt.to_local(offset)).collect(),
            exception_days: day_exdates.iter().map(|dt| dt.value.date()).collect(),
        })
    }
}
