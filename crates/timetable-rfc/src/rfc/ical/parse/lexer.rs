//! Content line lexer (RFC 5545 §3.1).
//!
//! Calendar exports from school portals are often hand-assembled, so the
//! lexer is forgiving about folding and strict only about the shape
//! `NAME *(;PARAM=VALUE) : VALUE`.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// Splits input into unfolded content lines.
///
/// CRLF and bare LF both end a line. A line starting with SP or HTAB
/// continues the previous one, minus that first character. A line with no
/// `:` at all is glued onto the previous one as-is, which repairs exporters
/// that wrap long descriptions without folding.
///
/// Each line is paired with the 1-based physical line it started on.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (index, physical) in input.lines().enumerate() {
        let physical = physical.trim_end_matches('\r');
        if physical.is_empty() {
            continue;
        }

        let continuation = physical
            .strip_prefix([' ', '\t'])
            .or_else(|| (!physical.contains(':')).then_some(physical));

        match (continuation, lines.last_mut()) {
            (Some(rest), Some((_, previous))) => previous.push_str(rest),
            (Some(rest), None) => lines.push((index + 1, rest.to_string())),
            (None, _) => lines.push((index + 1, physical.to_string())),
        }
    }

    lines
}

/// ## Summary
/// Lexes one unfolded content line into its name, parameters and raw value.
///
/// The value starts after the first `:` that is not inside a quoted
/// parameter value. Names are uppercased.
///
/// ## Errors
/// Returns an error if the name is empty or has characters outside
/// `[A-Za-z0-9_-]`, a parameter lacks `=`, a quote is never closed, or no
/// unquoted `:` exists.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon = value_separator(line, line_num)?;
    let head = &line[..colon];

    let mut segments = split_unquoted(head, ';').into_iter();
    let (name_offset, name) = segments.next().unwrap_or((0, ""));
    if name.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }
    check_name(name, name_offset, line_num, ParseErrorKind::InvalidPropertyName, true)?;

    let params = segments
        .map(|(offset, segment)| parse_parameter(segment, offset, line_num))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: line[colon + 1..].to_string(),
    })
}

/// Byte offset of the first `:` outside double quotes.
fn value_separator(line: &str, line_num: usize) -> ParseResult<usize> {
    let mut open_quote = None;
    for (i, c) in line.char_indices() {
        match (c, open_quote) {
            ('"', None) => open_quote = Some(i),
            ('"', Some(_)) => open_quote = None,
            (':', None) => return Ok(i),
            _ => {}
        }
    }

    Err(match open_quote {
        Some(at) => ParseError::new(ParseErrorKind::UnclosedQuote, line_num, at + 1),
        None => ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()),
    })
}

/// Splits `text` on `separator` outside double quotes, keeping each piece's
/// byte offset within `text`.
fn split_unquoted(text: &str, separator: char) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            pieces.push((start, &text[start..i]));
            start = i + c.len_utf8();
        }
    }
    pieces.push((start, &text[start..]));
    pieces
}

fn check_name(
    name: &str,
    offset: usize,
    line_num: usize,
    kind: ParseErrorKind,
    allow_underscore: bool,
) -> ParseResult<()> {
    match name
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || (allow_underscore && c == '_')))
    {
        Some((i, _)) => Err(ParseError::new(kind, line_num, offset + i + 1)),
        None => Ok(()),
    }
}

/// Parses `NAME=value[,value]`, where `offset` locates `segment` in the line.
fn parse_parameter(segment: &str, offset: usize, line_num: usize) -> ParseResult<Parameter> {
    let Some((name, raw_values)) = segment.split_once('=').filter(|(n, _)| !n.is_empty()) else {
        return Err(
            ParseError::new(ParseErrorKind::InvalidParameter, line_num, offset + 1)
                .with_context(format!("'{segment}' has no name=value form")),
        );
    };
    check_name(name, offset, line_num, ParseErrorKind::InvalidParameter, false)?;

    let values = split_unquoted(raw_values, ',')
        .into_iter()
        .map(|(_, value)| {
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
                .to_string()
        })
        .collect();
    Ok(Parameter::with_values(name, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_merges_folded_lines() {
        let input = "DESCRIPTION:Teacher: Dr.\r\n  Zhang\r\nSUMMARY:Math\r\n";
        let lines = split_lines(input);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (1, "DESCRIPTION:Teacher: Dr. Zhang".to_string()));
        assert_eq!(lines[1], (3, "SUMMARY:Math".to_string()));
    }

    #[test]
    fn split_handles_tab_and_bare_lf() {
        let lines = split_lines("SUMMARY:Lin\n\tear Algebra\nLOCATION:B2");
        assert_eq!(lines[0].1, "SUMMARY:Linear Algebra");
        assert_eq!(lines[1].1, "LOCATION:B2");
    }

    #[test]
    fn parse_simple_line() {
        let result = parse_content_line("SUMMARY:Team Meeting", 1).unwrap();
        assert_eq!(result.name, "SUMMARY");
        assert!(result.params.is_empty());
        assert_eq!(result.raw_value, "Team Meeting");
    }

    #[test]
    fn parse_line_with_params() {
        let result =
            parse_content_line("dtstart;TZID=Asia/Shanghai;VALUE=DATE-TIME:20240301T080000", 1)
                .unwrap();
        assert_eq!(result.name, "DTSTART");
        assert_eq!(result.get_param_value("tzid"), Some("Asia/Shanghai"));
        assert_eq!(result.get_param_value("VALUE"), Some("DATE-TIME"));
        assert_eq!(result.raw_value, "20240301T080000");
    }

    #[test]
    fn parse_line_with_quoted_colon() {
        let result = parse_content_line("ATTENDEE;CN=\"Doe: Jane\":mailto:j@example.com", 1).unwrap();
        assert_eq!(result.get_param_value("CN"), Some("Doe: Jane"));
        assert_eq!(result.raw_value, "mailto:j@example.com");
    }

    #[test]
    fn parse_multi_valued_parameter() {
        let result = parse_content_line("X-ROOM;ALT=a,\"b,c\";LANGUAGE=zh:Hall 2", 1).unwrap();
        assert_eq!(result.params.len(), 2);
        assert_eq!(result.params[0].values, vec!["a", "b,c"]);
        assert_eq!(result.get_param_value("language"), Some("zh"));
        assert_eq!(result.raw_value, "Hall 2");
        assert_eq!(
            parse_content_line("SUMMARY;NOVALUE:x", 2).unwrap_err().kind,
            ParseErrorKind::InvalidParameter
        );
    }

    #[test]
    fn parse_line_with_empty_value() {
        let result = parse_content_line("LOCATION;LANGUAGE=en:", 3).unwrap();
        assert_eq!(result.raw_value, "");
    }

    #[test]
    fn parse_line_errors() {
        let err = parse_content_line("ATTENDEE;CN=\"Unclosed:mailto:x", 4).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedQuote);
        assert_eq!(err.line, 4);
        assert!(parse_content_line(":value", 1).is_err());
        assert!(parse_content_line("BAD NAME:value", 1).is_err());
    }
}
