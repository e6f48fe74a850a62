//! iCalendar text parsing.

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, split_lines};
pub use parser::{parse_events, parse_events_with_offset};
pub use values::{parse_date_time, parse_date_time_list, parse_rrule, unescape_text};
