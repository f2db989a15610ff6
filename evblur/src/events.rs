//! Event records and text event-stream parsing.
//!
//! Event files hold one event per line as whitespace separated
//! `timestamp x y polarity` fields. Blank lines and lines starting with `#`
//! are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Single brightness-change event from an event camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: i64,
    pub x: u16,
    pub y: u16,
    pub polarity: i8,
}

impl Event {
    pub fn new(timestamp: i64, x: u16, y: u16, polarity: i8) -> Self {
        Self {
            timestamp,
            x,
            y,
            polarity,
        }
    }

    /// Event at (x, y) with zeroed timestamp and positive polarity
    pub fn at(x: u16, y: u16) -> Self {
        Self::new(0, x, y, 1)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.timestamp, self.x, self.y, self.polarity)
    }
}

#[derive(Error, Debug)]
pub enum EventParseError {
    #[error("Failed to read events: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: expected 4 fields (timestamp x y polarity), got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("Line {line}: invalid {field} value {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

fn parse_field<T: std::str::FromStr>(
    raw: &str,
    line: usize,
    field: &'static str,
) -> Result<T, EventParseError> {
    raw.parse().map_err(|_| EventParseError::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_line(text: &str, line: usize) -> Result<Event, EventParseError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(EventParseError::MalformedLine {
            line,
            content: text.to_string(),
        });
    }

    Ok(Event {
        timestamp: parse_field(fields[0], line, "timestamp")?,
        x: parse_field(fields[1], line, "x")?,
        y: parse_field(fields[2], line, "y")?,
        polarity: parse_field(fields[3], line, "polarity")?,
    })
}

/// Parse events from any reader.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<Event>, EventParseError> {
    let mut events = Vec::new();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        events.push(parse_line(trimmed, index + 1)?);
    }

    Ok(events)
}

/// Read an event text file.
pub fn read_events(path: &Path) -> Result<Vec<Event>, EventParseError> {
    let events = parse_events(File::open(path)?)?;
    log::debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        let text = "# t x y p\n100 1 2 1\n\n200 3 0 -1\n";
        let events = parse_events(text.as_bytes()).unwrap();
        assert_eq!(
            events,
            vec![Event::new(100, 1, 2, 1), Event::new(200, 3, 0, -1)]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let text = "100 1 2 1\n200 3 0\n";
        match parse_events(text.as_bytes()) {
            Err(EventParseError::MalformedLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_field() {
        let text = "100 -4 2 1\n";
        match parse_events(text.as_bytes()) {
            Err(EventParseError::InvalidField { line, field, value }) => {
                assert_eq!(line, 1);
                assert_eq!(field, "x");
                assert_eq!(value, "-4");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let ev = Event::new(123456, 10, 20, -1);
        assert_eq!(ev.to_string(), "123456\t10\t20\t-1");
        let parsed = parse_events(ev.to_string().as_bytes()).unwrap();
        assert_eq!(parsed, vec![ev]);
    }
}
