//! Line commands.
//!
//! | input                         | event        |
//! |-------------------------------|--------------|
//! | `a`, `p`, `prev`, `left`      | `Prev`       |
//! | `d`, `n`, `next`, `right`     | `Next`       |
//! | `m X Y`, `click X Y`          | `Mark(X, Y)` |
//! | `q`, `quit`, `close`          | `Close`      |
//! | `h`, `help`, `?`              | help text    |

use headtrack_model::point::Point2D;

use crate::session::AnnotationEvent;

pub const HELP: &str = "\
commands:
  a | p | prev | left     previous frame
  d | n | next | right    next frame
  m X Y | click X Y       mark point (X, Y) on this frame
  q | quit | close        save and exit
  h | help | ?            show this help";

/// A successfully parsed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedInput {
    Event(AnnotationEvent),
    Help,
    Empty,
}

/// Parse one raw input line, rejecting invalid UTF-8.
pub fn parse_bytes(line: &[u8]) -> Result<ParsedInput, InputError> {
    std::str::from_utf8(line)
        .map_err(|_| InputError::NotUtf8)
        .and_then(parse_line)
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<ParsedInput, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(ParsedInput::Empty);
    };

    let event = match command.to_ascii_lowercase().as_str() {
        "a" | "p" | "prev" | "left" => AnnotationEvent::Prev,
        "d" | "n" | "next" | "right" => AnnotationEvent::Next,
        "q" | "quit" | "close" => AnnotationEvent::Close,
        "h" | "help" | "?" => return Ok(ParsedInput::Help),
        "m" | "mark" | "click" => {
            let x = parse_coordinate(words.next(), "x")?;
            let y = parse_coordinate(words.next(), "y")?;
            if words.next().is_some() {
                return Err(InputError::TrailingInput(line.trim().to_string()));
            }
            AnnotationEvent::Mark(Point2D::new(x, y))
        }
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };

    Ok(ParsedInput::Event(event))
}

fn parse_coordinate(word: Option<&str>, axis: &'static str) -> Result<f64, InputError> {
    let word = word.ok_or(InputError::MissingCoordinate(axis))?;
    word.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::BadCoordinate {
            axis,
            value: word.to_string(),
        })
}

/// Errors for lines that do not map to an event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown command '{0}' (type 'help')")]
    UnknownCommand(String),

    #[error("Missing {0} coordinate")]
    MissingCoordinate(&'static str),

    #[error("Invalid {axis} coordinate '{value}'")]
    BadCoordinate { axis: &'static str, value: String },

    #[error("Unexpected trailing input in '{0}'")]
    TrailingInput(String),

    #[error("Ignoring a line that is not valid UTF-8")]
    NotUtf8,
}
