//! This module contains everything related to font loading errors.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::{fmt, io};

use colored::*;

use crate::fonts::parser::Position;

/// The different reasons for which a font cannot be loaded.
#[derive(Debug)]
pub enum FontErrorKind {
    /// The font file cannot be read.
    Unreadable(io::Error),

    /// The markup cannot be split into elements.
    Malformed,

    /// A mandatory element is absent.
    MissingElement(&'static str),

    /// A numeric attribute does not hold a finite number.
    InvalidNumber {
        /// The name of the attribute.
        attribute: String,

        /// The raw value of the attribute.
        value: String,
    },

    /// The units per em are zero or negative.
    InvalidUnitsPerEm(f64),
}

impl FontErrorKind {
    /// Returns the title of the error.
    pub fn title(&self) -> String {
        match self {
            FontErrorKind::Unreadable(e) => format!("cannot read font: {}", e),
            FontErrorKind::Malformed => String::from("malformed font markup"),
            FontErrorKind::MissingElement(name) => format!("font has no <{}> element", name),
            FontErrorKind::InvalidNumber { attribute, .. } => {
                format!("invalid value for attribute {}", attribute)
            }
            FontErrorKind::InvalidUnitsPerEm(value) => {
                format!("units-per-em must be positive, found {}", value)
            }
        }
    }

    /// Returns the detail of the error, shown under the source line.
    pub fn detail(&self) -> String {
        match self {
            FontErrorKind::Malformed => String::from("cannot parse markup from here"),
            FontErrorKind::InvalidNumber { value, .. } => {
                format!("expected a number, found \"{}\"", value)
            }
            FontErrorKind::InvalidUnitsPerEm(_) => String::from("in this element"),
            _ => String::new(),
        }
    }

    /// Returns an optional note.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            FontErrorKind::MissingElement(_) => {
                Some("the font metrics live in the <font> and <font-face> elements of an svg font")
            }
            _ => None,
        }
    }
}

/// An error that occured while loading a font.
#[derive(Debug)]
pub struct FontLoadError {
    /// The path to the font, if it was loaded from a file.
    pub path: Option<PathBuf>,

    /// Where in the source the error occured.
    pub position: Option<Position>,

    /// The source line containing the error.
    pub line: Option<String>,

    /// The reason of the error.
    pub kind: FontErrorKind,
}

impl FontLoadError {
    /// Creates an error that is not tied to a position in the source.
    pub fn new(kind: FontErrorKind) -> FontLoadError {
        FontLoadError {
            path: None,
            position: None,
            line: None,
            kind,
        }
    }

    /// Creates an error located in the source content.
    pub fn located(kind: FontErrorKind, content: &str, position: Position) -> FontLoadError {
        let start = previous_new_line(content, position.offset);
        let end = next_new_line(content, position.offset);

        FontLoadError {
            path: None,
            position: Some(position),
            line: Some(content[start..end].trim_end_matches('\r').to_owned()),
            kind,
        }
    }

    /// Attaches the path of the font file to the error.
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> FontLoadError {
        self.path = Some(path.as_ref().to_owned());
        self
    }
}

impl fmt::Display for FontLoadError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let source = match &self.path {
            Some(path) => path.display().to_string(),
            None => String::from("<font>"),
        };

        writeln!(fmt, "{}{}", "error: ".bold().red(), self.kind.title().bold())?;

        match (&self.position, &self.line) {
            (Some(position), Some(line)) => {
                let line_number = format!("{} ", position.line);
                let space = replicate(' ', line_number.len() - 1);
                let margin = replicate(' ', position.column);

                writeln!(
                    fmt,
                    "{}{} {}:{}:{}",
                    space,
                    "-->".bold().blue(),
                    source,
                    position.line,
                    position.column
                )?;
                writeln!(fmt, "{} {}", space, "|".blue().bold())?;
                writeln!(fmt, "{} {}", &format!("{}|", line_number).blue().bold(), line)?;
                writeln!(
                    fmt,
                    "{} {}{}{} {}",
                    space,
                    "|".blue().bold(),
                    margin,
                    "^".bold().red(),
                    self.kind.detail().bold().red()
                )?;
                write!(fmt, "{} {}", space, "|".blue().bold())?;
            }
            _ => write!(fmt, " {} {}", "-->".bold().blue(), source)?,
        }

        if let Some(note) = self.kind.note() {
            write!(fmt, "\n {} {}{}", "=".blue().bold(), "note: ".bold(), note)?;
        }

        Ok(())
    }
}

impl Error for FontLoadError {}

/// Replicates a char n times.
fn replicate(c: char, n: usize) -> String {
    std::iter::repeat(c).take(n).collect()
}

/// Finds the byte following the previous \n, or 0.
fn previous_new_line(content: &str, byte: usize) -> usize {
    let byte = byte.min(content.len());
    content[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Finds the next \n byte, or the length of the content.
fn next_new_line(content: &str, byte: usize) -> usize {
    let byte = byte.min(content.len());
    content[byte..]
        .find('\n')
        .map(|i| byte + i)
        .unwrap_or_else(|| content.len())
}
