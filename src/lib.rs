//! This crate contains all the tools we need to turn text into single-stroke
//! vector drawings that a pen plotter can write on a page.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod config;
pub mod document;
pub mod fonts;
pub mod layout;
pub mod state;
pub mod units;
pub mod writer;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{error, fmt, io, result};

use crate::fonts::error::FontLoadError;

macro_rules! impl_from_error {
    ($type: ty, $variant: path, $from: ty) => {
        impl From<$from> for $type {
            fn from(e: $from) -> $type {
                $variant(e)
            }
        }
    };
}

/// The error type of the library.
#[derive(Debug)]
pub enum Error {
    /// Cannot read current directory.
    CannotReadCurrentDir,

    /// No writerbuddy.toml was found.
    NoConfigFile,

    /// The configuration file could not be parsed.
    ConfigError(toml::de::Error),

    /// The configuration could not be serialized.
    ConfigSerializeError(toml::ser::Error),

    /// The page geometry of the configuration is inconsistent.
    InvalidGeometry(String),

    /// The font could not be loaded.
    FontLoadError(FontLoadError),

    /// The output document could not be written.
    DocumentWriteError(PathBuf, io::Error),

    /// The cursor state could not be saved.
    StateWriteError(PathBuf, io::Error),

    /// Another io error occured.
    IoError(io::Error),
}

impl_from_error!(Error, Error::ConfigError, toml::de::Error);
impl_from_error!(Error, Error::ConfigSerializeError, toml::ser::Error);
impl_from_error!(Error, Error::FontLoadError, FontLoadError);
impl_from_error!(Error, Error::IoError, io::Error);

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CannotReadCurrentDir => write!(fmt, "cannot read current directory"),
            Error::NoConfigFile => write!(fmt, "no writerbuddy.toml was found"),
            Error::ConfigError(e) => write!(fmt, "invalid configuration: {}", e),
            Error::ConfigSerializeError(e) => write!(fmt, "cannot serialize configuration: {}", e),
            Error::InvalidGeometry(reason) => write!(fmt, "invalid page geometry: {}", reason),
            Error::FontLoadError(e) => write!(fmt, "{}", e),
            Error::DocumentWriteError(path, e) => {
                write!(fmt, "couldn't write document \"{}\": {}", path.display(), e)
            }
            Error::StateWriteError(path, e) => {
                write!(fmt, "couldn't save cursor state \"{}\": {}", path.display(), e)
            }
            Error::IoError(e) => write!(fmt, "an io error occured: {}", e),
        }
    }
}

impl error::Error for Error {}

/// The result type of the library.
pub type Result<T> = result::Result<T, Error>;
