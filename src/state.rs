//! Persistence of the vertical cursor between two writes.
//!
//! Writing sessions are short lived processes: the cursor must survive them
//! so that the next write goes below the previous one instead of over it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::units::Mm;
use crate::{Error, Result};

/// The record written to the cursor file.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
struct CursorRecord {
    /// The vertical position of the next line, in millimeters.
    current_y: f64,
}

/// Something able to remember where the next line goes.
pub trait CursorStore {
    /// Returns the stored cursor, or the start of the page if there is none.
    fn load(&self) -> Mm;

    /// Replaces the stored cursor.
    ///
    /// A cursor that is not a finite number is an error, and leaves the
    /// stored cursor as it was.
    fn save(&mut self, y: Mm) -> Result<()>;

    /// Moves the stored cursor back to the start of the page.
    fn reset(&mut self) -> Result<()>;
}

/// Checks that a cursor can be stored.
fn check_finite(y: Mm, path: &Path) -> Result<()> {
    if y.is_finite() {
        Ok(())
    } else {
        Err(Error::StateWriteError(
            path.to_owned(),
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a position", y.0),
            ),
        ))
    }
}

/// A cursor store backed by a small json file.
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    /// The path of the json file.
    path: PathBuf,

    /// The cursor to use when nothing valid is stored.
    start_y: Mm,
}

impl FileCursorStore {
    /// Creates a store using the file at `path`.
    pub fn new<P: AsRef<Path>>(path: P, start_y: Mm) -> FileCursorStore {
        FileCursorStore {
            path: path.as_ref().to_owned(),
            start_y,
        }
    }

    /// Returns the path of the cursor file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path where records are written before replacing the cursor file.
    fn temporary_path(&self) -> PathBuf {
        let mut temporary = self.path.clone().into_os_string();
        temporary.push(".tmp");
        PathBuf::from(temporary)
    }

    /// Reads the cursor, failing if the file is missing or corrupt.
    fn read(&self) -> std::result::Result<Mm, String> {
        let content = fs::read_to_string(&self.path).map_err(|e| e.to_string())?;
        let record: CursorRecord = serde_json::from_str(&content).map_err(|e| e.to_string())?;

        if record.current_y.is_finite() {
            Ok(Mm(record.current_y))
        } else {
            Err(format!("{} is not a position", record.current_y))
        }
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Mm {
        if !self.path.exists() {
            debug!("no cursor saved in \"{}\"", self.path.display());
            return self.start_y;
        }

        match self.read() {
            Ok(y) => y,
            Err(e) => {
                warn!(
                    "ignoring unreadable cursor \"{}\": {}",
                    self.path.display(),
                    e
                );
                self.start_y
            }
        }
    }

    fn save(&mut self, y: Mm) -> Result<()> {
        check_finite(y, &self.path)?;

        let error = |e: io::Error| Error::StateWriteError(self.path.clone(), e);
        let content =
            serde_json::to_string(&CursorRecord { current_y: y.0 }).map_err(|e| error(e.into()))?;

        // Readers must never see a partially written record.
        let temporary = self.temporary_path();
        fs::write(&temporary, content).map_err(error)?;

        if let Err(e) = fs::rename(&temporary, &self.path) {
            fs::remove_file(&temporary).ok();
            return Err(error(e));
        }

        debug!("saved cursor {:?} to \"{}\"", y, self.path.display());
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let start_y = self.start_y;
        self.save(start_y)
    }
}

/// A cursor store that lives as long as the process.
#[derive(Debug, Clone)]
pub struct MemoryCursorStore {
    current_y: Option<Mm>,
    start_y: Mm,
}

impl MemoryCursorStore {
    /// Creates an empty store.
    pub fn new(start_y: Mm) -> MemoryCursorStore {
        MemoryCursorStore {
            current_y: None,
            start_y,
        }
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Mm {
        self.current_y.unwrap_or(self.start_y)
    }

    fn save(&mut self, y: Mm) -> Result<()> {
        check_finite(y, Path::new("<memory>"))?;
        self.current_y = Some(y);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.current_y = Some(self.start_y);
        Ok(())
    }
}
