//! This module defines the configuration of a writerbuddy project. The
//! configuration is parsed from a TOML file named `writerbuddy.toml`
//! located at the root of the project. Every measurement takes a default
//! value matching an A4 page.

use std::fs;
use std::path::{Path, PathBuf};
use std::{fmt, result};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fonts::BUILTIN_FONT;
use crate::layout::constants::SPACE_RATIO;
use crate::layout::engine::Overflow;
use crate::state::FileCursorStore;
use crate::units::Mm;
use crate::{Error, Result};

/// The name of the configuration file of a project.
pub const CONFIG_FILE: &str = "writerbuddy.toml";

/// Serializes a `Mm` structure.
// This is required to use in macro `serialize_with`.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_mm<S: Serializer>(mm: &Mm, serializer: S) -> result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(mm.0)
}

/// Deserializes a `Mm` structure.
pub fn deserialize_mm<'a, D: Deserializer<'a>>(deserializer: D) -> result::Result<Mm, D::Error> {
    deserializer.deserialize_f64(MmVisitor)
}

macro_rules! visit_from {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Mm(f64::from(value)))
        }
    };
}

macro_rules! visit_as {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Mm(value as f64))
        }
    };
}

/// Visitor for the `Mm` structure, so that lengths can be written as
/// integers in the configuration file.
pub struct MmVisitor;

impl<'a> Visitor<'a> for MmVisitor {
    type Value = Mm;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a length in millimeters")
    }

    visit_from!(visit_u8, u8);
    visit_from!(visit_u16, u16);
    visit_from!(visit_u32, u32);
    visit_as!(visit_u64, u64);
    visit_from!(visit_i8, i8);
    visit_from!(visit_i16, i16);
    visit_from!(visit_i32, i32);
    visit_as!(visit_i64, i64);
    visit_from!(visit_f32, f32);
    visit_from!(visit_f64, f64);
}

/// The fixed geometry of the page we write on.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// The width of the page.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub width: Mm,

    /// The height of the page.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub height: Mm,

    /// The margin, on every side of the page.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub margin: Mm,

    /// The maximal width of a line of text.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub max_line_width: Mm,

    /// The height of the text.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub text_height: Mm,

    /// The distance between two lines, relative to the text height.
    pub line_spacing: f64,

    /// The width of the pen strokes.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub stroke_width: Mm,
}

impl Default for PageGeometry {
    fn default() -> PageGeometry {
        PageGeometry {
            width: Mm(210.0),
            height: Mm(297.0),
            margin: Mm(15.0),
            max_line_width: Mm(180.0),
            text_height: Mm(6.0),
            line_spacing: 1.4,
            stroke_width: Mm(0.5),
        }
    }
}

impl PageGeometry {
    /// Checks that the geometry describes a page we can write on.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("width", self.width),
            ("height", self.height),
            ("margin", self.margin),
            ("max_line_width", self.max_line_width),
            ("text_height", self.text_height),
            ("stroke_width", self.stroke_width),
        ];

        for (name, length) in lengths.iter() {
            if !length.is_finite() || *length < Mm(0.0) {
                return Err(Error::InvalidGeometry(format!(
                    "{} must be a non negative length, found {:?}",
                    name, length
                )));
            }
        }

        if self.text_height <= Mm(0.0) {
            return Err(Error::InvalidGeometry(String::from(
                "text_height must be positive",
            )));
        }

        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "line_spacing must be positive, found {}",
                self.line_spacing
            )));
        }

        let printable = self.width - self.margin * 2.0;
        if self.max_line_width > printable {
            return Err(Error::InvalidGeometry(format!(
                "max_line_width ({:?}) exceeds the printable width ({:?})",
                self.max_line_width, printable
            )));
        }

        if self.start_y() > self.bottom() {
            return Err(Error::InvalidGeometry(String::from(
                "the page is too short to hold a single line",
            )));
        }

        Ok(())
    }

    /// The horizontal position where every line starts.
    pub fn start_x(&self) -> Mm {
        self.margin
    }

    /// The top of the first line of a page.
    ///
    /// Like every cursor, it is the top of a line: the glyph baselines sit
    /// one ascent below it.
    pub fn start_y(&self) -> Mm {
        self.margin + self.text_height
    }

    /// The lowest line top allowed before going back to the top of the page.
    pub fn bottom(&self) -> Mm {
        self.height - self.margin
    }

    /// The distance between the tops of two consecutive lines.
    pub fn line_height(&self) -> Mm {
        self.text_height * self.line_spacing
    }

    /// The width of a space between two words.
    pub fn space_width(&self) -> Mm {
        self.text_height * SPACE_RATIO
    }
}

/// Holds the configuration of a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The title of the project.
    pub title: String,

    /// The path to the svg font.
    pub font: PathBuf,

    /// The path of the generated document.
    pub output: PathBuf,

    /// The path of the file holding the cursor.
    pub state: PathBuf,

    /// What to do when the text reaches the bottom of the page.
    pub overflow: Overflow,

    /// Maximal number of words per input line before wrapping, 0 to disable.
    pub max_words: usize,

    /// The geometry of the page.
    pub page: PageGeometry,

    /// The directory relative paths are resolved against.
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config::with_title("writerbuddy")
    }
}

impl Config {
    /// Creates a default configuration with a title.
    pub fn with_title(title: &str) -> Config {
        Config {
            title: String::from(title),
            font: PathBuf::from("fonts/strokes.svg"),
            output: PathBuf::from("output_a4.svg"),
            state: PathBuf::from("text_state.json"),
            overflow: Overflow::Recycle,
            max_words: 0,
            page: PageGeometry::default(),
            root: PathBuf::new(),
        }
    }

    /// Creates a default project in `dir`, with the embedded font.
    ///
    /// Returns false and leaves the directory alone if it already holds a
    /// project. An existing font file is kept as it is.
    pub fn init<P: AsRef<Path>>(dir: P, title: &str) -> Result<bool> {
        let dir = dir.as_ref();
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            warn!("\"{}\" already exists, leaving it", config_path.display());
            return Ok(false);
        }

        let config = Config::with_title(title);
        fs::create_dir_all(dir)?;

        let font_path = dir.join(&config.font);
        if font_path.exists() {
            warn!("\"{}\" already exists, leaving it", font_path.display());
        } else {
            if let Some(parent) = font_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&font_path, BUILTIN_FONT)?;
        }

        fs::write(&config_path, config.to_toml()?)?;
        Ok(true)
    }

    /// Looks for a configuration file in a directory or its parents.
    pub fn find<P: AsRef<Path>>(start: P) -> Result<PathBuf> {
        let mut current_dir = start.as_ref().to_owned();

        loop {
            current_dir.push(CONFIG_FILE);

            if current_dir.is_file() {
                return Ok(current_dir);
            }

            // Remove writerbuddy.toml
            current_dir.pop();

            // Go to the parent directory
            if !current_dir.pop() {
                return Err(Error::NoConfigFile);
            }
        }
    }

    /// Reads and validates a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.root = path.parent().map(Path::to_owned).unwrap_or_default();
        config.page.validate()?;

        debug!("loaded configuration from \"{}\"", path.display());
        Ok(config)
    }

    /// Serializes the configuration into TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Resolves a path of the configuration against the project root.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        }
    }

    /// The resolved path of the font.
    pub fn font_path(&self) -> PathBuf {
        self.resolve(&self.font)
    }

    /// The resolved path of the generated document.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    /// The resolved path of the cursor file.
    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.state)
    }

    /// Creates the cursor store of the project.
    pub fn cursor_store(&self) -> FileCursorStore {
        FileCursorStore::new(self.state_path(), self.page.start_y())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use test_case::test_case;

    use crate::config::{Config, PageGeometry, CONFIG_FILE};
    use crate::fonts::BUILTIN_FONT;
    use crate::layout::engine::Overflow;
    use crate::units::{nearly_equal, Mm};
    use crate::Error;

    #[test]
    fn default_geometry_is_valid() {
        let page = PageGeometry::default();
        assert!(page.validate().is_ok());
        assert_eq!(page.start_x(), Mm(15.0));
        assert_eq!(page.start_y(), Mm(21.0));
        assert_eq!(page.bottom(), Mm(282.0));
        assert!(nearly_equal(page.line_height().0, 8.4));
        assert!(nearly_equal(page.space_width().0, 3.6));
    }

    #[test_case(PageGeometry { max_line_width: Mm(181.0), ..PageGeometry::default() } ; "line wider than printable width")]
    #[test_case(PageGeometry { text_height: Mm(0.0), ..PageGeometry::default() } ; "zero text height")]
    #[test_case(PageGeometry { line_spacing: 0.0, ..PageGeometry::default() } ; "zero line spacing")]
    #[test_case(PageGeometry { margin: Mm(-1.0), ..PageGeometry::default() } ; "negative margin")]
    #[test_case(PageGeometry { height: Mm(30.0), ..PageGeometry::default() } ; "page too short")]
    #[test_case(PageGeometry { width: Mm(f64::NAN), ..PageGeometry::default() } ; "not a number")]
    fn inconsistent_geometry_is_rejected(page: PageGeometry) {
        assert!(matches!(page.validate(), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn parses_integer_and_float_lengths() {
        let config: Config = toml::from_str(
            r#"
            title = "notes"
            overflow = "truncate"

            [page]
            width = 148
            height = 210.0
            margin = 10
            max_line_width = 120.5
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "notes");
        assert_eq!(config.overflow, Overflow::Truncate);
        assert_eq!(config.page.width, Mm(148.0));
        assert_eq!(config.page.height, Mm(210.0));
        assert_eq!(config.page.max_line_width, Mm(120.5));
        // Missing values take their defaults.
        assert_eq!(config.page.text_height, Mm(6.0));
        assert_eq!(config.state, PathBuf::from("text_state.json"));
    }

    #[test]
    fn serialized_config_reads_back() {
        let config = Config::with_title("letters");
        let toml = config.to_toml().unwrap();
        let read: Config = toml::from_str(&toml).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn finds_config_in_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        let found = Config::find(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn relative_paths_are_resolved_against_the_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "output = \"out/page.svg\"\nfont = \"/usr/share/hand.svg\"").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output_path(), dir.path().join("out/page.svg"));
        assert_eq!(config.font_path(), PathBuf::from("/usr/share/hand.svg"));
        assert_eq!(config.state_path(), dir.path().join("text_state.json"));
    }

    #[test]
    fn init_creates_a_loadable_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("letters");

        assert!(Config::init(&root, "letters").unwrap());

        let config = Config::from_file(root.join(CONFIG_FILE)).unwrap();
        assert_eq!(config.title, "letters");
        assert_eq!(
            fs::read_to_string(config.font_path()).unwrap(),
            BUILTIN_FONT
        );
    }

    #[test]
    fn init_keeps_an_existing_font() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::write(dir.path().join("fonts").join("strokes.svg"), "my own font").unwrap();

        assert!(Config::init(dir.path(), "letters").unwrap());

        assert_eq!(
            fs::read_to_string(dir.path().join("fonts").join("strokes.svg")).unwrap(),
            "my own font"
        );
        assert!(dir.path().join(CONFIG_FILE).is_file());
    }

    #[test]
    fn init_leaves_an_existing_project_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title = \"mine\"").unwrap();

        assert!(!Config::init(dir.path(), "letters").unwrap());

        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            "title = \"mine\""
        );
        assert!(!dir.path().join("fonts").exists());
    }

    #[test]
    fn invalid_geometry_in_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[page]\nmax_line_width = 200").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(Error::InvalidGeometry(_))
        ));
    }
}
