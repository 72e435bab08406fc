//! Fixtures and end to end tests for writerbuddy.

use std::collections::HashMap;
use std::fs;

use crate::config::Config;
use crate::fonts::{Font, FontMetrics, Glyph};
use crate::state::CursorStore;
use crate::units::{nearly_equal, Mm};
use crate::writer::Writer;
use crate::Error;

/// A tiny font with an `H`, an `i`, an `o` and an `&`.
pub const HI_FONT: &str = r##"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" version="1.1">
  <!-- Hand drawn test font -->
  <defs>
    <font id="hi" horiz-adv-x="600">
      <font-face font-family="Hi" units-per-em="1000" ascent="800" descent="-200"/>
      <missing-glyph horiz-adv-x="500" d="M 0 0 L 400 700"/>
      <glyph unicode="H" glyph-name="H" horiz-adv-x="500"
             d="M 0 0 L 0 700 M 400 0 L 400 700 M 0 350 L 400 350"/>
      <glyph unicode="i" glyph-name="i" horiz-adv-x="200" d="M 100 0 L 100 450 M 100 600 L 100 620"/>
      <glyph unicode="o" glyph-name="o" d="M 100 0 L 500 0 L 500 450 L 100 450 Z"/>
      <glyph unicode="&amp;" glyph-name="ampersand" horiz-adv-x="550" d="M 500 0 L 50 600 L 250 700 L 100 350 L 300 0"/>
      <glyph unicode="ff" glyph-name="f_f" horiz-adv-x="700" d="M 100 0 L 100 700 M 400 0 L 400 700"/>
      <glyph glyph-name="orphan" horiz-adv-x="300" d="M 0 0 L 300 0"/>
      <glyph unicode=" " glyph-name="space" horiz-adv-x="360"/>
    </font>
  </defs>
</svg>
"##;

/// A font whose space glyph can be drawn, and is wide.
pub const SPACED_FONT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <font horiz-adv-x="600">
    <font-face units-per-em="1000" ascent="800"/>
    <glyph unicode="H" horiz-adv-x="500" d="M 0 0 L 0 700 M 400 0 L 400 700 M 0 350 L 400 350"/>
    <glyph unicode="i" horiz-adv-x="200" d="M 100 0 L 100 450"/>
    <glyph unicode=" " horiz-adv-x="900" d="M 0 0 L 900 0"/>
  </font>
</svg>"#;

/// Creates a font where every capital letter has the same advance.
pub fn block_font(advance: f64) -> Font {
    let glyphs: HashMap<char, Glyph> = ('A'..='Z')
        .map(|c| {
            let glyph = Glyph {
                outline: String::from("M 0 0 L 0 700"),
                advance_width: advance,
            };
            (c, glyph)
        })
        .collect();

    Font::new(
        glyphs,
        FontMetrics {
            units_per_em: 1000.0,
            ascent: 800.0,
            default_advance_width: advance,
        },
    )
}

/// Creates a project in a temporary directory, with the test font.
fn project(config: &str) -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("fonts")).unwrap();
    fs::write(dir.path().join("fonts").join("strokes.svg"), HI_FONT).unwrap();

    let path = dir.path().join("writerbuddy.toml");
    fs::write(&path, config).unwrap();

    let config = Config::from_file(&path).unwrap();
    (dir, config)
}

#[test]
fn hi_is_written_at_the_top_of_a_fresh_page() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();

    let report = writer.write(&["Hi"], config.output_path(), &mut store).unwrap();
    let svg = fs::read_to_string(config.output_path()).unwrap();

    assert_eq!(report.lines, 1);
    assert_eq!(report.placements, 2);
    assert!(!report.wrapped_around);
    assert_eq!(svg.matches("<path ").count(), 2);
    assert!(svg.contains(
        r#"<path d="M 0 0 L 0 700 M 400 0 L 400 700 M 0 350 L 400 350" transform="matrix(0.006 0 0 -0.006 15 25.8)" />"#
    ));
    assert!(svg.contains(r#"transform="matrix(0.006 0 0 -0.006 18 25.8)""#));

    assert!(nearly_equal(report.cursor.0, 29.4));
    let saved = fs::read_to_string(config.state_path()).unwrap();
    assert_eq!(saved, r#"{"current_y":29.4}"#);
}

#[test]
fn unmapped_text_draws_nothing_but_moves_the_cursor() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();

    let report = writer.write(&["###"], config.output_path(), &mut store).unwrap();
    let svg = fs::read_to_string(config.output_path()).unwrap();

    assert_eq!(report.lines, 1);
    assert_eq!(report.placements, 0);
    assert!(!svg.contains("<path"));
    assert!(nearly_equal(store.load().0, 29.4));
}

#[test]
fn blank_input_keeps_the_cursor() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();
    store.save(Mm(100.0)).unwrap();

    let report = writer.write(&["", "  "], config.output_path(), &mut store).unwrap();

    assert_eq!(report.lines, 0);
    assert_eq!(store.load(), Mm(100.0));
    assert!(config.output_path().is_file());
}

#[test]
fn writes_continue_from_the_saved_cursor() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();

    writer.write(&["Hi"], config.output_path(), &mut config.cursor_store()).unwrap();

    // A new store reads what the previous one saved.
    let mut store = config.cursor_store();
    writer.write(&["iH"], config.output_path(), &mut store).unwrap();
    let svg = fs::read_to_string(config.output_path()).unwrap();

    let top = 29.4 + 800.0 * (6.0 / 1000.0);
    assert!(svg.contains(&format!("transform=\"matrix(0.006 0 0 -0.006 15 {})\"", top)));
    assert!(nearly_equal(store.load().0, 21.0 + 2.0 * 8.4));
}

#[test]
fn reset_brings_the_next_write_back_to_the_top() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();

    writer.write(&["Hi Hi", "Hi"], config.output_path(), &mut store).unwrap();
    store.reset().unwrap();
    assert_eq!(store.load(), config.page.start_y());

    writer.write(&["Hi"], config.output_path(), &mut store).unwrap();
    let svg = fs::read_to_string(config.output_path()).unwrap();
    assert!(svg.contains(r#"transform="matrix(0.006 0 0 -0.006 15 25.8)""#));
}

#[test]
fn glyphs_stay_on_the_page() {
    let (_dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();
    let texts: Vec<String> = (0..40).map(|i| format!("Hi o&H {}", i)).collect();

    for _ in 0..3 {
        writer.write(&texts, config.output_path(), &mut store).unwrap();
        let cursor = store.load();
        assert!(cursor >= config.page.start_y());
        assert!(cursor <= config.page.bottom() + config.page.line_height());
    }

    let page = &config.page;
    let laidout = crate::layout::engine::Layout::new(writer.font(), page, config.overflow)
        .layout(&writer.wrap(&texts), store.load());

    for placement in &laidout.placements {
        let (x, top) = placement.transform.apply(0.0, writer.font().metrics().ascent);
        assert!(x >= page.start_x());
        assert!(x <= page.start_x() + page.max_line_width);
        assert!(top >= page.start_y() - Mm(1e-9));
        assert!(top <= page.bottom() + Mm(1e-9));
    }
}

#[test]
fn failed_document_leaves_the_cursor_untouched() {
    let (dir, config) = project("");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();
    store.save(Mm(50.0)).unwrap();

    let output = dir.path().join("missing").join("page.svg");
    let result = writer.write(&["Hi"], &output, &mut store);

    assert!(matches!(result, Err(Error::DocumentWriteError(_, _))));
    assert_eq!(store.load(), Mm(50.0));
}

#[test]
fn missing_font_is_fatal() {
    let (dir, config) = project("font = \"fonts/none.svg\"");
    assert!(matches!(
        Writer::new(&config),
        Err(Error::FontLoadError(_))
    ));
    assert!(!dir.path().join("output_a4.svg").exists());
}

#[test]
fn truncate_drops_what_does_not_fit() {
    let (_dir, config) = project("overflow = \"truncate\"");
    let writer = Writer::new(&config).unwrap();
    let mut store = config.cursor_store();
    let texts: Vec<&str> = (0..35).map(|_| "H").collect();

    let report = writer.write(&texts, config.output_path(), &mut store).unwrap();

    assert_eq!(report.lines, 32);
    assert_eq!(report.dropped_lines, 3);
    assert!(report.wrapped_around);
    assert_eq!(store.load(), config.page.start_y());
}
