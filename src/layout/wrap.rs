//! Greedy line wrapping of raw text.
//!
//! Words are never split: a line is flushed as soon as the next word would
//! make it wider than the allowed width, and a word that is wider than the
//! allowed width on its own gets a line for itself.

use crate::fonts::Font;
use crate::layout::constants::{SPACE, SPACE_RATIO};
use crate::units::Mm;

/// A line of words that fits in the width it was wrapped for, unless it is
/// made of a single word too wide to fit anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    /// The words of the line.
    pub words: Vec<String>,

    /// The rendered width of the line, spaces included.
    pub width: Mm,
}

impl WrappedLine {
    /// Returns the text of the line, words separated by single spaces.
    pub fn text(&self) -> String {
        self.words.join(&SPACE.to_string())
    }
}

/// Wraps a text into lines no wider than `max_width`.
pub fn wrap(text: &str, font: &Font, text_height: Mm, max_width: Mm) -> Vec<WrappedLine> {
    let space_width = text_height * SPACE_RATIO;

    let mut lines = vec![];
    let mut current_words: Vec<String> = vec![];
    let mut current_width = Mm(0.0);

    for word in text.split_whitespace() {
        let word_width = font.text_width(word, text_height);

        if current_words.is_empty() {
            current_words.push(word.to_owned());
            current_width = word_width;
        } else if current_width + space_width + word_width <= max_width {
            current_words.push(word.to_owned());
            current_width += space_width + word_width;
        } else {
            lines.push(WrappedLine {
                words: current_words,
                width: current_width,
            });
            current_words = vec![word.to_owned()];
            current_width = word_width;
        }
    }

    if !current_words.is_empty() {
        lines.push(WrappedLine {
            words: current_words,
            width: current_width,
        });
    }

    lines
}

/// Wraps every text independently, keeping the lines in order.
pub fn wrap_all<S: AsRef<str>>(
    texts: &[S],
    font: &Font,
    text_height: Mm,
    max_width: Mm,
) -> Vec<WrappedLine> {
    texts
        .iter()
        .flat_map(|text| wrap(text.as_ref(), font, text_height, max_width))
        .collect()
}

/// Splits a text into chunks of at most `max_words` words.
///
/// A `max_words` of zero keeps the text in one chunk.
pub fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.is_empty() {
        return vec![];
    }

    if max_words == 0 {
        return vec![words.join(" ")];
    }

    words.chunks(max_words).map(|chunk| chunk.join(" ")).collect()
}
