//! Full justification of multi-paragraph text
//!
//! Paragraphs are separated by blank lines. Inside a paragraph, lines are
//! filled greedily and every line except the last is stretched to exactly
//! the block width by widening the gaps between words.

use serde::Serialize;

use crate::metrics::TextMeasure;
use crate::wrap::{fill_lines, words};

/// A word drawn at its own x position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub text: String,
    pub x: f64,
}

/// Horizontal content of one line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Run {
    /// Left-aligned text drawn in one piece
    Plain { text: String, x: f64 },
    /// Words spread across the full width
    Justified { words: Vec<PlacedWord> },
}

impl Run {
    /// Words of the line joined by single spaces
    pub fn text(&self) -> String {
        match self {
            Run::Plain { text, .. } => text.clone(),
            Run::Justified { words } => words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A line at its baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub y: f64,
    pub run: Run,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JustifiedBlock {
    pub lines: Vec<PlacedLine>,
    /// Vertical cursor after the last line and paragraph spacing
    pub bottom: f64,
}

/// Split normalized text into paragraphs on runs of two or more newlines
fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let run_start = i;
            while i < bytes.len() && bytes[i] == b'\n' {
                i += 1;
            }
            if i - run_start >= 2 {
                out.push(&text[start..run_start]);
                start = i;
            }
        } else {
            i += 1;
        }
    }

    out.push(&text[start..]);
    out
}

/// Lay out `text` justified inside `[x, x + max_width]`, first baseline at `y`.
///
/// Every line advances the cursor by `line_height`, and every paragraph but
/// the last adds half a line height after itself. A paragraph without words
/// advances exactly one line height.
pub fn justify<M>(
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    line_height: f64,
    measure: &M,
) -> JustifiedBlock
where
    M: TextMeasure + ?Sized,
{
    let normalized = text.replace("\r\n", "\n");
    let paragraphs = paragraphs(&normalized);
    let space_width = measure.measure_width(" ");

    let mut lines = Vec::new();
    let mut cursor_y = y;

    for (index, paragraph) in paragraphs.iter().enumerate() {
        let paragraph_words = words(paragraph);
        if paragraph_words.is_empty() {
            cursor_y += line_height;
            continue;
        }

        let filled = fill_lines(&paragraph_words, max_width, |s| measure.measure_width(s));
        let last = filled.len() - 1;

        for (line_index, line_words) in filled.iter().enumerate() {
            let raw = line_words.join(" ");
            let run = if line_index == last || line_words.len() == 1 {
                Run::Plain { text: raw, x }
            } else {
                let gaps = (line_words.len() - 1) as f64;
                let per_gap = (max_width - measure.measure_width(&raw)) / gaps;
                let mut cursor_x = x;
                let words = line_words
                    .iter()
                    .map(|word| {
                        let placed = PlacedWord {
                            text: (*word).to_string(),
                            x: cursor_x,
                        };
                        cursor_x += measure.measure_width(word) + space_width + per_gap;
                        placed
                    })
                    .collect();
                Run::Justified { words }
            };

            lines.push(PlacedLine { y: cursor_y, run });
            cursor_y += line_height;
        }

        if index + 1 < paragraphs.len() {
            cursor_y += line_height * 0.5;
        }
    }

    JustifiedBlock {
        lines,
        bottom: cursor_y,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::metrics::FontMetrics;
    use proptest::prelude::*;

    fn paragraph_text() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Záçõ]{1,12}", 1..60).prop_map(|w| w.join(" "))
    }

    fn body_text() -> impl Strategy<Value = String> {
        prop::collection::vec(paragraph_text(), 1..4).prop_map(|p| p.join("\n\n"))
    }

    proptest! {
        /// Property: every justified line ends exactly at the right edge
        #[test]
        fn justified_lines_span_full_width(text in body_text(), width in 60.0f64..200.0) {
            let metrics = FontMetrics::times_roman(12.0);
            let x = 20.0;
            let block = justify(&text, x, 0.0, width, 6.0, &metrics);

            for line in &block.lines {
                if let Run::Justified { words } = &line.run {
                    let last = words.last().unwrap();
                    let right = last.x + metrics.measure_width(&last.text);
                    prop_assert!((right - (x + width)).abs() < 1e-6);
                    prop_assert!(words.windows(2).all(|w| w[0].x < w[1].x));
                }
            }
        }

        /// Property: plain lines of a multi-line paragraph fit unless they hold one word
        #[test]
        fn plain_lines_fit(text in body_text(), width in 60.0f64..200.0) {
            let metrics = FontMetrics::times_roman(12.0);
            let block = justify(&text, 0.0, 0.0, width, 6.0, &metrics);

            for line in &block.lines {
                if let Run::Plain { text, .. } = &line.run {
                    let single_word = !text.contains(' ');
                    prop_assert!(single_word || metrics.measure_width(text) <= width);
                }
            }
        }

        /// Property: the word sequence survives layout unchanged
        #[test]
        fn words_are_preserved(text in body_text(), width in 30.0f64..200.0) {
            let metrics = FontMetrics::times_roman(12.0);
            let block = justify(&text, 0.0, 0.0, width, 6.0, &metrics);
            let laid_out: Vec<String> = block
                .lines
                .iter()
                .flat_map(|l| l.run.text().split(' ').map(str::to_string).collect::<Vec<_>>())
                .collect();
            let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
            prop_assert_eq!(laid_out, expected);
        }

        /// Property: bottom = lines * line_height + (paragraphs - 1) * line_height / 2
        #[test]
        fn bottom_accounts_for_lines_and_gaps(
            paragraphs in prop::collection::vec(paragraph_text(), 1..5),
            width in 60.0f64..200.0,
        ) {
            let metrics = FontMetrics::times_roman(12.0);
            let text = paragraphs.join("\n\n");
            let block = justify(&text, 0.0, 0.0, width, 6.0, &metrics);
            let expected = block.lines.len() as f64 * 6.0 + (paragraphs.len() - 1) as f64 * 3.0;
            prop_assert!((block.bottom - expected).abs() < 1e-9);
        }
    }
}
