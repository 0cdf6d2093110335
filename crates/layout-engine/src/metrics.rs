//! Text measurement
//!
//! Widths come from the Adobe font metrics of the PDF Base-14 Times faces,
//! so measurements agree with what a viewer renders for the standard fonts
//! without embedding anything.

use serde::{Deserialize, Serialize};

use crate::wrap::greedy_wrap;

/// Points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Glyph width used for characters outside the tables, in 1/1000 em
const FALLBACK_WIDTH: u16 = 500;

/// Width source for layout.
///
/// Implementations must be additive: the width of a concatenation is the
/// sum of the widths of its parts.
pub trait TextMeasure {
    fn measure_width(&self, text: &str) -> f64;

    /// Split `text` into lines no wider than `max_width`.
    ///
    /// Explicit newlines always break; blank lines are kept as empty
    /// strings. A single word wider than `max_width` gets a line of its own.
    fn wrap_to_width(&self, text: &str, max_width: f64) -> Vec<String> {
        greedy_wrap(text, max_width, |line| self.measure_width(line))
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure_width(&self, text: &str) -> f64 {
        (**self).measure_width(text)
    }

    fn wrap_to_width(&self, text: &str, max_width: f64) -> Vec<String> {
        (**self).wrap_to_width(text, max_width)
    }
}

/// Base-14 faces with built-in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseFont {
    TimesRoman,
    TimesBold,
}

impl BaseFont {
    /// PostScript name as written in the PDF font dictionary
    pub fn postscript_name(self) -> &'static str {
        match self {
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::TimesBold => "Times-Bold",
        }
    }

    /// Advance width of `ch` in 1/1000 em
    pub fn glyph_width(self, ch: char) -> u16 {
        let ch = fold_accent(ch);
        let code = ch as u32;
        if (0x20..=0x7e).contains(&code) {
            let table = match self {
                BaseFont::TimesRoman => &TIMES_ROMAN_ASCII,
                BaseFont::TimesBold => &TIMES_BOLD_ASCII,
            };
            return table[(code - 0x20) as usize];
        }

        let bold = self == BaseFont::TimesBold;
        match ch {
            '\u{a0}' => 250,
            '§' | '«' | '»' | '–' | '€' => 500,
            '°' => 400,
            'ª' => {
                if bold {
                    300
                } else {
                    276
                }
            }
            'º' => {
                if bold {
                    330
                } else {
                    310
                }
            }
            '‘' | '’' => 333,
            '“' | '”' => {
                if bold {
                    500
                } else {
                    444
                }
            }
            '•' => 350,
            '—' | '…' => 1000,
            _ => FALLBACK_WIDTH,
        }
    }
}

/// Unit in which measurements are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Point,
    Millimetre,
}

impl Unit {
    pub fn from_points(self, points: f64) -> f64 {
        match self {
            Unit::Point => points,
            Unit::Millimetre => points / PT_PER_MM,
        }
    }

    pub fn to_points(self, value: f64) -> f64 {
        match self {
            Unit::Point => value,
            Unit::Millimetre => value * PT_PER_MM,
        }
    }
}

/// A base font at a point size, measuring in `unit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    pub font: BaseFont,
    /// Size in points
    pub size: f64,
    pub unit: Unit,
}

impl FontMetrics {
    /// Metrics in millimetres
    pub fn new(font: BaseFont, size: f64) -> Self {
        Self {
            font,
            size,
            unit: Unit::Millimetre,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn times_roman(size: f64) -> Self {
        Self::new(BaseFont::TimesRoman, size)
    }

    pub fn times_bold(size: f64) -> Self {
        Self::new(BaseFont::TimesBold, size)
    }

    pub fn char_width(&self, ch: char) -> f64 {
        self.unit
            .from_points(f64::from(self.font.glyph_width(ch)) * self.size / 1000.0)
    }
}

impl TextMeasure for FontMetrics {
    fn measure_width(&self, text: &str) -> f64 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(self.font.glyph_width(ch)))
            .sum();
        self.unit.from_points(f64::from(units) * self.size / 1000.0)
    }
}

/// Accented Latin-1 letters are measured as their base letter
fn fold_accent(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => ch,
    }
}

// Times-Roman widths for 0x20..=0x7E
#[rustfmt::skip]
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

// Times-Bold widths for 0x20..=0x7E
#[rustfmt::skip]
const TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: width is additive over concatenation
        #[test]
        fn width_is_additive(a in "\\PC{0,20}", b in "\\PC{0,20}", size in 6.0f64..30.0) {
            let m = FontMetrics::times_roman(size);
            let joined = format!("{}{}", a, b);
            let diff = m.measure_width(&joined) - (m.measure_width(&a) + m.measure_width(&b));
            prop_assert!(diff.abs() < 1e-9);
        }

        /// Property: bold text is never narrower than the same text in roman
        /// for plain lowercase words
        #[test]
        fn bold_not_narrower_for_lowercase(word in "[a-z]{1,12}") {
            let roman = FontMetrics::times_roman(12.0).measure_width(&word);
            let bold = FontMetrics::times_bold(12.0).measure_width(&word);
            prop_assert!(bold >= roman);
        }
    }
}
