//! Page geometry and the laid-out page
//!
//! All coordinates are millimetres from the top-left corner of the page;
//! `y` of a text item is its baseline.

use layout_engine::{BaseFont, FontMetrics, JustifiedBlock, Run};
use serde::Serialize;

/// Font face and size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontSpec {
    pub font: BaseFont,
    pub size: f64,
}

impl FontSpec {
    pub const fn new(font: BaseFont, size: f64) -> Self {
        Self { font, size }
    }

    /// Metrics in millimetres
    pub fn metrics(&self) -> FontMetrics {
        FontMetrics::new(self.font, self.size)
    }
}

/// Page layout constants
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSetup {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub title_font: FontSpec,
    /// Space between the title baseline and the first body baseline
    pub title_gap: f64,
    pub body_font: FontSpec,
    pub line_height: f64,
    /// Minimum space between the body and the signature rules
    pub signature_gap: f64,
    /// Signature rules never sit higher than this distance from the bottom edge
    pub footer_reserve: f64,
    /// Horizontal inset of the signature rule inside its column
    pub rule_inset: f64,
    /// Stroke width of the signature rules
    pub rule_width: f64,
    pub signer_font: FontSpec,
    /// First signer baseline below the rule
    pub signer_offset: f64,
    pub signer_line_height: f64,
    pub caption_font: FontSpec,
    /// Caption baseline below the cursor after the last signer line
    pub caption_gap: f64,
    /// Caption fill gray, 0 = black, 255 = white
    pub caption_gray: u8,
}

impl Default for PageSetup {
    /// A4 portrait with a 20 mm margin
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            title_font: FontSpec::new(BaseFont::TimesBold, 14.0),
            title_gap: 10.0,
            body_font: FontSpec::new(BaseFont::TimesRoman, 12.0),
            line_height: 6.0,
            signature_gap: 16.0,
            footer_reserve: 60.0,
            rule_inset: 8.0,
            rule_width: 0.2,
            signer_font: FontSpec::new(BaseFont::TimesRoman, 11.0),
            signer_offset: 6.0,
            signer_line_height: 5.0,
            caption_font: FontSpec::new(BaseFont::TimesRoman, 10.0),
            caption_gap: 2.0,
            caption_gray: 100,
        }
    }
}

impl PageSetup {
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Width of each of the two signature columns
    pub fn column_width(&self) -> f64 {
        self.content_width() / 2.0
    }

    /// Width available to signer text inside a column
    pub fn signer_width(&self) -> f64 {
        self.column_width() - 2.0 * self.rule_inset
    }
}

/// A run of text drawn from its left edge at a baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: FontSpec,
    pub gray: u8,
}

/// Horizontal line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureBlock {
    pub rule: Rule,
    /// Centre of the column
    pub center_x: f64,
    pub lines: Vec<TextItem>,
    pub caption: TextItem,
}

/// Everything drawn on the single page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDescription {
    pub width: f64,
    pub height: f64,
    pub title: TextItem,
    pub body_font: FontSpec,
    pub body: JustifiedBlock,
    pub signature_top: f64,
    pub signatures: Vec<SignatureBlock>,
}

impl PageDescription {
    /// Every text run in drawing order: title, body, then signatures
    pub fn text_items(&self) -> Vec<TextItem> {
        let mut items = vec![self.title.clone()];

        for line in &self.body.lines {
            match &line.run {
                Run::Plain { text, x } => items.push(self.body_item(text, *x, line.y)),
                Run::Justified { words } => {
                    items.extend(words.iter().map(|w| self.body_item(&w.text, w.x, line.y)))
                }
            }
        }

        for block in &self.signatures {
            items.extend(block.lines.iter().cloned());
            items.push(block.caption.clone());
        }
        items
    }

    pub fn rules(&self) -> Vec<&Rule> {
        self.signatures.iter().map(|block| &block.rule).collect()
    }

    fn body_item(&self, text: &str, x: f64, y: f64) -> TextItem {
        TextItem {
            text: text.to_string(),
            x,
            y,
            font: self.body_font,
            gray: 0,
        }
    }
}
