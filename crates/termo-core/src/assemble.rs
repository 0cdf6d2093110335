//! Document assembly: resolve a template and lay it out on the page

use lazy_static::lazy_static;
use layout_engine::{justify, TextMeasure};
use placeholder_engine::{FieldValues, Resolver};
use regex::Regex;
use serde::Serialize;
use shared_types::{ResolvedDocument, Template};
use tracing::debug;

use crate::page::{FontSpec, PageDescription, PageSetup, Rule, SignatureBlock, TextItem};

/// Caption printed under each signature
pub const SIGNATURE_CAPTION: &str = "Assinatura";

/// Filename stem used when the title is blank
pub const DEFAULT_FILENAME_STEM: &str = "document";

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// A laid-out page plus what gets logged and how the file is named
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledDocument {
    pub page: PageDescription,
    pub record: ResolvedDocument,
    pub filename: String,
}

/// Drop signer lines that only repeat the caption, which is drawn anyway
pub fn clean_signer_text(text: &str) -> String {
    let caption = SIGNATURE_CAPTION.to_lowercase();
    text.split('\n')
        .filter(|line| line.trim().to_lowercase() != caption)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercased title with whitespace runs replaced by `_`, plus `.pdf`
pub fn filename(title: &str) -> String {
    let stem = if title.trim().is_empty() {
        DEFAULT_FILENAME_STEM
    } else {
        title
    };
    format!("{}.pdf", WHITESPACE_RUN.replace_all(&stem.to_lowercase(), "_"))
}

/// Resolve every field of `template` for export.
///
/// Signer texts lose their caption lines before resolution, so a caption
/// typed into a signer field is never printed twice.
pub fn resolve_for_export(
    template: &Template,
    values: &FieldValues,
    resolver: &Resolver,
) -> ResolvedDocument {
    ResolvedDocument {
        title: resolver.resolve(&template.title, values),
        body: resolver.resolve(&template.body, values),
        signer1: resolver.resolve(&clean_signer_text(&template.signer1), values),
        signer2: resolver.resolve(&clean_signer_text(&template.signer2), values),
    }
}

/// Resolve `template` with `values` and lay it out
pub fn assemble(
    template: &Template,
    values: &FieldValues,
    resolver: &Resolver,
    setup: &PageSetup,
) -> AssembledDocument {
    let record = resolve_for_export(template, values, resolver);
    assemble_resolved(&record, setup)
}

/// Lay out an already resolved document
pub fn assemble_resolved(record: &ResolvedDocument, setup: &PageSetup) -> AssembledDocument {
    let page = layout_page(record, setup);
    debug!(
        title = %record.title,
        body_lines = page.body.lines.len(),
        signature_top = page.signature_top,
        "Assembled page"
    );

    AssembledDocument {
        page,
        record: record.clone(),
        filename: filename(&record.title),
    }
}

fn centered(text: &str, center_x: f64, y: f64, font: FontSpec, gray: u8) -> TextItem {
    let width = font.metrics().measure_width(text);
    TextItem {
        text: text.to_string(),
        x: center_x - width / 2.0,
        y,
        font,
        gray,
    }
}

fn layout_page(record: &ResolvedDocument, setup: &PageSetup) -> PageDescription {
    let mut y = setup.margin;

    // The title is a single line; embedded newlines are drawn as spaces
    let title_text = record.title.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = centered(&title_text, setup.page_width / 2.0, y, setup.title_font, 0);
    y += setup.title_gap;

    let body = justify(
        &record.body,
        setup.margin,
        y,
        setup.content_width(),
        setup.line_height,
        &setup.body_font.metrics(),
    );

    let signature_top =
        (body.bottom + setup.signature_gap).max(setup.page_height - setup.footer_reserve);
    let column = setup.column_width();
    let signatures = vec![
        signature_block(&record.signer1, setup.margin, signature_top, setup),
        signature_block(&record.signer2, setup.margin + column, signature_top, setup),
    ];

    PageDescription {
        width: setup.page_width,
        height: setup.page_height,
        title,
        body_font: setup.body_font,
        body,
        signature_top,
        signatures,
    }
}

fn signature_block(signer: &str, left: f64, rule_y: f64, setup: &PageSetup) -> SignatureBlock {
    let column = setup.column_width();
    let center_x = left + column / 2.0;
    let rule = Rule {
        x1: left + setup.rule_inset,
        x2: left + column - setup.rule_inset,
        y: rule_y,
    };

    let mut text_y = rule_y + setup.signer_offset;
    let mut lines = Vec::new();
    for line in setup
        .signer_font
        .metrics()
        .wrap_to_width(signer, setup.signer_width())
    {
        lines.push(centered(&line, center_x, text_y, setup.signer_font, 0));
        text_y += setup.signer_line_height;
    }

    let caption = centered(
        SIGNATURE_CAPTION,
        center_x,
        text_y + setup.caption_gap,
        setup.caption_font,
        setup.caption_gray,
    );

    SignatureBlock {
        rule,
        center_x,
        lines,
        caption,
    }
}
