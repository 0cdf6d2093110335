//! Change-of-residency term documents
//!
//! Ties the workspace together: a template and live values go in, a
//! resolved record, a laid-out A4 page and a PDF come out.
//!
//! ```text
//! Template + FieldValues ──resolve──▶ ResolvedDocument ──layout──▶ PageDescription ──▶ PDF
//! ```

pub mod assemble;
pub mod page;
pub mod pdf;

pub use assemble::{
    assemble, assemble_resolved, clean_signer_text, filename, resolve_for_export,
    AssembledDocument, DEFAULT_FILENAME_STEM, SIGNATURE_CAPTION,
};
pub use page::{FontSpec, PageDescription, PageSetup, Rule, SignatureBlock, TextItem};
pub use pdf::{encode_win_ansi, render_pdf, PdfError};
