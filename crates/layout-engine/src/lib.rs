//! Text measurement and justified paragraph layout
//!
//! Layout works in abstract units supplied by a [`TextMeasure`]. The
//! built-in [`FontMetrics`] measures the Base-14 Times faces in millimetres,
//! which is what page assembly uses.

pub mod justify;
pub mod metrics;
pub mod wrap;

pub use justify::{justify, JustifiedBlock, PlacedLine, PlacedWord, Run};
pub use metrics::{BaseFont, FontMetrics, TextMeasure, Unit, PT_PER_MM};
pub use wrap::{fill_lines, greedy_wrap, words};
