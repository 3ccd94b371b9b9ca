//! Math typesetting seam.
//!
//! LaTeX typesetting happens outside the engine. The assembler only asks for an
//! image and falls back to literal source text when none comes back.

use folio_core::Rgba;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathStyle {
    /// Inline with surrounding text, baseline-aligned.
    Inline,
    /// A standalone display equation.
    Display,
}

/// A typeset equation ready to be embedded in the buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct MathImage {
    pub width: f32,
    pub height: f32,
    /// Distance from the bottom of the image to the text baseline.
    pub baseline_offset: f32,
    /// Encoded image bytes, opaque to the engine.
    pub data: Arc<[u8]>,
}

pub trait MathTypesetter {
    /// Typeset `latex`, or `None` if the source is invalid or typesetting failed.
    fn typeset(&self, latex: &str, font_size: f32, color: Rgba, style: MathStyle) -> Option<MathImage>;
}
