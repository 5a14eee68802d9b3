//! Text rendering seam
//!
//! Compositing glyph images into a line of handwriting is an external
//! engine. The registry hands it the active font's mapped glyphs and stores
//! whatever bytes come back under a content address.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::{Font, Glyph};

/// Character lookup over one font's mapped glyphs
pub struct GlyphLookup<'a> {
    font: &'a Font,
}

impl<'a> GlyphLookup<'a> {
    pub fn new(font: &'a Font) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &'a Font {
        self.font
    }

    /// First glyph (in extraction order) mapped to `c`
    pub fn get(&self, c: char) -> Option<&'a Glyph> {
        self.font.glyphs.iter().find(|g| g.mapped_char == Some(c))
    }
}

/// Renders text with a font's glyphs into image bytes
pub trait TextRenderer: Send + Sync {
    fn render(&self, text: &str, glyphs: &GlyphLookup<'_>) -> Result<Vec<u8>, String>;
}

/// Concatenates glyph images; whitespace becomes `SPACE`, characters
/// without a glyph are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatRenderer;

impl ConcatRenderer {
    pub const SPACE: &'static [u8] = b" ";
}

impl TextRenderer for ConcatRenderer {
    fn render(&self, text: &str, glyphs: &GlyphLookup<'_>) -> Result<Vec<u8>, String> {
        let mut out = Vec::new();
        let mut drawn = 0usize;
        for c in text.chars() {
            if c.is_whitespace() {
                out.extend_from_slice(Self::SPACE);
            } else if let Some(glyph) = glyphs.get(c) {
                out.extend_from_slice(&glyph.image);
                drawn += 1;
            } else {
                tracing::debug!("No glyph mapped for {:?} in {}", c, glyphs.font().id);
            }
        }
        if drawn == 0 {
            return Err("none of the characters have a mapped glyph".into());
        }
        Ok(out)
    }
}

/// Reference derived from the artifact bytes: 128 bits as 32 hex digits.
///
/// Built from the std hasher, so it is only stable within one process.
/// Fine for the in-memory artifact store, not for anything persisted.
pub fn content_address(bytes: &[u8]) -> String {
    let half = |salt: u8| {
        let mut hasher = DefaultHasher::new();
        salt.hash(&mut hasher);
        bytes.hash(&mut hasher);
        hasher.finish()
    };
    format!("{:016x}{:016x}", half(0), half(1))
}
