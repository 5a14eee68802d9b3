//! Fonts and glyphs

use std::fmt;

use inkfont_net::api::{self, FontEntry, GlyphEntry};

/// Opaque font identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(String);

impl FontId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One extracted character image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Unique within its font, never changes
    pub filename: String,
    pub image_ref: String,
    pub image: Vec<u8>,
    pub mapped_char: Option<char>,
}

impl Glyph {
    pub fn to_entry(&self) -> GlyphEntry {
        GlyphEntry {
            filename: self.filename.clone(),
            image_url: self.image_ref.clone(),
            mapped_char: self.mapped_char.map(String::from),
        }
    }
}

/// A named glyph set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub id: FontId,
    pub name: String,
    /// Extraction order
    pub glyphs: Vec<Glyph>,
}

impl Font {
    pub fn glyph(&self, filename: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.filename == filename)
    }

    pub fn glyph_mut(&mut self, filename: &str) -> Option<&mut Glyph> {
        self.glyphs.iter_mut().find(|g| g.filename == filename)
    }

    pub fn mapped_count(&self) -> usize {
        self.glyphs.iter().filter(|g| g.mapped_char.is_some()).count()
    }

    pub fn to_entry(&self) -> FontEntry {
        FontEntry { id: self.id.to_string(), name: self.name.clone() }
    }
}

/// Image URL the glyph is served under
pub(crate) fn glyph_ref(font: &FontId, filename: &str) -> String {
    format!("{}{}/{}", api::GLYPHS_PREFIX, font, filename)
}
