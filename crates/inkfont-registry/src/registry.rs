//! Registry state and operations

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use inkfont_net::api::{self, MappingEdit};
use parking_lot::Mutex;

use crate::model::glyph_ref;
use crate::render::content_address;
use crate::{
    ActiveRecord, ConcatRenderer, FixedCountExtractor, Font, FontId, Glyph, GlyphExtractor,
    GlyphLookup, RegistryError, TextRenderer,
};

/// Active pointer as seen by a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSnapshot {
    /// Id and name of the active font
    pub font: Option<(FontId, String)>,
    pub revision: u64,
}

/// A stored rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub hash: String,
    pub url: String,
}

#[derive(Default)]
struct State {
    /// Creation order
    fonts: Vec<Font>,
    active: ActiveRecord,
    next_id: u64,
    artifacts: HashMap<String, Vec<u8>>,
    /// Artifact hashes, oldest first
    artifact_order: VecDeque<String>,
}

impl State {
    fn font(&self, id: &FontId) -> Option<&Font> {
        self.fonts.iter().find(|f| &f.id == id)
    }

    fn active_font(&self) -> Result<&Font, RegistryError> {
        self.active.font_id()
            .and_then(|id| self.font(id))
            .ok_or(RegistryError::NoActiveFont)
    }

    /// Keep `bytes` under `hash`, dropping the oldest artifacts past `capacity`
    fn store_artifact(&mut self, hash: &str, bytes: Vec<u8>, capacity: usize) {
        match self.artifacts.get(hash) {
            Some(existing) if *existing == bytes => return,
            Some(_) => {
                tracing::warn!("Content address collision on {}, replacing", hash);
                self.artifacts.insert(hash.to_string(), bytes);
                return;
            }
            None => {}
        }
        self.artifacts.insert(hash.to_string(), bytes);
        self.artifact_order.push_back(hash.to_string());
        while self.artifact_order.len() > capacity {
            if let Some(old) = self.artifact_order.pop_front() {
                tracing::debug!("Evicting artifact {}", old);
                self.artifacts.remove(&old);
            }
        }
    }

    fn active_font_mut(&mut self) -> Result<&mut Font, RegistryError> {
        let id = self.active.font_id().cloned().ok_or(RegistryError::NoActiveFont)?;
        self.fonts.iter_mut()
            .find(|f| f.id == id)
            .ok_or(RegistryError::NoActiveFont)
    }
}

/// Registry builder
pub struct RegistryBuilder {
    extractor: Box<dyn GlyphExtractor>,
    renderer: Box<dyn TextRenderer>,
    artifact_capacity: usize,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            extractor: Box::new(FixedCountExtractor::default()),
            renderer: Box::new(ConcatRenderer),
            artifact_capacity: Registry::DEFAULT_ARTIFACT_CAPACITY,
        }
    }

    pub fn extractor(mut self, extractor: impl GlyphExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn renderer(mut self, renderer: impl TextRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// How many generated images to keep before dropping the oldest
    pub fn artifact_capacity(mut self, capacity: usize) -> Self {
        self.artifact_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            state: Mutex::new(State::default()),
            extractor: self.extractor,
            renderer: self.renderer,
            artifact_capacity: self.artifact_capacity,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-side font registry
pub struct Registry {
    state: Mutex<State>,
    extractor: Box<dyn GlyphExtractor>,
    renderer: Box<dyn TextRenderer>,
    artifact_capacity: usize,
}

impl Registry {
    pub const DEFAULT_ARTIFACT_CAPACITY: usize = 64;

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn active(&self) -> ActiveSnapshot {
        let state = self.state.lock();
        ActiveSnapshot {
            font: state.active.font_id()
                .and_then(|id| state.font(id))
                .map(|f| (f.id.clone(), f.name.clone())),
            revision: state.active.revision(),
        }
    }

    /// Fonts in creation order
    pub fn fonts(&self) -> Vec<(FontId, String)> {
        self.state.lock().fonts.iter()
            .map(|f| (f.id.clone(), f.name.clone()))
            .collect()
    }

    /// Copy of a stored font
    pub fn font(&self, id: &FontId) -> Option<Font> {
        self.state.lock().font(id).cloned()
    }

    pub fn set_active(&self, id: &FontId, expected_revision: Option<u64>) -> Result<u64, RegistryError> {
        let mut state = self.state.lock();
        if state.font(id).is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        let revision = state.active.set(id.clone(), expected_revision)?;
        tracing::info!("Active font set to {} (revision {})", id, revision);
        Ok(revision)
    }

    /// Segment `sample` into a new font and make it active.
    ///
    /// A blank name falls back to the new font's id.
    pub fn upload(&self, sample: &[u8], name: Option<&str>) -> Result<FontId, RegistryError> {
        if sample.is_empty() {
            return Err(RegistryError::InvalidInput("No file provided".into()));
        }

        // Segmentation runs outside the lock.
        let extracted = self.extractor.extract(sample).map_err(RegistryError::Extraction)?;
        if extracted.is_empty() {
            return Err(RegistryError::Extraction("no characters found in the sample".into()));
        }
        {
            let mut seen = HashSet::new();
            if let Some(dup) = extracted.iter().find(|g| !seen.insert(g.filename.as_str())) {
                return Err(RegistryError::Extraction(format!("duplicate glyph name {}", dup.filename)));
            }
        }

        let mut state = self.state.lock();
        state.next_id += 1;
        let id = FontId::new(format!("f{}", state.next_id));
        let name = name.map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| id.to_string());

        let glyphs = extracted.into_iter()
            .map(|g| Glyph {
                image_ref: glyph_ref(&id, &g.filename),
                filename: g.filename,
                image: g.image,
                mapped_char: None,
            })
            .collect::<Vec<_>>();

        tracing::info!("Created font {} ({:?}) with {} glyphs", id, name, glyphs.len());
        state.fonts.push(Font { id: id.clone(), name, glyphs });
        state.active.set(id.clone(), None)?;
        Ok(id)
    }

    /// Remove a font, clearing the active pointer if it named it
    pub fn delete(&self, id: &FontId) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let index = state.fonts.iter()
            .position(|f| &f.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        state.fonts.remove(index);
        if state.active.clear_if(id) {
            tracing::info!("Deleted active font {}, no font is active now", id);
        } else {
            tracing::info!("Deleted font {}", id);
        }
        Ok(())
    }

    /// Glyphs of the active font
    pub fn glyphs(&self) -> Result<(FontId, Vec<Glyph>), RegistryError> {
        let state = self.state.lock();
        let font = state.active_font()?;
        Ok((font.id.clone(), font.glyphs.clone()))
    }

    /// Apply a mapping submission to the active font.
    ///
    /// Absent filenames are unchanged. The submission is checked as a whole
    /// before anything is written. Returns how many glyphs changed.
    pub fn save_mapping(
        &self,
        edits: &BTreeMap<String, MappingEdit>,
        expected_font: Option<&FontId>,
    ) -> Result<usize, RegistryError> {
        let mut state = self.state.lock();
        if let Some(expected) = expected_font {
            let active = state.active.font_id();
            if active != Some(expected) {
                return Err(RegistryError::FontMismatch {
                    expected: expected.to_string(),
                    active: active.map(FontId::to_string),
                });
            }
        }
        let font = state.active_font_mut()?;

        let mut resolved = Vec::with_capacity(edits.len());
        let mut unknown = Vec::new();
        for (filename, edit) in edits {
            if font.glyph(filename).is_none() {
                unknown.push(filename.as_str());
                continue;
            }
            let value = match edit {
                MappingEdit::Clear => None,
                MappingEdit::Set(raw) => Some(single_char(raw).ok_or_else(|| {
                    RegistryError::InvalidMapping(format!(
                        "{} must map to exactly one character, got {:?}", filename, raw
                    ))
                })?),
            };
            resolved.push((filename, value));
        }
        if !unknown.is_empty() {
            return Err(RegistryError::InvalidMapping(format!("unknown glyphs: {}", unknown.join(", "))));
        }

        let mut changed = 0;
        for (filename, value) in resolved {
            if let Some(glyph) = font.glyph_mut(filename) {
                if glyph.mapped_char != value {
                    glyph.mapped_char = value;
                    changed += 1;
                }
            }
        }
        tracing::info!(
            "Saved mapping for {}: {} submitted, {} changed, {}/{} mapped",
            font.id, edits.len(), changed, font.mapped_count(), font.glyphs.len()
        );
        Ok(changed)
    }

    /// Render `text` with the active font and store the result
    pub fn generate(&self, text: &str) -> Result<Artifact, RegistryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RegistryError::InvalidInput("No text provided".into()));
        }

        let mut state = self.state.lock();
        let bytes = {
            let font = state.active_font()?;
            self.renderer
                .render(text, &GlyphLookup::new(font))
                .map_err(RegistryError::Render)?
        };
        let hash = content_address(&bytes);
        let url = format!("{}{}.png", api::OUTPUT_PREFIX, hash);
        state.store_artifact(&hash, bytes, self.artifact_capacity);
        tracing::info!("Generated {} for {} characters", url, text.chars().count());
        Ok(Artifact { hash, url })
    }

    /// Stored artifact by file name (`<hash>.png`)
    pub fn artifact(&self, file: &str) -> Option<Vec<u8>> {
        let hash = file.strip_suffix(".png").unwrap_or(file);
        self.state.lock().artifacts.get(hash).cloned()
    }

    pub fn glyph_image(&self, font: &FontId, filename: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state.font(font)?.glyph(filename).map(|g| g.image.clone())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
