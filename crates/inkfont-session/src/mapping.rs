//! Mapping Editor
//!
//! Loads the active font's glyphs, holds the user's per-glyph edits and
//! submits them. A submission names every glyph with a value (set), every
//! glyph the user emptied that had a stored character (clear), and leaves
//! the rest out (unchanged), so saving the same edits twice is a no-op.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use inkfont_net::api::{self, codes, Ack, GlyphEntry, GlyphsData, MappingEdit, SaveMappingBody};
use inkfont_net::Request;

use crate::{Action, FontRegistryClient, InFlight, PageContext, Precondition, SessionError};

pub const NO_ACTIVE_FONT_NOTICE: &str =
    "No active font. Please go back to Font Management to select or upload one.";
pub const NO_GLYPHS_NOTICE: &str =
    "No characters found for this font. Please ensure extraction was successful.";

/// One editable glyph: preview plus a one-character field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphUnit {
    pub filename: String,
    pub image_url: String,
    /// Field contents as typed
    pub value: String,
    /// Character the server has stored
    pub persisted: Option<char>,
}

impl GlyphUnit {
    fn from_entry(entry: GlyphEntry) -> Self {
        let persisted = entry.mapped_char.as_deref().and_then(single_char);
        Self {
            filename: entry.filename,
            image_url: entry.image_url,
            value: persisted.map(String::from).unwrap_or_default(),
            persisted,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.value.trim().chars().next() != self.persisted
            || self.value.trim().chars().count() > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingView {
    /// Font the units belong to
    pub font_id: Option<String>,
    pub units: Vec<GlyphUnit>,
    /// Empty-state or error text shown instead of / above the units
    pub notice: Option<String>,
}

impl MappingView {
    pub fn save_enabled(&self) -> bool {
        self.font_id.is_some() && !self.units.is_empty()
    }

    pub fn unit(&self, filename: &str) -> Option<&GlyphUnit> {
        self.units.iter().find(|u| u.filename == filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub message: String,
    /// Entries in the submission
    pub submitted: usize,
}

pub struct MappingEditor {
    ctx: Rc<PageContext>,
    registry: Rc<FontRegistryClient>,
    view: RefCell<MappingView>,
    busy: InFlight,
}

impl MappingEditor {
    pub fn new(ctx: Rc<PageContext>, registry: Rc<FontRegistryClient>) -> Self {
        Self {
            ctx,
            registry,
            view: RefCell::new(MappingView::default()),
            busy: InFlight::new(),
        }
    }

    pub fn view(&self) -> MappingView {
        self.view.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Page load: resolve the active font, then load its glyphs
    pub async fn open(&self) -> Result<usize, SessionError> {
        match self.registry.resolve_active_font().await {
            Ok(_) => self.load_glyphs().await,
            Err(e) => {
                if e != SessionError::Detached {
                    self.show_empty(format!("Error loading the active font: {}", e));
                }
                Err(e)
            }
        }
    }

    /// Fetch the glyphs of the server's active font. Returns how many.
    pub async fn load_glyphs(&self) -> Result<usize, SessionError> {
        let Some(active) = self.ctx.active_font() else {
            self.show_empty(NO_ACTIVE_FONT_NOTICE.into());
            return Ok(0);
        };

        let reply = match self.ctx.call::<GlyphsData>(Request::get(api::GET_EXTRACTED_CHARS)).await {
            Ok(reply) => reply,
            Err(SessionError::Detached) => return Err(SessionError::Detached),
            Err(e) if e.code() == Some(codes::NO_ACTIVE_FONT) => {
                // Someone cleared the pointer since we resolved.
                self.show_empty(NO_ACTIVE_FONT_NOTICE.into());
                if let Err(resolve) = self.registry.resolve_active_font().await {
                    tracing::warn!("Re-resolving after lost active font failed: {}", resolve);
                }
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Loading glyphs failed: {}", e);
                self.view.borrow_mut().notice = Some(format!("Error loading characters: {}", e));
                return Err(e);
            }
        };

        let font_id = reply.data.active_font.clone().unwrap_or_else(|| active.id.clone());
        if font_id != active.id {
            tracing::warn!("Glyphs came from {} while {} was resolved, re-resolving", font_id, active.id);
            if let Err(e) = self.registry.resolve_active_font().await {
                tracing::warn!("Re-resolve failed: {}", e);
            }
        }

        let units: Vec<GlyphUnit> = reply.data.characters.into_iter().map(GlyphUnit::from_entry).collect();
        let count = units.len();
        let mut view = self.view.borrow_mut();
        view.notice = (count == 0).then(|| NO_GLYPHS_NOTICE.to_string());
        view.font_id = Some(font_id);
        view.units = units;
        tracing::debug!("Loaded {} glyphs", count);
        Ok(count)
    }

    /// Type into a glyph's field
    pub fn set_value(&self, filename: &str, value: &str) -> Result<(), SessionError> {
        let mut view = self.view.borrow_mut();
        let unit = view.units.iter_mut()
            .find(|u| u.filename == filename)
            .ok_or_else(|| Precondition::UnknownGlyph(filename.to_string()))?;
        unit.value = value.to_string();
        Ok(())
    }

    /// Empty a glyph's field
    pub fn clear_value(&self, filename: &str) -> Result<(), SessionError> {
        self.set_value(filename, "")
    }

    /// Persist the current edits, then reload. On failure the edits stay.
    pub async fn save_mapping(&self) -> Result<SaveOutcome, SessionError> {
        let (font_id, mapping) = {
            let view = self.view.borrow();
            let font_id = view.font_id.clone().ok_or(Precondition::NoActiveFont)?;
            (font_id, build_submission(&view.units)?)
        };
        let _guard = self.busy.try_begin(Action::SaveMapping)?;

        let submitted = mapping.len();
        let body = SaveMappingBody { mapping, expected_font_id: Some(font_id.clone()) };
        let request = Request::post(api::SAVE_MAPPING).with_json(&body)?;
        tracing::info!("Saving {} mapping entries for {}", submitted, font_id);

        let reply = self.ctx.call::<Ack>(request).await.inspect_err(|e| {
            if *e != SessionError::Detached {
                tracing::warn!("Saving mapping failed: {}", e);
            }
        })?;
        let message = reply.message.unwrap_or_else(|| "Mapping saved".into());

        match self.load_glyphs().await {
            Err(SessionError::Detached) => return Err(SessionError::Detached),
            Err(e) => tracing::warn!("Mapping saved but reloading glyphs failed: {}", e),
            Ok(_) => {}
        }
        Ok(SaveOutcome { message, submitted })
    }
}

impl MappingEditor {
    fn show_empty(&self, notice: String) {
        let mut view = self.view.borrow_mut();
        view.font_id = None;
        view.units.clear();
        view.notice = Some(notice);
    }
}

/// Tri-state submission for `units`
pub fn build_submission(units: &[GlyphUnit]) -> Result<BTreeMap<String, MappingEdit>, Precondition> {
    let mut mapping = BTreeMap::new();
    for unit in units {
        let value = unit.value.trim();
        if value.is_empty() {
            if unit.persisted.is_some() {
                mapping.insert(unit.filename.clone(), MappingEdit::Clear);
            }
        } else if single_char(value).is_some() {
            mapping.insert(unit.filename.clone(), MappingEdit::Set(value.to_string()));
        } else {
            return Err(Precondition::InvalidGlyphValue {
                filename: unit.filename.clone(),
                value: unit.value.clone(),
            });
        }
    }
    Ok(mapping)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
