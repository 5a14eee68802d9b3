//! Font Registry Client
//!
//! Owns the font selector and keeps the page's copy of the active font in
//! step with the server. The font list is always populated before the
//! active id is applied to the selector.

use std::cell::RefCell;
use std::rc::Rc;

use inkfont_net::api::{self, codes, Ack, ActiveFontData, FontEntry, FontsData, SetActiveFontBody};
use inkfont_net::Request;

use crate::context::Settled;
use crate::{Action, ActiveFont, ActiveFontState, InFlight, PageContext, Precondition, SessionError};

/// One selector entry. The first entry is always the "no selection" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontOption {
    pub id: Option<String>,
    pub label: String,
}

impl FontOption {
    pub const SENTINEL_LABEL: &'static str = "-- Select a Font --";

    pub fn sentinel() -> Self {
        Self { id: None, label: Self::SENTINEL_LABEL.into() }
    }
}

/// Font selector state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorView {
    pub options: Vec<FontOption>,
    /// `None` shows the sentinel
    pub selected: Option<String>,
    /// Why the list could not be loaded
    pub list_error: Option<String>,
}

impl Default for SelectorView {
    fn default() -> Self {
        Self {
            options: vec![FontOption::sentinel()],
            selected: None,
            list_error: None,
        }
    }
}

impl SelectorView {
    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id.as_deref() == Some(id))
    }

    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.options.iter()
            .find(|o| o.id.as_deref() == Some(id))
            .map(|o| o.label.as_str())
    }
}

pub struct FontRegistryClient {
    ctx: Rc<PageContext>,
    selector: RefCell<SelectorView>,
    /// Last id the server confirmed as active
    last_good: RefCell<Option<String>>,
    busy: InFlight,
}

impl FontRegistryClient {
    pub fn new(ctx: Rc<PageContext>) -> Self {
        Self {
            ctx,
            selector: RefCell::new(SelectorView::default()),
            last_good: RefCell::new(None),
            busy: InFlight::new(),
        }
    }

    pub fn selector(&self) -> SelectorView {
        self.selector.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Ask the server which font is active
    pub async fn resolve_active_font(&self) -> Result<Option<ActiveFont>, SessionError> {
        let ticket = self.ctx.begin_resolve();
        match self.ctx.call::<ActiveFontData>(Request::get(api::GET_ACTIVE_FONT)).await {
            Ok(reply) => match self.ctx.settle_resolved(ticket, reply.data) {
                Settled::Applied(active) => {
                    self.apply_active(active.as_ref());
                    Ok(active)
                }
                Settled::Superseded => Ok(self.ctx.active_font()),
            },
            Err(SessionError::Detached) => Err(SessionError::Detached),
            Err(e) => {
                tracing::warn!("Resolving the active font failed: {}", e);
                self.ctx.settle_error(ticket, &e);
                Err(e)
            }
        }
    }

    /// Fill the selector with the server's fonts, sentinel first
    pub async fn list_fonts(&self) -> Result<Vec<FontEntry>, SessionError> {
        match self.ctx.call::<FontsData>(Request::get(api::GET_FONTS)).await {
            Ok(reply) => {
                let fonts = reply.data.fonts;
                let mut selector = self.selector.borrow_mut();
                selector.options = std::iter::once(FontOption::sentinel())
                    .chain(fonts.iter().map(|f| FontOption { id: Some(f.id.clone()), label: f.name.clone() }))
                    .collect();
                if let Some(selected) = selector.selected.clone() {
                    if !selector.contains(&selected) {
                        selector.selected = None;
                    }
                }
                selector.list_error = None;
                tracing::debug!("Listed {} fonts", fonts.len());
                Ok(fonts)
            }
            Err(SessionError::Detached) => Err(SessionError::Detached),
            Err(e) => {
                tracing::warn!("Loading fonts failed: {}", e);
                self.selector.borrow_mut().list_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// List, then resolve. Used on page load and after anything that
    /// changes the registry.
    pub async fn refresh(&self) -> Result<Option<ActiveFont>, SessionError> {
        let listed = self.list_fonts().await;
        if let Err(SessionError::Detached) = listed {
            return Err(SessionError::Detached);
        }
        let active = self.resolve_active_font().await?;
        listed?;
        Ok(active)
    }

    /// Refresh after `action` changed the registry. The change itself
    /// already succeeded, so a failed refresh is not an error here; it is
    /// recorded in the returned page state instead.
    pub(crate) async fn refresh_after(&self, action: Action) -> Result<ActiveFontState, SessionError> {
        match self.refresh().await {
            Err(SessionError::Detached) => return Err(SessionError::Detached),
            Err(e) => tracing::warn!("Refresh after {} failed: {}", action, e),
            Ok(_) => {}
        }
        Ok(self.ctx.state())
    }

    /// Make `id` the active font on the server, then re-resolve.
    ///
    /// On failure the selector goes back to the last confirmed font.
    pub async fn set_active_font(&self, id: &str) -> Result<Option<ActiveFont>, SessionError> {
        let id = id.trim();
        if id.is_empty() {
            self.revert_selector();
            return Err(Precondition::NoSelection.into());
        }
        let _guard = self.busy.try_begin(Action::SetActiveFont)?;

        self.selector.borrow_mut().selected = Some(id.to_string());
        let body = SetActiveFontBody {
            font_id: id.to_string(),
            expected_revision: self.ctx.revision(),
        };
        let request = Request::post(api::SET_ACTIVE_FONT).with_json(&body)?;

        match self.ctx.call::<Ack>(request).await {
            Ok(reply) => {
                tracing::info!("{}", reply.message.as_deref().unwrap_or("Active font changed"));
                self.resolve_active_font().await
            }
            Err(SessionError::Detached) => Err(SessionError::Detached),
            Err(e) => {
                tracing::warn!("Setting active font {} failed: {}", id, e);
                self.revert_selector();
                if e.code() == Some(codes::STALE_REVISION) {
                    // Another page moved the pointer; pick up its choice.
                    if let Err(refresh) = self.refresh().await {
                        tracing::warn!("Refresh after stale revision failed: {}", refresh);
                    }
                }
                Err(e)
            }
        }
    }

    fn apply_active(&self, active: Option<&ActiveFont>) {
        *self.last_good.borrow_mut() = active.map(|f| f.id.clone());

        let mut selector = self.selector.borrow_mut();
        match active {
            Some(font) => {
                if !selector.contains(&font.id) {
                    tracing::warn!("Active font {} missing from the list, adding it", font.id);
                    selector.options.push(FontOption { id: Some(font.id.clone()), label: font.name.clone() });
                }
                selector.selected = Some(font.id.clone());
            }
            None => selector.selected = None,
        }
    }

    fn revert_selector(&self) {
        let last_good = self.last_good.borrow().clone();
        self.selector.borrow_mut().selected = last_good;
    }
}
