//! Deletion Coordinator
//!
//! Deletes only after explicit confirmation, then refreshes the registry.
//! Whether the active font went away is learned from the server.

use std::rc::Rc;

use inkfont_net::api::{self, Ack, DeleteFontBody};
use inkfont_net::Request;

use crate::{Action, ActiveFont, ActiveFontState, FontRegistryClient, InFlight, PageContext, Precondition, SessionError};

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub message: String,
    /// Page state after the post-delete refresh
    pub state: ActiveFontState,
}

impl DeleteOutcome {
    pub fn active(&self) -> Option<&ActiveFont> {
        self.state.active()
    }
}

pub struct DeletionCoordinator {
    ctx: Rc<PageContext>,
    registry: Rc<FontRegistryClient>,
    busy: InFlight,
}

impl DeletionCoordinator {
    pub fn new(ctx: Rc<PageContext>, registry: Rc<FontRegistryClient>) -> Self {
        Self { ctx, registry, busy: InFlight::new() }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn delete(&self, font_id: &str, confirm: &dyn Confirm) -> Result<DeleteOutcome, SessionError> {
        let font_id = font_id.trim();
        if font_id.is_empty() {
            return Err(Precondition::NoSelection.into());
        }
        let name = self.registry.selector()
            .label_of(font_id)
            .map(String::from)
            .unwrap_or_else(|| font_id.to_string());
        let prompt = format!(
            "Are you sure you want to delete the font \"{}\"? This action cannot be undone.",
            name
        );
        if !confirm.confirm(&prompt) {
            return Err(Precondition::NotConfirmed.into());
        }
        let _guard = self.busy.try_begin(Action::Delete)?;

        let body = DeleteFontBody { font_id: font_id.to_string() };
        let request = Request::post(api::DELETE_FONT).with_json(&body)?;
        let reply = self.ctx.call::<Ack>(request).await?;
        let message = reply.message.unwrap_or_else(|| format!("Font {} deleted", name));
        tracing::info!("{}", message);

        let state = self.registry.refresh_after(Action::Delete).await?;
        Ok(DeleteOutcome { message, state })
    }
}
