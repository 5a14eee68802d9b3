//! Page context
//!
//! Shared by every component of one page load. Network calls are the only
//! suspension points; each one re-checks that the page is still attached
//! before its outcome is allowed to touch page state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use inkfont_net::api::ActiveFontData;
use inkfont_net::envelope::{decode, decode_strict, Reply};
use inkfont_net::{Request, Response, Transport};

use crate::{Action, ActiveFont, ActiveFontState, SessionError};

/// Outcome of settling a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Settled {
    Applied(Option<ActiveFont>),
    /// A newer resolution already settled the state
    Superseded,
}

/// Accepted reply payload
#[derive(Debug, Clone)]
pub(crate) struct Accepted<T> {
    pub message: Option<String>,
    pub data: T,
}

pub struct PageContext {
    transport: Arc<dyn Transport>,
    attached: Cell<bool>,
    state: RefCell<ActiveFontState>,
    /// Active-pointer revision of the last applied answer
    revision: Cell<Option<u64>>,
    /// Resolution tickets handed out / last one applied
    issued: Cell<u64>,
    settled: Cell<u64>,
}

impl PageContext {
    pub fn new(transport: Arc<dyn Transport>) -> Rc<Self> {
        Rc::new(Self {
            transport,
            attached: Cell::new(true),
            state: RefCell::new(ActiveFontState::Unknown),
            revision: Cell::new(None),
            issued: Cell::new(0),
            settled: Cell::new(0),
        })
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    pub fn teardown(&self) {
        tracing::debug!("Page torn down");
        self.attached.set(false);
    }

    pub fn state(&self) -> ActiveFontState {
        self.state.borrow().clone()
    }

    pub fn active_font(&self) -> Option<ActiveFont> {
        self.state.borrow().active().cloned()
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision.get()
    }

    /// Enter `Resolving`. The ticket orders this resolution against
    /// others started on the same page.
    pub(crate) fn begin_resolve(&self) -> u64 {
        let ticket = self.issued.get() + 1;
        self.issued.set(ticket);
        self.transition(ActiveFontState::Resolving);
        ticket
    }

    /// Apply a `/get_active_font` answer. An answer to a resolution older
    /// than one already settled is dropped.
    pub(crate) fn settle_resolved(&self, ticket: u64, data: ActiveFontData) -> Settled {
        if !self.claim(ticket) {
            return Settled::Superseded;
        }
        if let Some(incoming) = data.revision {
            if let Some(seen) = self.revision.get().filter(|seen| incoming < *seen) {
                // Counter went backwards: the server started over.
                tracing::warn!("Active font revision reset ({} -> {}), adopting", seen, incoming);
            }
            self.revision.set(Some(incoming));
        }

        let next = match data.active_font_id.filter(|id| !id.is_empty()) {
            Some(id) => ActiveFontState::Active(ActiveFont {
                name: data.active_font_name.unwrap_or_else(|| id.clone()),
                id,
                revision: data.revision,
            }),
            None => ActiveFontState::NoneSelected,
        };
        self.transition(next);
        Settled::Applied(self.active_font())
    }

    pub(crate) fn settle_error(&self, ticket: u64, error: &SessionError) -> Settled {
        if !self.claim(ticket) {
            return Settled::Superseded;
        }
        self.transition(ActiveFontState::Error(error.to_string()));
        Settled::Applied(None)
    }

    fn claim(&self, ticket: u64) -> bool {
        if ticket < self.settled.get() {
            tracing::warn!("Dropping answer to resolution #{} (#{} already settled)", ticket, self.settled.get());
            return false;
        }
        self.settled.set(ticket);
        true
    }

    fn transition(&self, next: ActiveFontState) {
        if !self.is_attached() {
            return;
        }
        let prev = self.state.replace(next);
        tracing::debug!("Active font state {:?} -> {:?}", prev, self.state.borrow());
    }

    /// Send a request off-thread and wait for it
    pub(crate) async fn send(&self, request: Request) -> Result<Response, SessionError> {
        let transport = self.transport.clone();
        let result = smol::unblock(move || transport.send(request)).await;
        if !self.is_attached() {
            tracing::debug!("Dropping response for a torn-down page");
            return Err(SessionError::Detached);
        }
        Ok(result?)
    }

    /// Send and decode an envelope
    pub(crate) async fn call<T: DeserializeOwned>(&self, request: Request) -> Result<Accepted<T>, SessionError> {
        let resp = self.send(request).await?;
        accept(decode(&resp)?)
    }

    /// Send and decode, treating any non-2xx status as a transport failure
    pub(crate) async fn call_strict<T: DeserializeOwned>(&self, request: Request) -> Result<Accepted<T>, SessionError> {
        let resp = self.send(request).await?;
        accept(decode_strict(&resp)?)
    }
}

fn accept<T>(reply: Reply<T>) -> Result<Accepted<T>, SessionError> {
    match reply {
        Reply::Accepted { message, data } => Ok(Accepted { message, data }),
        Reply::Rejected { error, code } => Err(SessionError::Rejected { message: error, code }),
    }
}

/// Re-entrancy guard for one control
#[derive(Debug, Default)]
pub struct InFlight {
    busy: Cell<bool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Claim the control for `action`, or fail if it is already running
    pub fn try_begin(&self, action: Action) -> Result<InFlightGuard<'_>, SessionError> {
        if self.busy.replace(true) {
            tracing::warn!("{} requested while already running", action);
            return Err(SessionError::Busy(action));
        }
        Ok(InFlightGuard { busy: &self.busy })
    }
}

/// Releases the control when dropped
pub struct InFlightGuard<'a> {
    busy: &'a Cell<bool>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}
