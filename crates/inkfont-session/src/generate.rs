//! Generation Requestor

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use inkfont_net::api::{self, GenerateBody, GenerateData};
use inkfont_net::{NetError, Request};

use crate::{Action, InFlight, PageContext, Precondition, SessionError};

/// A rendered text image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Reference as returned by the server
    pub image_url: String,
    /// Reference safe to display without hitting a stale cache entry
    pub display_url: String,
    pub content_hash: Option<String>,
}

pub struct GenerationRequestor {
    ctx: Rc<PageContext>,
    busy: InFlight,
    last_token: Cell<u64>,
    output: RefCell<Option<Artifact>>,
}

impl GenerationRequestor {
    pub fn new(ctx: Rc<PageContext>) -> Self {
        Self {
            ctx,
            busy: InFlight::new(),
            last_token: Cell::new(0),
            output: RefCell::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Last successful rendering shown on the page
    pub fn output(&self) -> Option<Artifact> {
        self.output.borrow().clone()
    }

    /// Render `text` with the active font
    pub async fn generate(&self, text: &str) -> Result<Artifact, SessionError> {
        if self.ctx.active_font().is_none() {
            return Err(Precondition::NoActiveFont.into());
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Precondition::EmptyText.into());
        }
        let _guard = self.busy.try_begin(Action::Generate)?;

        let request = Request::post(api::GENERATE).with_json(&GenerateBody { text: text.to_string() })?;
        let reply = self.ctx.call_strict::<GenerateData>(request).await.inspect_err(|e| {
            if *e != SessionError::Detached {
                tracing::warn!("Generation failed: {}", e);
            }
        })?;

        let data = reply.data;
        let display_url = match &data.content_hash {
            Some(_) => data.image_url.clone(),
            None => self.cache_busted(&data.image_url),
        };
        let artifact = Artifact {
            image_url: data.image_url,
            display_url,
            content_hash: data.content_hash,
        };
        tracing::info!("Generated {}", artifact.display_url);
        *self.output.borrow_mut() = Some(artifact.clone());
        Ok(artifact)
    }

    /// Download the image bytes behind an artifact
    pub async fn fetch(&self, artifact: &Artifact) -> Result<Vec<u8>, SessionError> {
        let resp = self.ctx.send(Request::get(&artifact.display_url)).await?;
        if !resp.is_success() {
            return Err(NetError::HttpError { status: resp.status }.into());
        }
        Ok(resp.body)
    }

    /// Append a token that increases with every call
    fn cache_busted(&self, url: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let token = now.max(self.last_token.get() + 1);
        self.last_token.set(token);
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", url, sep, token)
    }
}
