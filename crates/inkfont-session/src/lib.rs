//! inkfont Session
//!
//! Client-side logic of the font pages: which font is active, the font
//! selector, uploads, glyph mapping, text generation and deletion.
//!
//! The server holds the one global active-font pointer. Every page keeps a
//! derived copy in its [`PageContext`] and refreshes it through the
//! [`FontRegistryClient`]; nothing on the client ever marks a font active
//! without asking the server first.
//!
//! # Example
//! ```rust,ignore
//! use inkfont_session::{Config, Page};
//!
//! let transport = Config::from_env().connect()?;
//! let page = Page::new(transport);
//! smol::block_on(async {
//!     page.load().await?;
//!     let artifact = page.generator.generate("Hello").await?;
//!     println!("{}", artifact.display_url);
//!     Ok::<_, inkfont_session::SessionError>(())
//! })?;
//! ```

mod error;
mod state;
mod context;
mod config;
pub mod registry_client;
pub mod upload;
pub mod mapping;
pub mod generate;
pub mod delete;

pub use error::{SessionError, Precondition, Action, ErrorKind};
pub use state::{ActiveFont, ActiveFontState, Controls};
pub use context::{PageContext, InFlight, InFlightGuard};
pub use config::Config;
pub use registry_client::{FontRegistryClient, FontOption, SelectorView};
pub use upload::{UploadCoordinator, UploadFile, UploadForm, UploadOutcome};
pub use mapping::{MappingEditor, MappingView, GlyphUnit, SaveOutcome};
pub use generate::{GenerationRequestor, Artifact};
pub use delete::{DeletionCoordinator, Confirm, DeleteOutcome};

use std::rc::Rc;
use std::sync::Arc;

use inkfont_net::Transport;

/// One page load: a fresh context shared by every component on it
pub struct Page {
    pub ctx: Rc<PageContext>,
    pub registry: Rc<FontRegistryClient>,
    pub upload: UploadCoordinator,
    pub mapping: MappingEditor,
    pub generator: GenerationRequestor,
    pub deletion: DeletionCoordinator,
}

impl Page {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let ctx = PageContext::new(transport);
        let registry = Rc::new(FontRegistryClient::new(ctx.clone()));
        Self {
            upload: UploadCoordinator::new(ctx.clone(), registry.clone()),
            mapping: MappingEditor::new(ctx.clone(), registry.clone()),
            generator: GenerationRequestor::new(ctx.clone()),
            deletion: DeletionCoordinator::new(ctx.clone(), registry.clone()),
            registry,
            ctx,
        }
    }

    /// Page-load initialization: list fonts, then resolve the active one
    pub async fn load(&self) -> Result<Option<ActiveFont>, SessionError> {
        self.registry.refresh().await
    }

    /// Navigate away. Responses still in flight are dropped on arrival.
    pub fn teardown(&self) {
        self.ctx.teardown();
    }
}
