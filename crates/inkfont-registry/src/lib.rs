//! inkfont Registry
//!
//! In-process backend speaking the font service protocol. It owns the
//! global active-font pointer, the glyph sets and their mappings, and the
//! generated artifacts. Segmentation and rendering stay behind the
//! `GlyphExtractor` and `TextRenderer` seams.
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use inkfont_registry::{Registry, LoopbackTransport};
//!
//! let registry = Arc::new(Registry::builder().build());
//! let transport = LoopbackTransport::new(registry.clone());
//! ```

mod model;
mod active;
mod registry;
mod router;
pub mod extract;
pub mod render;
pub mod loopback;

pub use model::{Font, FontId, Glyph};
pub use active::ActiveRecord;
pub use registry::{Registry, RegistryBuilder, ActiveSnapshot, Artifact};
pub use extract::{GlyphExtractor, ExtractedGlyph, FixedCountExtractor};
pub use render::{TextRenderer, GlyphLookup, ConcatRenderer, content_address};
pub use loopback::{LoopbackTransport, Fault};

use inkfont_net::api::codes;

/// Registry error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Font not found: {0}")]
    NotFound(String),

    #[error("No active font selected")]
    NoActiveFont,

    #[error("Active font changed since revision {expected} (now {current})")]
    StaleRevision { expected: u64, current: u64 },

    #[error("Active font is {}, not {expected}", .active.as_deref().unwrap_or("none"))]
    FontMismatch { expected: String, active: Option<String> },

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl RegistryError {
    /// Wire code sent next to the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::NoActiveFont => codes::NO_ACTIVE_FONT,
            Self::StaleRevision { .. } => codes::STALE_REVISION,
            Self::FontMismatch { .. } => codes::FONT_MISMATCH,
            Self::InvalidMapping(_) => codes::INVALID_MAPPING,
            Self::InvalidInput(_) => codes::INVALID_INPUT,
            Self::Extraction(_) => codes::EXTRACTION_FAILED,
            Self::Render(_) => codes::RENDER_FAILED,
        }
    }
}
