//! Upload Coordinator
//!
//! Sends a handwriting sample for extraction. The server makes the new
//! font active; the page still re-resolves rather than assuming it.

use std::path::Path;
use std::rc::Rc;

use inkfont_net::api::{self, UploadData};
use inkfont_net::{FormData, Request};

use crate::{Action, ActiveFont, ActiveFontState, FontRegistryClient, InFlight, PageContext, Precondition, SessionError};

/// Selected sample image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl UploadFile {
    pub fn new(filename: &str, content: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: content_type_for(filename).to_string(),
            content,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let filename = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sample".into());
        Ok(Self::new(&filename, content))
    }
}

/// The upload form as the user filled it in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub file: Option<UploadFile>,
    /// `Some` when the surface has a name field; it must not be blank then
    pub font_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub font_id: String,
    pub message: String,
    /// Page state after the post-upload refresh
    pub state: ActiveFontState,
}

impl UploadOutcome {
    pub fn active(&self) -> Option<&ActiveFont> {
        self.state.active()
    }
}

pub struct UploadCoordinator {
    ctx: Rc<PageContext>,
    registry: Rc<FontRegistryClient>,
    busy: InFlight,
}

impl UploadCoordinator {
    pub fn new(ctx: Rc<PageContext>, registry: Rc<FontRegistryClient>) -> Self {
        Self { ctx, registry, busy: InFlight::new() }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn upload(&self, form: &mut UploadForm) -> Result<UploadOutcome, SessionError> {
        let file = form.file.as_ref().ok_or(Precondition::NoFile)?;
        if file.content.is_empty() {
            return Err(Precondition::EmptyFile.into());
        }
        let name = match &form.font_name {
            Some(name) if name.trim().is_empty() => return Err(Precondition::MissingFontName.into()),
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let _guard = self.busy.try_begin(Action::Upload)?;

        let mut data = FormData::new();
        data.append_file("file", &file.filename, file.content.clone(), &file.content_type);
        if let Some(name) = &name {
            data.append("font_name", name);
        }
        tracing::info!("Uploading {} ({} bytes)", file.filename, file.content.len());

        let reply = self.ctx
            .call::<UploadData>(Request::post(api::UPLOAD_HANDWRITING).with_form(data))
            .await
            .inspect_err(|e| {
                if *e != SessionError::Detached {
                    tracing::warn!("Upload failed: {}", e);
                }
            })?;
        let message = reply.message.unwrap_or_else(|| "Upload complete".into());
        tracing::info!("Created font {}: {}", reply.data.font_id, message);

        if form.font_name.is_some() {
            form.font_name = Some(String::new());
        }

        let state = self.registry.refresh_after(Action::Upload).await?;
        if state.active().map(|f| f.id.as_str()) != Some(reply.data.font_id.as_str()) {
            tracing::warn!("Uploaded font {} is not the active font after refresh", reply.data.font_id);
        }
        Ok(UploadOutcome { font_id: reply.data.font_id, message, state })
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
