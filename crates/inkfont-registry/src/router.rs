//! Endpoint dispatch
//!
//! Maps protocol requests onto registry operations. Application failures
//! answer 200 with `success: false`, as the service always has; only
//! unknown routes and missing assets use error statuses.

use serde::de::DeserializeOwned;

use inkfont_net::api::{
    self, ActiveFontData, DeleteFontBody, FontsData, GenerateBody, GenerateData, GlyphsData,
    SaveMappingBody, SetActiveFontBody, UploadData,
};
use inkfont_net::envelope::{accepted, rejected};
use inkfont_net::{Method, Request, Response};

use crate::{FontId, Registry, RegistryError};

impl Registry {
    /// Answer one protocol request
    pub fn handle(&self, request: &Request) -> Response {
        let path = request.path();
        tracing::debug!("{} {}", request.method.as_str(), path);

        match (request.method, path) {
            (Method::Get, api::GET_ACTIVE_FONT) => self.get_active_font(),
            (Method::Get, api::GET_FONTS) => self.get_fonts(),
            (Method::Post, api::SET_ACTIVE_FONT) => self.post_set_active_font(request),
            (Method::Post, api::UPLOAD_HANDWRITING) => self.post_upload(request),
            (Method::Post, api::DELETE_FONT) => self.post_delete_font(request),
            (Method::Get, api::GET_EXTRACTED_CHARS) => self.get_extracted_chars(),
            (Method::Post, api::SAVE_MAPPING) => self.post_save_mapping(request),
            (Method::Post, api::GENERATE) => self.post_generate(request),
            (Method::Get, p) if p.starts_with(api::OUTPUT_PREFIX) => {
                raw(self.artifact(&p[api::OUTPUT_PREFIX.len()..]), "image/png")
            }
            (Method::Get, p) if p.starts_with(api::GLYPHS_PREFIX) => {
                let rest = &p[api::GLYPHS_PREFIX.len()..];
                let image = rest.split_once('/')
                    .and_then(|(font, file)| self.glyph_image(&FontId::new(font), file));
                raw(image, "image/png")
            }
            _ => not_found(),
        }
    }

    fn get_active_font(&self) -> Response {
        let snapshot = self.active();
        let (id, name) = snapshot.font.unzip();
        accepted(None, &ActiveFontData {
            active_font_id: id.map(|id| id.to_string()),
            active_font_name: name,
            revision: Some(snapshot.revision),
        })
    }

    fn get_fonts(&self) -> Response {
        let fonts = self.fonts().into_iter()
            .map(|(id, name)| api::FontEntry { id: id.to_string(), name })
            .collect();
        accepted(None, &FontsData { fonts })
    }

    fn post_set_active_font(&self, request: &Request) -> Response {
        let body: SetActiveFontBody = match json_body(request) {
            Ok(body) => body,
            Err(resp) => return resp,
        };
        let id = FontId::new(body.font_id);
        match self.set_active(&id, body.expected_revision) {
            Ok(_) => accepted(Some(&format!("Active font set to {}", id)), &api::Ack {}),
            Err(e) => failure(e),
        }
    }

    fn post_upload(&self, request: &Request) -> Response {
        let Some(form) = request.form() else {
            return failure(RegistryError::InvalidInput("Expected multipart form data".into()));
        };
        let Some((_, sample)) = form.file("file") else {
            return failure(RegistryError::InvalidInput("No file provided".into()));
        };
        match self.upload(sample, form.text("font_name")) {
            Ok(id) => {
                let glyphs = self.font(&id).map(|f| f.glyphs.len()).unwrap_or(0);
                accepted(
                    Some(&format!("Extracted {} characters into font {}", glyphs, id)),
                    &UploadData { font_id: id.to_string() },
                )
            }
            Err(e) => failure(e),
        }
    }

    fn post_delete_font(&self, request: &Request) -> Response {
        let body: DeleteFontBody = match json_body(request) {
            Ok(body) => body,
            Err(resp) => return resp,
        };
        let id = FontId::new(body.font_id);
        match self.delete(&id) {
            Ok(()) => accepted(Some(&format!("Font {} deleted", id)), &api::Ack {}),
            Err(e) => failure(e),
        }
    }

    fn get_extracted_chars(&self) -> Response {
        match self.glyphs() {
            Ok((font, glyphs)) => accepted(None, &GlyphsData {
                characters: glyphs.iter().map(|g| g.to_entry()).collect(),
                active_font: Some(font.to_string()),
            }),
            Err(e) => failure(e),
        }
    }

    fn post_save_mapping(&self, request: &Request) -> Response {
        let body: SaveMappingBody = match json_body(request) {
            Ok(body) => body,
            Err(resp) => return resp,
        };
        let expected = body.expected_font_id.map(FontId::new);
        match self.save_mapping(&body.mapping, expected.as_ref()) {
            Ok(changed) => accepted(
                Some(&format!("Mapping saved ({} updated)", changed)),
                &api::Ack {},
            ),
            Err(e) => failure(e),
        }
    }

    fn post_generate(&self, request: &Request) -> Response {
        let body: GenerateBody = match json_body(request) {
            Ok(body) => body,
            Err(resp) => return resp,
        };
        match self.generate(&body.text) {
            Ok(artifact) => accepted(None, &GenerateData {
                image_url: artifact.url,
                content_hash: Some(artifact.hash),
            }),
            Err(e) => failure(e),
        }
    }
}

fn json_body<T: DeserializeOwned>(request: &Request) -> Result<T, Response> {
    let bytes = request.bytes().unwrap_or_default();
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!("Bad request body for {}: {}", request.path(), e);
        failure(RegistryError::InvalidInput(format!("Invalid request body: {}", e)))
    })
}

fn failure(error: RegistryError) -> Response {
    tracing::warn!("Request rejected: {}", error);
    rejected(&error.to_string(), Some(error.code()))
}

fn raw(bytes: Option<Vec<u8>>, content_type: &str) -> Response {
    match bytes {
        Some(body) => Response {
            status: 200,
            headers: vec![("Content-Type".into(), content_type.into())],
            body,
        },
        None => not_found(),
    }
}

fn not_found() -> Response {
    Response {
        status: 404,
        headers: vec![("Content-Type".into(), "text/plain".into())],
        body: b"Not Found".to_vec(),
    }
}
