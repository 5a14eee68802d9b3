//! Endpoint paths and wire types
//!
//! Field names follow the backend's JSON exactly. Optional fields are
//! skipped when absent so older backends see the payloads they expect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GET_ACTIVE_FONT: &str = "/get_active_font";
pub const GET_FONTS: &str = "/get_fonts";
pub const SET_ACTIVE_FONT: &str = "/set_active_font";
pub const UPLOAD_HANDWRITING: &str = "/upload_handwriting";
pub const DELETE_FONT: &str = "/delete_font";
pub const GET_EXTRACTED_CHARS: &str = "/get_extracted_chars";
pub const SAVE_MAPPING: &str = "/save_mapping";
pub const GENERATE: &str = "/generate";

/// Generated artifacts: `/output/<hash>.png`
pub const OUTPUT_PREFIX: &str = "/output/";
/// Glyph images: `/glyphs/<font>/<filename>`
pub const GLYPHS_PREFIX: &str = "/glyphs/";

/// Machine-readable failure codes carried next to `error`
pub mod codes {
    pub const NOT_FOUND: &str = "not_found";
    pub const STALE_REVISION: &str = "stale_revision";
    pub const FONT_MISMATCH: &str = "font_mismatch";
    pub const NO_ACTIVE_FONT: &str = "no_active_font";
    pub const INVALID_MAPPING: &str = "invalid_mapping";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const EXTRACTION_FAILED: &str = "extraction_failed";
    pub const RENDER_FAILED: &str = "render_failed";
}

/// Success with no payload beyond `message`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

/// `GET /get_active_font`. No id means no font is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFontData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_font_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_font_name: Option<String>,
    /// Monotonic revision of the server's active pointer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub id: String,
    pub name: String,
}

/// `GET /get_fonts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontsData {
    pub fonts: Vec<FontEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetActiveFontBody {
    pub font_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revision: Option<u64>,
}

/// `POST /upload_handwriting`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadData {
    pub font_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFontBody {
    pub font_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphEntry {
    pub filename: String,
    pub image_url: String,
    #[serde(default)]
    pub mapped_char: Option<String>,
}

/// `GET /get_extracted_chars`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphsData {
    pub characters: Vec<GlyphEntry>,
    /// Font the glyphs belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_font: Option<String>,
}

/// One entry of a mapping submission. A filename missing from the
/// submission is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingEdit {
    /// `"A"`
    Set(String),
    /// `null`
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMappingBody {
    pub mapping: BTreeMap<String, MappingEdit>,
    /// Rejects the save if the server's active font moved since loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_font_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBody {
    pub text: String,
}

/// `POST /generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateData {
    pub image_url: String,
    /// Present when `image_url` is content-addressed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}
