//! Glyph extraction seam
//!
//! Turning a handwriting photo into per-character images is an external
//! service; the registry only needs the resulting images and their names.

/// One segmented character image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGlyph {
    pub filename: String,
    pub image: Vec<u8>,
}

/// Segments a handwriting sample into glyph images
pub trait GlyphExtractor: Send + Sync {
    fn extract(&self, sample: &[u8]) -> Result<Vec<ExtractedGlyph>, String>;
}

/// Splits the sample into `count` equal slices named `char_<n>.png`.
///
/// Stands in for a real segmenter in tests and offline setups.
#[derive(Debug, Clone, Copy)]
pub struct FixedCountExtractor {
    count: usize,
}

impl FixedCountExtractor {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for FixedCountExtractor {
    fn default() -> Self {
        Self::new(4)
    }
}

impl GlyphExtractor for FixedCountExtractor {
    fn extract(&self, sample: &[u8]) -> Result<Vec<ExtractedGlyph>, String> {
        if self.count == 0 || sample.is_empty() {
            return Ok(Vec::new());
        }
        let slice_len = sample.len().div_ceil(self.count);
        Ok(sample.chunks(slice_len)
            .enumerate()
            .map(|(i, chunk)| ExtractedGlyph {
                filename: format!("char_{}.png", i + 1),
                image: chunk.to_vec(),
            })
            .collect())
    }
}
