//! Lossless PNG recompression.

use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

/// Re-encode a PNG at maximum compression, returning whichever encoding is
/// smaller. The pixel data is unchanged.
pub fn recompress_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).context("decoding exported PNG")?;

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    decoded
        .write_with_encoder(encoder)
        .context("re-encoding PNG")?;

    if out.len() < bytes.len() {
        Ok(out)
    } else {
        Ok(bytes.to_vec())
    }
}
