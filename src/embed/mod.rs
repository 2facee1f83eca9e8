//! Raster payload embedding.
//!
//! Exported bitmaps are inlined into the document as `data:` URIs rather
//! than linked by path, so the output file stays self-contained. Content
//! classification lives in [`classify`].

pub mod classify;

pub use classify::{MediaType, PREFIX_LEN, classify};

use base64::{Engine as _, engine::general_purpose};

/// Build a `data:` URI for an embeddable payload.
pub fn data_uri(media: MediaType, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        media.mime(),
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Whether a link value already carries inline data.
pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_shape() {
        let uri = data_uri(MediaType::Png, b"abc");
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_data_uri_empty_payload() {
        assert_eq!(data_uri(MediaType::Gif, b""), "data:image/gif;base64,");
    }

    #[test]
    fn test_is_data_uri() {
        assert!(is_data_uri("data:image/png;base64,YWJj"));
        assert!(!is_data_uri("images/photo.png"));
        assert!(!is_data_uri(""));
    }
}
