//! Binary content classification.
//!
//! Embeddable payloads are recognized by a fixed list of magic byte
//! prefixes, with a filename-suffix fallback for formats that lack a
//! usable one. Anything outside the list stays unembedded.

/// Media types this tool knows how to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    Ico,
    Svg,
}

impl MediaType {
    /// MIME string used inside the `data:` URI.
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
            Self::Ico => "image/x-icon",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// How many leading bytes [`classify`] wants to see.
pub const PREFIX_LEN: usize = 10;

/// Magic prefixes, first match wins. The prefixes are mutually disjoint.
const MAGIC: &[(&[u8], MediaType)] = &[
    (b"\x89PNG", MediaType::Png),
    (&[0xFF, 0xD8], MediaType::Jpeg),
    (b"BM", MediaType::Bmp),
    (b"GIF87a", MediaType::Gif),
    (b"GIF89a", MediaType::Gif),
    (b"MM\x00\x2a", MediaType::Tiff),
    (b"II\x2a\x00", MediaType::Tiff),
];

/// Suffix fallbacks for formats without a checked magic prefix.
const SUFFIXES: &[(&str, MediaType)] = &[(".ico", MediaType::Ico), (".svg", MediaType::Svg)];

/// Classify a payload from its leading bytes, falling back to the filename
/// suffix. `None` means the content cannot be embedded.
pub fn classify(prefix: &[u8], filename: &str) -> Option<MediaType> {
    for &(magic, media) in MAGIC {
        if prefix.starts_with(magic) {
            return Some(media);
        }
    }
    for &(suffix, media) in SUFFIXES {
        if filename.ends_with(suffix) {
            return Some(media);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_prefixes() {
        assert_eq!(
            classify(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "x"),
            Some(MediaType::Png)
        );
        assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0], "x"), Some(MediaType::Jpeg));
        assert_eq!(classify(b"BM\x36\x00", "x"), Some(MediaType::Bmp));
        assert_eq!(classify(b"GIF87a....", "x"), Some(MediaType::Gif));
        assert_eq!(classify(b"GIF89a....", "x"), Some(MediaType::Gif));
        assert_eq!(classify(b"MM\x00\x2a..", "x"), Some(MediaType::Tiff));
        assert_eq!(classify(b"II\x2a\x00..", "x"), Some(MediaType::Tiff));
    }

    #[test]
    fn test_magic_wins_over_suffix() {
        assert_eq!(classify(b"\x89PNGxxxx", "picture.svg"), Some(MediaType::Png));
    }

    #[test]
    fn test_suffix_fallback() {
        assert_eq!(classify(b"\x00\x00\x01\x00", "icon.ico"), Some(MediaType::Ico));
        assert_eq!(classify(b"<svg xmlns", "drawing.svg"), Some(MediaType::Svg));
    }

    #[test]
    fn test_unrecognized_is_none() {
        assert_eq!(classify(b"\x00\x01\x02\x03", "unknown.bin"), None);
        assert_eq!(classify(b"", ""), None);
    }

    #[test]
    fn test_mime_strings() {
        assert_eq!(MediaType::Png.mime(), "image/png");
        assert_eq!(MediaType::Ico.mime(), "image/x-icon");
        assert_eq!(MediaType::Svg.mime(), "image/svg+xml");
    }
}
