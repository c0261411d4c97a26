use encoding_rs::UTF_8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// At least one malformed sequence was replaced with U+FFFD.
    pub lossy: bool,
}

/// Decode a response body as UTF-8, replacing malformed sequences instead of
/// failing. A leading UTF-8 BOM is stripped.
pub fn decode_utf8_lossy(bytes: &[u8]) -> DecodedText {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    DecodedText {
        text: text.into_owned(),
        lossy: had_errors,
    }
}
