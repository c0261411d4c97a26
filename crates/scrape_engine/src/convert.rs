use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("markdown conversion failed: {0}")]
pub struct ConvertError(pub String);

/// Generic HTML-to-Markdown text transform. Output is never hard-wrapped.
pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        // html2md reports trouble by panicking; keep that inside this call.
        panic::catch_unwind(AssertUnwindSafe(|| html2md::parse_html(html))).map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "converter panicked".to_string());
            ConvertError(reason)
        })
    }
}
