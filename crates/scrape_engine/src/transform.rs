use std::sync::Arc;

use scrape_logging::{scrape_error, scrape_info, scrape_warn};

use crate::convert::{Converter, Html2MdConverter};
use crate::normalize::normalize_document;

pub const CONVERSION_FAILED_MARKER: &str = "[Markdown conversion failed]";

/// Turns fetched HTML into the final Markdown text of a page.
///
/// Never fails: conversion trouble degrades to [`CONVERSION_FAILED_MARKER`].
#[derive(Clone)]
pub struct PageTransformer {
    converter: Arc<dyn Converter>,
}

impl PageTransformer {
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self { converter }
    }

    pub fn transform(&self, base_url: &str, html: &str) -> String {
        let normalized = normalize_document(html, base_url);
        if normalized.used_document_root {
            scrape_warn!(
                url = base_url;
                "No <body> tag found in {}. Attempting conversion from root.", base_url
            );
        }

        let body = if normalized.html.trim().is_empty() {
            scrape_error!(
                url = base_url, error_code = 7002u16;
                "No HTML content found to convert for {}", base_url
            );
            String::new()
        } else {
            match self.converter.to_markdown(&normalized.html) {
                Ok(markdown) => {
                    scrape_info!(
                        url = base_url;
                        "Converted HTML body to Markdown for {}", base_url
                    );
                    normalized.restore_images(&markdown)
                }
                Err(err) => {
                    scrape_error!(
                        url = base_url, error_code = 7001u16;
                        "Markdown conversion failed for {}: {}", base_url, err
                    );
                    CONVERSION_FAILED_MARKER.to_string()
                }
            }
        };

        with_source_footer(&body, base_url)
    }
}

impl Default for PageTransformer {
    fn default() -> Self {
        Self::new(Arc::new(Html2MdConverter))
    }
}

fn with_source_footer(body: &str, url: &str) -> String {
    format!("{body}\n\n---\nSource URL: {url}\n")
}
