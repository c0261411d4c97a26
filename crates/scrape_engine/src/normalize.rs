//! Link and image normalization ahead of Markdown conversion.
//!
//! The document tree is re-serialized with every `<a href>` made absolute and
//! every `<img>` replaced by an inert placeholder token. Placeholders survive
//! the HTML-to-Markdown transform untouched and are swapped for
//! `![alt](src)` afterwards, so the converter never sees (or escapes) image
//! syntax. Image bytes are never requested.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{Html, Selector};
use scrape_logging::{scrape_debug, scrape_info};
use url::Url;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];
const ALT_STRIPPED: &[char] = &['[', ']', '(', ')'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHtml {
    pub html: String,
    pub images: Vec<ImagePlaceholder>,
    /// Images dropped because they had no `src`.
    pub skipped_images: usize,
    /// Images dropped because their `src` could not be resolved.
    pub removed_images: usize,
    /// No `<body>` was found; the whole document was serialized.
    pub used_document_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlaceholder {
    pub token: String,
    pub markdown: String,
}

impl NormalizedHtml {
    /// Swap every placeholder token in `markdown` for its image syntax.
    pub fn restore_images(&self, markdown: &str) -> String {
        let mut out = markdown.to_string();
        for image in &self.images {
            out = out.replace(&image.token, &image.markdown);
        }
        out
    }
}

pub fn normalize_document(html: &str, base_url: &str) -> NormalizedHtml {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();
    let mut writer = HtmlWriter::new(base, base_url);

    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next());
    let used_document_root = match body {
        Some(body) => {
            writer.write_node(*body);
            false
        }
        None => {
            writer.write_node(document.tree.root());
            true
        }
    };

    writer.record_unresolved_images();

    NormalizedHtml {
        html: writer.out,
        images: writer.images,
        skipped_images: writer.skipped_images,
        removed_images: writer.removed_images,
        used_document_root,
    }
}

/// `![alt](src)` for an image, with alt characters that would break the
/// syntax removed.
pub fn image_markdown(alt: &str, absolute_src: &str) -> String {
    let alt: String = alt.chars().filter(|c| !ALT_STRIPPED.contains(c)).collect();
    format!("![{alt}]({absolute_src})")
}

fn resolve(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Into::into)
}

struct HtmlWriter<'a> {
    out: String,
    base: Option<Url>,
    page_url: &'a str,
    images: Vec<ImagePlaceholder>,
    skipped_images: usize,
    removed_images: usize,
    unresolved_images: Vec<String>,
}

impl<'a> HtmlWriter<'a> {
    fn new(base: Option<Url>, page_url: &'a str) -> Self {
        Self {
            out: String::new(),
            base,
            page_url,
            images: Vec::new(),
            skipped_images: 0,
            removed_images: 0,
            unresolved_images: Vec::new(),
        }
    }

    fn write_node(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => {
                let raw_parent = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
                    .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name.as_str()));
                if raw_parent {
                    self.out.push_str(text);
                } else {
                    push_escaped(&mut self.out, text, false);
                }
            }
            Node::Element(element) => {
                let name = element.name().to_ascii_lowercase();
                if name == "img" {
                    self.write_image(element);
                    return;
                }
                self.out.push('<');
                self.out.push_str(&name);
                for (attr, value) in element.attrs() {
                    let value = if name == "a" && attr.eq_ignore_ascii_case("href") {
                        resolve(value, self.base.as_ref()).unwrap_or_else(|| value.to_string())
                    } else {
                        value.to_string()
                    };
                    self.out.push(' ');
                    self.out.push_str(attr);
                    self.out.push_str("=\"");
                    push_escaped(&mut self.out, &value, true);
                    self.out.push('"');
                }
                self.out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for child in node.children() {
                    self.write_node(child);
                }
                self.out.push_str("</");
                self.out.push_str(&name);
                self.out.push('>');
            }
            Node::Document | Node::Fragment => {
                for child in node.children() {
                    self.write_node(child);
                }
            }
            // Comments, doctypes and processing instructions carry no content.
            _ => {}
        }
    }

    fn write_image(&mut self, element: &scraper::node::Element) {
        let Some(src) = element.attr("src").filter(|src| !src.trim().is_empty()) else {
            self.skipped_images += 1;
            scrape_info!(url = self.page_url; "Skipping image without src on {}", self.page_url);
            return;
        };
        let Some(absolute) = resolve(src, self.base.as_ref()) else {
            self.unresolved_images.push(src.to_string());
            return;
        };
        let alt = element.attr("alt").unwrap_or("");
        let token = format!("XSCRAPEIMG{}X", self.images.len());
        self.out.push_str(&token);
        self.images.push(ImagePlaceholder {
            token,
            markdown: image_markdown(alt, &absolute),
        });
    }

    /// Count and log images whose `src` could not be resolved. They were
    /// never written, so nothing is left to remove from the output.
    fn record_unresolved_images(&mut self) {
        for src in self.unresolved_images.drain(..) {
            self.removed_images += 1;
            scrape_debug!(
                url = self.page_url;
                "Removed leftover image {:?} on {}", src, self.page_url
            );
        }
    }
}

fn push_escaped(out: &mut String, text: &str, attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alt_text_loses_bracket_and_paren_characters() {
        assert_eq!(
            image_markdown("[Special] (Chars)", "https://e.com/s.png"),
            "![Special Chars](https://e.com/s.png)"
        );
    }

    #[test]
    fn anchors_become_absolute() {
        let out = normalize_document(
            r#"<body><a href="../intro">Intro</a><a href="https://other.org/x">X</a></body>"#,
            "https://e.com/docs/guide/page",
        );
        assert!(out.html.contains(r#"href="https://e.com/docs/intro""#));
        assert!(out.html.contains(r#"href="https://other.org/x""#));
    }

    #[test]
    fn images_are_replaced_by_placeholders() {
        let out = normalize_document(
            r#"<body><p>a<img src="x.png" alt="X">b</p><img alt="nope"></body>"#,
            "https://e.com/docs/",
        );
        assert_eq!(out.images.len(), 1);
        assert_eq!(out.images[0].markdown, "![X](https://e.com/docs/x.png)");
        assert!(out.html.contains("aXSCRAPEIMG0Xb"));
        assert!(!out.html.contains("<img"));
        assert_eq!(out.skipped_images, 1);
    }

    #[test]
    fn blank_src_counts_as_missing() {
        let out = normalize_document(
            r#"<body><img src="" alt="Empty"><img src="   " alt="Blank"></body>"#,
            "https://e.com/docs/page.html",
        );
        assert!(out.images.is_empty());
        assert_eq!(out.skipped_images, 2);
        assert!(!out.html.contains("XSCRAPEIMG"));
    }

    #[test]
    fn text_is_escaped_when_reserialized() {
        let out = normalize_document("<body><p>1 &lt; 2 &amp; 3</p></body>", "https://e.com/");
        assert!(out.html.contains("<p>1 &lt; 2 &amp; 3</p>"));
    }

    #[test]
    fn comments_are_dropped() {
        let out = normalize_document("<body><!-- hidden --><p>shown</p></body>", "https://e.com/");
        assert!(!out.html.contains("hidden"));
        assert!(out.html.contains("shown"));
    }
}
