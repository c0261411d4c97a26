use scraper::{Html, Selector};

/// Text of the page's main heading: the first `<h1>`, else the first heading
/// of any level. Whitespace is collapsed; empty headings are ignored.
pub fn first_heading(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    ["h1", "h1, h2, h3, h4, h5, h6"]
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|sel| {
            doc.select(&sel)
                .map(|heading| {
                    heading
                        .text()
                        .flat_map(str::split_whitespace)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .find(|text| !text.is_empty())
        })
}
