//! Text extraction from rendered HTML

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Elements whose content is never page text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// Elements that start a new line of text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extract the visible text of an HTML document
///
/// # Arguments
///
/// * `html` - The rendered HTML document
/// * `exclude_selectors` - CSS selectors for elements to drop together with their subtree
///
/// # Returns
///
/// The document text with block elements separated by newlines. Whitespace is
/// otherwise left as found; collapsing it is the normalizer's job.
pub fn extract_text(html: &str, exclude_selectors: &[String]) -> String {
    let document = Html::parse_document(html);

    let mut excluded: Vec<ElementRef<'_>> = Vec::new();
    for selector_str in exclude_selectors {
        match Selector::parse(selector_str) {
            Ok(selector) => excluded.extend(document.select(&selector)),
            Err(e) => {
                warn!("Failed to parse selector '{}': {:?}", selector_str, e);
            }
        }
    }

    let mut text = String::new();
    collect_text(document.root_element(), &excluded, &mut text);
    text
}

fn collect_text(element: ElementRef<'_>, excluded: &[ElementRef<'_>], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child_element.value().name();
                if SKIPPED_TAGS.contains(&name) || excluded.contains(&child_element) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_element, excluded, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_skips_scripts_and_styles() {
        let html = r#"<html><head><title>Firma</title><style>p{color:red}</style></head>
            <body><script>var x = 1;</script><p>Producent okien.</p></body></html>"#;

        let text = extract_text(html, &[]);

        assert_eq!(squash(&text), "Producent okien.");
    }

    #[test]
    fn test_block_elements_break_lines() {
        let html = "<body><h1>O nas</h1><p>Jestesmy<b>dystrybutorem</b>.</p></body>";

        let text = extract_text(html, &[]);

        assert!(text.contains("O nas\n"));
        assert!(text.contains("Jestesmydystrybutorem."));
    }

    #[test]
    fn test_exclude_selectors_drop_subtree() {
        let html = r#"<body><nav><a href="/">Start</a></nav>
            <main><p>Oferta</p></main><div class="cookies">Cookies info</div></body>"#;

        let text = extract_text(html, &["nav".to_string(), ".cookies".to_string()]);

        assert_eq!(squash(&text), "Oferta");
    }

    #[test]
    fn test_invalid_selector_is_ignored() {
        let html = "<body><p>Tekst</p></body>";

        let text = extract_text(html, &["[[".to_string()]);

        assert_eq!(squash(&text), "Tekst");
    }

    #[test]
    fn test_footer_kept_by_default() {
        let html = "<body><p>Oferta</p><footer>NIP 123-456-78-90</footer></body>";

        let text = extract_text(html, &[]);

        assert!(text.contains("NIP 123-456-78-90"));
    }
}
