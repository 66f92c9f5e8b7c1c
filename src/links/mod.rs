//! # Link Extraction Module
//!
//! First stage of the profiling pipeline: given the rendered homepage, find
//! every page one hop away that could plausibly describe the company.
//!
//! ## Key Components
//!
//! - `CandidateLink`: an absolute, in-scope URL discovered on the homepage
//! - `extract_links`: parses anchors, drops noise and resolves the rest
//! - `LinkFilterConfig` / `LinkFilter`: the configurable exclusion rules
//!
//! Exclusion rules run on the raw `href` in a fixed order (scheme prefix,
//! phone number, bare email, denylisted keyword). Survivors are resolved
//! against the base URL and must then have an allowed scheme.

mod config;
mod error;

pub use config::{
    DEFAULT_EMAIL_PATTERN, DEFAULT_PHONE_PATTERN, ExclusionRule, LinkFilter, LinkFilterConfig,
    LinkFilterConfigBuilder,
};
pub use error::LinkError;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, instrument, trace};
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// An absolute URL discovered on the homepage, not yet judged relevant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateLink(Url);

impl CandidateLink {
    /// Parse an absolute URL into a candidate link
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self)
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying URL
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CandidateLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for CandidateLink {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

/// Extract candidate links from a rendered HTML document
///
/// # Arguments
///
/// * `html` - The rendered homepage document
/// * `base_url` - The URL the document was fetched from
/// * `filter` - The compiled exclusion rules
///
/// # Returns
///
/// The deduplicated, lexicographically ordered set of absolute candidate URLs
#[instrument(skip(html, filter), fields(html_len = html.len()))]
pub fn extract_links(
    html: &str,
    base_url: &str,
    filter: &LinkFilter,
) -> Result<BTreeSet<CandidateLink>, LinkError> {
    let base = Url::parse(base_url).map_err(|source| LinkError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();
    let mut rejected = 0usize;

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if let Some(rule) = filter.rejection(href) {
            trace!(href, ?rule, "Excluded link");
            rejected += 1;
            continue;
        }

        match resolve(&base, href, filter) {
            Ok(url) => {
                links.insert(CandidateLink(url));
            }
            Err(rule) => {
                trace!(href, ?rule, "Excluded resolved link");
                rejected += 1;
            }
        }
    }

    debug!(
        candidates = links.len(),
        rejected, "Extracted links from {}", base
    );
    Ok(links)
}

/// Resolve an href against the base URL and apply the post-resolution rules
fn resolve(base: &Url, href: &str, filter: &LinkFilter) -> Result<Url, ExclusionRule> {
    let mut url = base
        .join(href)
        .map_err(|_| ExclusionRule::DisallowedScheme)?;

    if !filter
        .allowed_schemes
        .iter()
        .any(|scheme| scheme == url.scheme())
    {
        return Err(ExclusionRule::DisallowedScheme);
    }

    if filter.same_host_only && url.host_str() != base.host_str() {
        return Err(ExclusionRule::ForeignHost);
    }

    // Only the path and query are checked so a host name containing a
    // denylisted word does not wipe out the whole site.
    let mut tail = url.path().to_string();
    if let Some(query) = url.query() {
        tail.push('?');
        tail.push_str(query);
    }
    if filter.is_denied_keyword(&tail) {
        return Err(ExclusionRule::DeniedKeyword);
    }

    if filter.strip_fragments {
        url.set_fragment(None);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|href| format!("<a href=\"{}\">link</a>", href))
            .collect();
        format!("<html><body><nav>{}</nav></body></html>", anchors)
    }

    fn strings(links: &BTreeSet<CandidateLink>) -> Vec<&str> {
        links.iter().map(|l| l.as_str()).collect()
    }

    #[test]
    fn test_homepage_scenario() {
        let html = page(&[
            "/about",
            "mailto:x@y.com",
            "https://site.com/blog/post1",
            "/contact",
        ]);

        let links = extract_links(&html, "https://site.com", &LinkFilter::default()).unwrap();

        assert_eq!(
            strings(&links),
            vec!["https://site.com/about", "https://site.com/contact"]
        );
    }

    #[test]
    fn test_resolves_relative_forms() {
        let html = page(&[
            "oferta",
            "/o-nas",
            "//cdn.site.com/katalog",
            "https://other.pl/partner",
            "../kontakt",
        ]);

        let links =
            extract_links(&html, "https://site.com/pl/start", &LinkFilter::default()).unwrap();

        assert_eq!(
            strings(&links),
            vec![
                "https://cdn.site.com/katalog",
                "https://other.pl/partner",
                "https://site.com/kontakt",
                "https://site.com/o-nas",
                "https://site.com/pl/oferta",
            ]
        );
    }

    #[test]
    fn test_never_emits_noise() {
        let html = page(&[
            "tel:+48123456789",
            "MAILTO:biuro@site.com",
            "+48 (22) 555-12-12",
            "biuro@site.com",
            "/publications/2023",
            "/Blog",
            "javascript:void(0)",
            "/uslugi",
        ]);

        let links = extract_links(&html, "https://site.com", &LinkFilter::default()).unwrap();

        assert_eq!(strings(&links), vec!["https://site.com/uslugi"]);
        for link in &links {
            assert!(link.url().scheme().starts_with("http"));
            assert!(!link.as_str().contains('@'));
        }
    }

    #[test]
    fn test_fragments_collapse() {
        let html = page(&["/about#team", "/about", "  /about#history  "]);

        let links = extract_links(&html, "https://site.com", &LinkFilter::default()).unwrap();

        assert_eq!(strings(&links), vec!["https://site.com/about"]);
    }

    #[test]
    fn test_keyword_in_host_does_not_exclude() {
        let html = page(&["/o-firmie", "/blog/wpis"]);

        let links =
            extract_links(&html, "https://blogmedia.pl", &LinkFilter::default()).unwrap();

        assert_eq!(strings(&links), vec!["https://blogmedia.pl/o-firmie"]);
    }

    #[test]
    fn test_relative_path_into_denied_section() {
        let html = page(&["wpis-1"]);

        let links =
            extract_links(&html, "https://site.com/blog/", &LinkFilter::default()).unwrap();

        assert!(links.is_empty());
    }

    #[test]
    fn test_same_host_only() {
        let filter = LinkFilterConfig::builder()
            .same_host_only(true)
            .build()
            .compile()
            .unwrap();
        let html = page(&["/produkty", "https://facebook.com/firma"]);

        let links = extract_links(&html, "https://site.com", &filter).unwrap();

        assert_eq!(strings(&links), vec!["https://site.com/produkty"]);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = extract_links("<a href=\"/x\">x</a>", "site.com", &LinkFilter::default());

        assert!(matches!(result, Err(LinkError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let html = "<a name=\"top\">top</a><a href=\"/kontakt\">kontakt</a>";

        let links = extract_links(html, "https://site.com", &LinkFilter::default()).unwrap();

        assert_eq!(links.len(), 1);
    }
}
