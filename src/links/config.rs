//! # Link Filter Configuration Module
//!
//! Configuration for the link extractor: which hrefs count as noise and which
//! absolute URLs are in scope. Every exclusion rule is its own setting so the
//! denylist can grow without touching the extraction loop.
//!
//! ## Key Components
//!
//! - `LinkFilterConfig`: plain configuration values with defaults taken from
//!   typical corporate sites
//! - `LinkFilterConfigBuilder`: builder for the configuration
//! - `LinkFilter`: the compiled, ready-to-match form of the configuration

use regex::{Regex, RegexBuilder};

use crate::links::error::LinkError;

/// Default pattern for hrefs that are nothing but a phone number
pub const DEFAULT_PHONE_PATTERN: &str = r"^[\+\d\-\(\)\s]+$";

/// Default pattern for hrefs that are a bare email address
pub const DEFAULT_EMAIL_PATTERN: &str = r".+@.+\..+";

/// Configuration for link filtering
#[derive(Debug, Clone)]
pub struct LinkFilterConfig {
    /// Scheme prefixes that are never followed (matched case-insensitively)
    pub excluded_prefixes: Vec<String>,

    /// Regex for hrefs that look like a bare phone number
    pub phone_pattern: String,

    /// Regex for hrefs that look like a bare email address
    pub email_pattern: String,

    /// Keywords that disqualify a link when found anywhere in it (case-insensitive)
    pub deny_keywords: Vec<String>,

    /// Schemes an absolute candidate URL may have
    pub allowed_schemes: Vec<String>,

    /// Whether to keep only links on the same host as the base URL
    pub same_host_only: bool,

    /// Whether to drop `#fragment` parts so anchors on one page collapse
    pub strip_fragments: bool,
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec!["mailto:".to_string(), "tel:".to_string()],
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            deny_keywords: vec!["blog".to_string(), "publications".to_string()],
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            same_host_only: false,
            strip_fragments: true,
        }
    }
}

/// Builder for LinkFilterConfig
#[derive(Debug, Default)]
pub struct LinkFilterConfigBuilder {
    config: LinkFilterConfig,
}

impl LinkFilterConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LinkFilterConfig::default(),
        }
    }

    /// Replace the keyword denylist
    pub fn deny_keywords(mut self, deny_keywords: Vec<String>) -> Self {
        self.config.deny_keywords = deny_keywords;
        self
    }

    /// Add a keyword to the denylist
    pub fn deny_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.config.deny_keywords.push(keyword.into());
        self
    }

    /// Set the phone number pattern
    pub fn phone_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.phone_pattern = pattern.into();
        self
    }

    /// Set the email pattern
    pub fn email_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.email_pattern = pattern.into();
        self
    }

    /// Set the excluded scheme prefixes
    pub fn excluded_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.config.excluded_prefixes = prefixes;
        self
    }

    /// Restrict candidates to the base URL's host
    pub fn same_host_only(mut self, same_host_only: bool) -> Self {
        self.config.same_host_only = same_host_only;
        self
    }

    /// Set whether fragments are stripped
    pub fn strip_fragments(mut self, strip_fragments: bool) -> Self {
        self.config.strip_fragments = strip_fragments;
        self
    }

    /// Build the configuration
    pub fn build(self) -> LinkFilterConfig {
        self.config
    }
}

impl LinkFilterConfig {
    /// Create a new builder
    pub fn builder() -> LinkFilterConfigBuilder {
        LinkFilterConfigBuilder::new()
    }

    /// Compile the configured patterns into a `LinkFilter`
    pub fn compile(&self) -> Result<LinkFilter, LinkError> {
        let phone = Regex::new(&self.phone_pattern).map_err(|source| LinkError::InvalidPattern {
            rule: "phone",
            source,
        })?;
        let email = Regex::new(&self.email_pattern).map_err(|source| LinkError::InvalidPattern {
            rule: "email",
            source,
        })?;

        let keywords: Vec<String> = self
            .deny_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        let keyword = if keywords.is_empty() {
            None
        } else {
            let pattern = keywords.join("|");
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| LinkError::InvalidPattern {
                        rule: "keyword",
                        source,
                    })?,
            )
        };

        Ok(LinkFilter {
            excluded_prefixes: self
                .excluded_prefixes
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
            phone,
            email,
            keyword,
            allowed_schemes: self
                .allowed_schemes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            same_host_only: self.same_host_only,
            strip_fragments: self.strip_fragments,
        })
    }
}

/// The rule that excluded an href
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionRule {
    /// `mailto:`/`tel:` style scheme prefix
    SchemePrefix,
    /// Looks like a bare phone number
    PhoneNumber,
    /// Looks like a bare email address
    BareEmail,
    /// Contains a denylisted keyword
    DeniedKeyword,
    /// Resolved URL has a scheme outside the allowed set
    DisallowedScheme,
    /// Resolved URL points at another host
    ForeignHost,
}

/// Compiled link filter
#[derive(Debug, Clone)]
pub struct LinkFilter {
    excluded_prefixes: Vec<String>,
    phone: Regex,
    email: Regex,
    keyword: Option<Regex>,
    pub(crate) allowed_schemes: Vec<String>,
    pub(crate) same_host_only: bool,
    pub(crate) strip_fragments: bool,
}

impl Default for LinkFilter {
    fn default() -> Self {
        LinkFilterConfig::default()
            .compile()
            .expect("default link filter patterns must compile")
    }
}

impl LinkFilter {
    /// Check a raw, trimmed href against the exclusion rules in order
    ///
    /// Returns the first rule that rejects the href, or `None` if it passes.
    pub fn rejection(&self, href: &str) -> Option<ExclusionRule> {
        let lowered = href.to_ascii_lowercase();
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
        {
            return Some(ExclusionRule::SchemePrefix);
        }
        if self.phone.is_match(href) {
            return Some(ExclusionRule::PhoneNumber);
        }
        if self.email.is_match(href) {
            return Some(ExclusionRule::BareEmail);
        }
        if self.is_denied_keyword(href) {
            return Some(ExclusionRule::DeniedKeyword);
        }
        None
    }

    /// Whether the text contains a denylisted keyword
    pub fn is_denied_keyword(&self, text: &str) -> bool {
        self.keyword.as_ref().is_some_and(|re| re.is_match(text))
    }
}
