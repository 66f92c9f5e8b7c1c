//! # Content Normalization Module
//!
//! Turns the raw text of fetched pages into the corpus handed to profile
//! synthesis. Every page is cleaned on its own: Unicode normalization,
//! whitespace collapsing, noise removal, sentence deduplication. NIP and
//! REGON numbers are set aside before the noise filters run and appended
//! back afterwards, so a phone pattern can never eat a tax number.
//!
//! ## Key Components
//!
//! - `PageDocument`: one fetched page (URL + extracted text)
//! - `NoiseFilters` / `NoisePattern`: named, replaceable boilerplate predicates
//! - `RegulatoryIdentifiers`: NIP/REGON tokens found on a page
//! - `NormalizedCorpus`: the concatenated, source-annotated result
//! - `normalize`: pure function from pages to corpus

mod error;
pub mod filters;
mod identifiers;

pub use error::NormalizeError;
pub use filters::{NoiseFilters, NoiseFiltersBuilder, NoisePattern};
pub use identifiers::{RegulatoryIdentifiers, digits};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid blank line pattern"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d\s\-]*\d").expect("valid digit run pattern"));

const SENTENCE_BREAK: &str = ". ";

/// Text extracted from one fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    pub url: String,
    pub text: String,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Cleaned text of all surviving pages, one `Source:` block per page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedCorpus {
    text: String,
    sources: Vec<String>,
    identifiers: Vec<String>,
}

impl NormalizedCorpus {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// URLs of the pages that made it into the corpus, in order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// NIP/REGON tokens found across all pages, first occurrence order
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether an identifier's digits show up in the corpus
    ///
    /// Compares digits only, so "REGON 012345678" matches "012-345-678".
    /// A textual presence check, not a registry lookup.
    pub fn mentions_identifier(&self, identifier: &str) -> bool {
        let wanted = digits(identifier);
        if wanted.is_empty() {
            return false;
        }
        self.identifiers.iter().any(|id| digits(id) == wanted)
            || DIGIT_RUN
                .find_iter(&self.text)
                .any(|run| digits(run.as_str()).contains(&wanted))
    }
}

impl fmt::Display for NormalizedCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Clean and concatenate pages, in input order
///
/// Pages that clean to nothing contribute no block. Pure: the same pages
/// always give the same corpus.
pub fn normalize(pages: &[PageDocument], filters: &NoiseFilters) -> NormalizedCorpus {
    let mut corpus = NormalizedCorpus::default();
    let mut seen_identifiers = HashSet::new();

    for page in pages {
        let (content, identifiers) = clean_page(&page.text, filters);
        if content.is_empty() {
            debug!(url = %page.url, "Page is empty after cleaning, skipping");
            continue;
        }

        corpus.text.push_str(&format!(
            "Source: {}\nContent:\n{}\n\n",
            page.url, content
        ));
        corpus.sources.push(page.url.clone());
        for id in identifiers.lines() {
            if seen_identifiers.insert(id.to_string()) {
                corpus.identifiers.push(id.to_string());
            }
        }
    }

    debug!(
        pages = pages.len(),
        kept = corpus.sources.len(),
        chars = corpus.text.len(),
        "Normalized corpus"
    );
    corpus
}

/// Clean the text of a single page
///
/// Returns the cleaned content (possibly empty) and the identifiers that were
/// appended to it. Identifier tokens leave the running text and come back as
/// trailing lines, so cleaning an already cleaned page changes nothing.
pub fn clean_page(raw: &str, filters: &NoiseFilters) -> (String, RegulatoryIdentifiers) {
    let text: String = raw.nfkd().collect();
    let text = collapse_whitespace(&text);

    let identifiers = RegulatoryIdentifiers::extract(&text);
    let text = identifiers.strip_from(&text);

    let text = filters.apply(&text);
    let text = collapse_whitespace(&text);

    let text = dedup_sentences(&text);
    let text = BLANK_LINES.replace_all(&text, "\n").trim().to_string();

    let mut lines: Vec<&str> = Vec::new();
    if !text.is_empty() {
        lines.push(&text);
    }
    lines.extend(identifiers.lines());

    (lines.join("\n"), identifiers)
}

/// Collapse every whitespace run, newlines included, to one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Keep the first occurrence of each sentence, in first-seen order
///
/// Sentences are separated by ". ". A single trailing period is set aside
/// so the last sentence compares equal to its earlier copies. Fragments
/// without any letter or digit, left behind by noise removal, are dropped.
pub fn dedup_sentences(text: &str) -> String {
    let trimmed = text.trim();
    let (body, trailing_period) = match trimmed.strip_suffix('.') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    let mut seen = HashSet::new();
    let unique: Vec<&str> = body
        .split(SENTENCE_BREAK)
        .map(str::trim)
        .filter(|sentence| sentence.chars().any(char::is_alphanumeric))
        .filter(|sentence| seen.insert(*sentence))
        .collect();

    let mut result = unique.join(SENTENCE_BREAK);
    if trailing_period && !result.is_empty() {
        result.push('.');
    }
    result
}
