//! # Noise Filters
//!
//! Boilerplate removal for page text. Each kind of noise is a named
//! `NoisePattern`; `NoiseFilters` is an ordered list of them, so a caller can
//! swap, drop or add one filter without touching the cleaning steps.

use regex::{Regex, RegexBuilder};
use unicode_normalization::UnicodeNormalization;

use crate::normalizer::error::NormalizeError;

/// Phone number sequences, at least eight characters long
pub const PHONE_PATTERN: &str = r"\+?\d[\d\s\-\(\)]{7,}";

/// Anything that looks like an email address
pub const EMAIL_PATTERN: &str = r"\S+@\S+";

/// Social media links and mentions
pub const SOCIAL_PATTERN: &str =
    r"(?i)\S*\b(?:facebook|twitter|linkedin|instagram|youtube|tiktok)\.com\S*";

/// Legal and footer phrases removed by default
pub const LEGAL_PHRASES: &[&str] = &[
    "Polityka prywatności",
    "Polityka cookies",
    "Wszelkie prawa zastrzeżone",
    "Zastrzeżenia",
    "Privacy policy",
    "All rights reserved",
    "Cookies",
];

pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";
pub const LEGAL: &str = "legal";
pub const SOCIAL: &str = "social";

/// One named noise predicate
#[derive(Debug, Clone)]
pub struct NoisePattern {
    name: String,
    regex: Regex,
}

impl NoisePattern {
    /// Compile a noise pattern from a regular expression
    pub fn new(name: &str, pattern: &str) -> Result<Self, NormalizeError> {
        let regex = Regex::new(pattern).map_err(|source| NormalizeError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    /// Build a case-insensitive pattern matching any of the literal phrases
    ///
    /// Phrases go through the same NFKD normalization as page text, so
    /// "prywatności" matches whatever form the page used.
    pub fn phrases<S: AsRef<str>>(name: &str, phrases: &[S]) -> Result<Self, NormalizeError> {
        let alternation = phrases
            .iter()
            .map(|p| regex::escape(&p.as_ref().nfkd().collect::<String>()))
            .collect::<Vec<_>>()
            .join("|");
        // An empty alternation would match everywhere
        let pattern = if alternation.is_empty() {
            r"\b\B".to_string()
        } else {
            alternation
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| NormalizeError::InvalidPattern {
                name: name.to_string(),
                source,
            })?;
        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Remove every match from the text
    pub fn strip(&self, text: &str) -> String {
        self.regex.replace_all(text, "").into_owned()
    }
}

/// Ordered set of noise predicates applied to every page
#[derive(Debug, Clone)]
pub struct NoiseFilters {
    patterns: Vec<NoisePattern>,
}

impl Default for NoiseFilters {
    fn default() -> Self {
        let patterns = vec![
            NoisePattern::new(PHONE, PHONE_PATTERN).expect("valid phone pattern"),
            NoisePattern::new(EMAIL, EMAIL_PATTERN).expect("valid email pattern"),
            NoisePattern::phrases(LEGAL, LEGAL_PHRASES).expect("valid legal phrases"),
            NoisePattern::new(SOCIAL, SOCIAL_PATTERN).expect("valid social pattern"),
        ];
        Self { patterns }
    }
}

impl NoiseFilters {
    /// Filters that remove nothing
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn builder() -> NoiseFiltersBuilder {
        NoiseFiltersBuilder::new()
    }

    pub fn patterns(&self) -> &[NoisePattern] {
        &self.patterns
    }

    pub fn get(&self, name: &str) -> Option<&NoisePattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Apply every filter in order
    pub fn apply(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_string(), |acc, pattern| pattern.strip(&acc))
    }
}

/// Builder for NoiseFilters, starting from the defaults
#[derive(Debug, Default)]
pub struct NoiseFiltersBuilder {
    filters: NoiseFilters,
}

impl NoiseFiltersBuilder {
    pub fn new() -> Self {
        Self {
            filters: NoiseFilters::default(),
        }
    }

    /// Start from an empty filter list
    pub fn empty() -> Self {
        Self {
            filters: NoiseFilters::empty(),
        }
    }

    /// Add a filter, replacing any existing filter with the same name
    pub fn with(mut self, pattern: NoisePattern) -> Self {
        match self
            .filters
            .patterns
            .iter_mut()
            .find(|p| p.name == pattern.name)
        {
            Some(existing) => *existing = pattern,
            None => self.filters.patterns.push(pattern),
        }
        self
    }

    /// Drop a filter by name
    pub fn without(mut self, name: &str) -> Self {
        self.filters.patterns.retain(|p| p.name != name);
        self
    }

    /// Extend the legal phrase denylist
    pub fn extra_legal_phrases<S: AsRef<str>>(
        self,
        phrases: &[S],
    ) -> Result<Self, NormalizeError> {
        let mut all: Vec<String> = LEGAL_PHRASES.iter().map(|p| p.to_string()).collect();
        all.extend(phrases.iter().map(|p| p.as_ref().to_string()));
        Ok(self.with(NoisePattern::phrases(LEGAL, &all)?))
    }

    pub fn build(self) -> NoiseFilters {
        self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfkd(text: &str) -> String {
        text.nfkd().collect()
    }

    #[test]
    fn test_phone_filter() {
        let filters = NoiseFilters::default();
        let phone = filters.get(PHONE).unwrap();

        assert!(phone.is_match("tel. +48 22 123 45 67"));
        assert!(phone.is_match("(22) 123-45-67"));
        assert!(!phone.is_match("rok 2024"));
        assert_eq!(phone.strip("tel. 123456789"), "tel. ");
    }

    #[test]
    fn test_email_filter() {
        let filters = NoiseFilters::default();

        assert_eq!(
            filters.get(EMAIL).unwrap().strip("Napisz: biuro@firma.pl dziś"),
            "Napisz:  dziś"
        );
    }

    #[test]
    fn test_legal_phrases_match_normalized_text() {
        let filters = NoiseFilters::default();
        let legal = filters.get(LEGAL).unwrap();

        assert!(legal.is_match(&nfkd("Polityka prywatności")));
        assert!(legal.is_match(&nfkd("WSZELKIE PRAWA ZASTRZEŻONE")));
        assert!(legal.is_match("All rights reserved"));
        assert!(!legal.is_match("Produkujemy okna"));
    }

    #[test]
    fn test_social_filter() {
        let filters = NoiseFilters::default();
        let social = filters.get(SOCIAL).unwrap();

        assert_eq!(
            social.strip("Znajdź nas: https://www.facebook.com/firma oraz LinkedIn.com/company/x"),
            "Znajdź nas:  oraz "
        );
    }

    #[test]
    fn test_builder_replaces_and_removes_filters() {
        let filters = NoiseFilters::builder()
            .with(NoisePattern::new(PHONE, r"\d{9}").unwrap())
            .without(SOCIAL)
            .with(NoisePattern::new("newsletter", "(?i)zapisz się do newslettera").unwrap())
            .build();

        let names: Vec<&str> = filters.patterns().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec![PHONE, EMAIL, LEGAL, "newsletter"]);
        assert_eq!(filters.apply("tel 123456789"), "tel ");
    }

    #[test]
    fn test_extra_legal_phrases() {
        let filters = NoiseFilters::builder()
            .extra_legal_phrases(&["Regulamin sklepu"])
            .unwrap()
            .build();
        let legal = filters.get(LEGAL).unwrap();

        assert!(legal.is_match("regulamin sklepu"));
        assert!(legal.is_match("Cookies"));
    }

    #[test]
    fn test_empty_phrase_list_matches_nothing() {
        let pattern = NoisePattern::phrases::<&str>("none", &[]).unwrap();

        assert!(!pattern.is_match("anything at all"));
        assert_eq!(pattern.strip("anything"), "anything");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = NoisePattern::new("broken", "(unclosed");

        assert!(matches!(
            result,
            Err(NormalizeError::InvalidPattern { ref name, .. }) if name == "broken"
        ));
    }
}
