//! Polish regulatory identifiers (NIP tax number, REGON registration number)

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// NIP: ten digits grouped 3-3-2-2, separators optional, "NIP:" and "NIP PL" accepted
static NIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bNIP\s*[:.]?\s*(?:PL\s?)?\d{3}[-\s]?\d{3}[-\s]?\d{2}[-\s]?\d{2}\b")
        .expect("valid NIP pattern")
});

/// REGON: nine digits, "REGON:" accepted
static REGON_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bREGON\s*[:.]?\s*\d{9}\b").expect("valid REGON pattern")
});

/// Identifier tokens found in one page, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegulatoryIdentifiers {
    pub nip: Option<String>,
    pub regon: Option<String>,
}

impl RegulatoryIdentifiers {
    /// First NIP and first REGON token in the text
    pub fn extract(text: &str) -> Self {
        Self {
            nip: NIP_PATTERN.find(text).map(|m| m.as_str().to_string()),
            regon: REGON_PATTERN.find(text).map(|m| m.as_str().to_string()),
        }
    }

    /// Remove the held-aside tokens from running text
    ///
    /// They are appended back as lines of their own, so leaving them in place
    /// would let noise filters eat their digits on a second cleaning pass.
    pub fn strip_from(&self, text: &str) -> String {
        self.lines()
            .fold(text.to_string(), |text, token| text.replace(token, " "))
    }

    pub fn is_empty(&self) -> bool {
        self.nip.is_none() && self.regon.is_none()
    }

    /// Trailing lines to append to cleaned page text
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.nip.iter().chain(self.regon.iter()).map(String::as_str)
    }
}

/// Keep only the ASCII digits of a string
pub fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}
