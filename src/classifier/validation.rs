//! Strict parsing of classification responses

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::classifier::error::ClassificationShapeError;
use crate::classifier::{LinkVerdict, Relevance};
use crate::links::CandidateLink;

/// The response object: exactly one `links` field
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResponse {
    links: LinkEntries,
}

/// Entries of the `links` object in document order, repeated keys included
struct LinkEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for LinkEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = LinkEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping URLs to labels")
            }

            fn visit_map<A>(self, mut map: A) -> Result<LinkEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(LinkEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a free-text classification answer into a verdict
///
/// The answer may be wrapped in a Markdown code fence or surrounded by prose;
/// the outermost JSON object is taken. Everything inside it is checked
/// strictly: a single `links` object, URL keys matching the asked set, and
/// only the literal labels `"YES"` and `"NO"`. A link labelled twice is
/// rejected even when both keys are spelled the same.
pub fn parse_verdict(
    response: &str,
    expected: &BTreeSet<CandidateLink>,
    max_yes: usize,
) -> Result<LinkVerdict, ClassificationShapeError> {
    let json = outermost_object(response).ok_or_else(|| {
        ClassificationShapeError::Malformed("no JSON object found in response".to_string())
    })?;

    let RawResponse {
        links: LinkEntries(links),
    } = serde_json::from_str(json)
        .map_err(|e| ClassificationShapeError::Malformed(e.to_string()))?;

    let mut labels = BTreeMap::new();
    let mut unexpected = Vec::new();
    for (key, label) in links {
        let relevance = match &label {
            Value::String(s) if s == "YES" => Relevance::Yes,
            Value::String(s) if s == "NO" => Relevance::No,
            other => {
                return Err(ClassificationShapeError::InvalidLabel {
                    url: key,
                    label: other.to_string(),
                });
            }
        };

        // Keys are compared in URL-normalized form, so "https://site.com"
        // and "https://site.com/" are the same link.
        let Ok(link) = CandidateLink::parse(key.trim()) else {
            unexpected.push(key);
            continue;
        };
        if labels.insert(link, relevance).is_some() {
            return Err(ClassificationShapeError::DuplicateLink(key));
        }
    }

    if !unexpected.is_empty() {
        return Err(ClassificationShapeError::UnexpectedLinks(unexpected));
    }

    let verdict = LinkVerdict::try_new(expected, labels, max_yes)?;
    debug!(
        links = verdict.len(),
        yes = verdict.yes_count(),
        "Validated classification response"
    );
    Ok(verdict)
}

/// Slice from the first `{` to the last `}`
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
