//! Instruction protocol for the link classification service

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::classifier::{ClassifierConfig, Relevance};
use crate::links::CandidateLink;

/// System instructions for the classification agent
pub const PREAMBLE: &str = "You label the links of a company website by how likely they are to \
lead to information needed to write a description of that company. The pages you mark are \
scraped automatically and their content is used to write the description, so mark only what \
is worth reading.";

/// Expected answer of the classification service
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RelevantLinks {
    /// A dictionary with URLs as keys and 'YES' or 'NO' as values
    pub links: BTreeMap<String, Relevance>,
}

/// Instructions describing the response format, generated from the schema of `RelevantLinks`
pub fn format_instructions() -> String {
    let schema = schemars::schema_for!(RelevantLinks);
    let schema_json = serde_json::to_string(&schema).unwrap_or_default();
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\
         \n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\
         \n\
         Here is the output schema:\n\
         ```\n\
         {}\n\
         ```",
        schema_json
    )
}

/// Build the classification request for a set of candidate links
pub fn build_prompt(
    urls: &BTreeSet<CandidateLink>,
    config: &ClassifierConfig,
    max_yes: usize,
) -> String {
    let links = urls
        .iter()
        .map(|url| format!("- {}", url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "# Task\n\
         Mark the links below that most likely lead to information needed for a company description.\n\
         # Description criteria\n\
         - The description is concise, so only the most informative links need to be marked.\n\
         - It covers what the company offers (products, services, distribution) and which industry it operates in.\n\
         # Guidance\n\
         Prefer pages such as: {prefer}.\n\
         Avoid pages such as: {avoid}.\n\
         # Links ({count})\n\
         {links}\n\
         # Answer\n\
         - Label every link above; do not skip any and do not add any.\n\
         - Use exactly the labels 'YES' or 'NO' in upper case.\n\
         - Mark at most {max_yes} links as 'YES'. You must NOT mark more than {max_yes}; choose the most relevant.\n\
         - Answer only with the JSON, no additional commentary.\n\
         \n\
         {format}",
        prefer = config.prefer.join(", "),
        avoid = config.avoid.join(", "),
        count = urls.len(),
        links = links,
        max_yes = max_yes,
        format = format_instructions(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_link_and_cap() {
        let urls: BTreeSet<CandidateLink> = ["https://site.com/o-nas", "https://site.com/oferta"]
            .iter()
            .map(|u| CandidateLink::parse(u).unwrap())
            .collect();

        let prompt = build_prompt(&urls, &ClassifierConfig::default(), 3);

        assert!(prompt.contains("- https://site.com/o-nas\n"));
        assert!(prompt.contains("- https://site.com/oferta"));
        assert!(prompt.contains("# Links (2)"));
        assert!(prompt.contains("at most 3 links"));
        assert!(prompt.contains("about us, products, services, contact"));
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let instructions = format_instructions();

        assert!(instructions.contains("\"links\""));
        assert!(instructions.contains("\"YES\""));
        assert!(instructions.contains("\"NO\""));
    }
}
