//! Instructions for the profile synthesis service

use crate::normalizer::NormalizedCorpus;

/// System instructions for the synthesis agent, fixed to one output language
pub fn preamble(language: &str) -> String {
    format!(
        "You are an analyst who writes concise, factual company profiles from the text of the \
         company's own website. You always answer in {language}, whatever language the source \
         text is in. You never add facts that are not in the provided data."
    )
}

/// Build the synthesis request for a normalized corpus
pub fn build_prompt(corpus: &NormalizedCorpus, language: &str) -> String {
    format!(
        "# Task\n\
         Using only the website content below, write a profile of the company in two sections.\n\
         \n\
         ## Section 1: Functional profile\n\
         - Whether the company is a producer, a distributor, a service provider, or a combination.\n\
         - Unique assets: own production plants, technologies, certifications, specialised fleet or equipment.\n\
         - Distribution channels and the types of customers served.\n\
         - Whether it makes products under its own brands, under contract for others, or both.\n\
         - Membership in a capital group, if mentioned.\n\
         \n\
         ## Section 2: Products and services\n\
         - The complete list of products and services the company offers, grouped where it helps.\n\
         \n\
         # Rules\n\
         - Write only in {language}.\n\
         - Base everything on the data below; if something is not there, leave it out.\n\
         - Omit company history, founders, awards, prices and detailed product composition.\n\
         - Start directly with the first section. Do not open with phrases such as \"Here is the answer\".\n\
         \n\
         # Website content\n\
         {corpus}",
        language = language,
        corpus = corpus.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{NoiseFilters, PageDocument, normalize};

    #[test]
    fn test_prompt_embeds_corpus_and_language() {
        let corpus = normalize(
            &[PageDocument::new("https://site.com/oferta", "Produkujemy okna.")],
            &NoiseFilters::default(),
        );

        let prompt = build_prompt(&corpus, "Polish");

        assert!(prompt.contains("Write only in Polish."));
        assert!(prompt.contains("Section 1: Functional profile"));
        assert!(prompt.contains("Section 2: Products and services"));
        assert!(prompt.ends_with("Source: https://site.com/oferta\nContent:\nProdukujemy okna.\n\n"));
    }

    #[test]
    fn test_preamble_names_language() {
        assert!(preamble("German").contains("always answer in German"));
    }
}
