//! Canonical templates, one per stage.

use super::PromptTemplate;

/// Main article with keyword sniping and ad slots; no FAQ, CTA or disclaimer.
pub const STRUCTURED_CONTENT: PromptTemplate = PromptTemplate::new(
    "structure_financial_content",
    "v1",
    include_str!("../../prompts/structure_financial_content.v1.txt"),
);

/// Official-source references, disclaimer and author bio.
pub const OFFICIAL_SOURCES: PromptTemplate = PromptTemplate::new(
    "integrate_official_sources",
    "v1",
    include_str!("../../prompts/integrate_official_sources.v1.txt"),
);

/// Call-to-action block.
pub const RELEVANT_CTAS: PromptTemplate = PromptTemplate::new(
    "insert_relevant_ctas",
    "v1",
    include_str!("../../prompts/insert_relevant_ctas.v1.txt"),
);

/// FAQ pairs in `<dt>`/`<dd>` markup.
pub const FAQ_SECTION: PromptTemplate = PromptTemplate::new(
    "generate_faq_section",
    "v1",
    include_str!("../../prompts/generate_faq_section.v1.txt"),
);

/// Whole page in a single call.
pub const LANDING_PAGE: PromptTemplate = PromptTemplate::new(
    "generate_landing_page",
    "v1",
    include_str!("../../prompts/generate_landing_page.v1.txt"),
);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PromptTemplate; 5] = [
        STRUCTURED_CONTENT,
        OFFICIAL_SOURCES,
        RELEVANT_CTAS,
        FAQ_SECTION,
        LANDING_PAGE,
    ];

    #[test]
    fn test_templates_use_only_keyword_fields() {
        for template in ALL {
            let placeholders = template.placeholders();
            assert_eq!(
                placeholders,
                vec!["primaryKeyword", "secondaryKeywords"],
                "template {}",
                template.name()
            );
        }
    }

    #[test]
    fn test_structure_excludes_later_fragments() {
        let template = STRUCTURED_CONTENT;
        let body = template.body();
        assert!(body.contains("<!-- AD_SLOT_1 -->"));
        assert!(body.contains("Do NOT include FAQ sections, calls to action or disclaimers"));
    }

    #[test]
    fn test_faq_requires_definition_tags() {
        let template = FAQ_SECTION;
        let body = template.body();
        assert!(body.contains("<dt>"));
        assert!(body.contains("<dd>"));
        assert!(body.contains("Do NOT include a <dl> tag"));
        assert!(body.contains("3-5"));
    }

    #[test]
    fn test_fingerprints_are_distinct() {
        let mut prints: Vec<String> = ALL.iter().map(PromptTemplate::fingerprint).collect();
        prints.sort();
        prints.dedup();
        assert_eq!(prints.len(), ALL.len());
    }
}
