//! The assembled webpage document.

use super::{Fragment, FragmentKind, SeoMetadata};
use crate::errors::{
    codes, ContractErrorInfo, FieldViolation, FinpageError, OutputValidationError,
    PipelineValidationError,
};
use crate::html::check_well_formed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use uuid::Uuid;

/// Token usage reported by the generation capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Creates a usage record.
    #[must_use]
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Returns total tokens.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// Per-stage summary kept alongside the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name.
    pub stage: String,
    /// The fragment the stage contributed.
    pub fragment: FragmentKind,
    /// Model that served the call.
    pub model: String,
    /// Version of the prompt template used.
    pub template_version: String,
    /// Wall-clock duration of the stage in milliseconds.
    pub duration_ms: f64,
    /// Tokens consumed.
    pub usage: TokenUsage,
}

/// The final merged HTML document.
///
/// Only [`WebpageDocument::assemble`] creates one, and it refuses anything but
/// a complete, well-formed set of fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebpageDocument {
    run_id: Uuid,
    html: String,
    fragments: Vec<FragmentKind>,
    stages: Vec<StageReport>,
    usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seo: Option<SeoMetadata>,
    generated_at: DateTime<Utc>,
}

impl WebpageDocument {
    /// Merges fragments into one document in canonical fragment order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty or duplicated fragment set and
    /// `OutputValidationFailed` when a fragment is blank or the merged markup
    /// is not well-formed.
    pub fn assemble(
        run_id: Uuid,
        mut fragments: Vec<Fragment>,
        stages: Vec<StageReport>,
    ) -> Result<Self, FinpageError> {
        if fragments.is_empty() {
            return Err(PipelineValidationError::new("Cannot assemble a document without fragments")
                .with_error_info(ContractErrorInfo::new(codes::EMPTY, "No fragments to assemble"))
                .into());
        }

        fragments.sort_by_key(|f| f.kind);
        if let Some(pair) = fragments.windows(2).find(|w| w[0].kind == w[1].kind) {
            return Err(PipelineValidationError::new(format!(
                "Fragment '{}' was produced more than once",
                pair[0].kind
            ))
            .with_stages(vec![pair[0].stage.clone(), pair[1].stage.clone()])
            .with_error_info(ContractErrorInfo::new(codes::DUPLICATE, "Duplicate fragment"))
            .into());
        }

        let mut sections = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let body = fragment.html.trim();
            if body.is_empty() {
                return Err(OutputValidationError::new(
                    &fragment.stage,
                    "Fragment",
                    vec![FieldViolation::new(fragment.kind.slug(), "fragment is empty")],
                )
                .into());
            }
            sections.push(format!(
                "<section data-fragment=\"{}\">\n{body}\n</section>",
                fragment.kind.slug()
            ));
        }
        let html = sections.join("\n\n");

        if let Err(problem) = check_well_formed(&html) {
            return Err(OutputValidationError::new(
                "assembly",
                "WebpageDocument",
                vec![FieldViolation::new("html", problem)],
            )
            .into());
        }

        let mut usage = TokenUsage::default();
        for report in &stages {
            usage += report.usage;
        }

        Ok(Self {
            run_id,
            html,
            fragments: fragments.iter().map(|f| f.kind).collect(),
            stages,
            usage,
            seo: None,
            generated_at: Utc::now(),
        })
    }

    /// Prepends the SEO header block and records the metadata.
    ///
    /// Replaces any header added earlier.
    #[must_use]
    pub fn with_seo(mut self, seo: SeoMetadata) -> Self {
        if self.seo.is_some() {
            if let Some(end) = self.html.find("</header>\n\n") {
                self.html.drain(..end + "</header>\n\n".len());
            }
        }
        self.html = format!("{}\n\n{}", seo.to_html(), self.html);
        self.seo = Some(seo);
        self
    }

    /// The run that produced this document.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The merged markup.
    #[must_use]
    pub fn as_html(&self) -> &str {
        &self.html
    }

    /// Consumes the document, returning the markup.
    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }

    /// Fragment kinds in document order.
    #[must_use]
    pub fn fragments(&self) -> &[FragmentKind] {
        &self.fragments
    }

    /// Per-stage reports.
    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Total token usage across stages.
    #[must_use]
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Title tag and meta description, when a stage produced them.
    #[must_use]
    pub fn seo(&self) -> Option<&SeoMetadata> {
        self.seo.as_ref()
    }

    /// When the document was assembled.
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn fragment(kind: FragmentKind, html: &str) -> Fragment {
        Fragment::new(kind, format!("stage-{kind}"), html)
    }

    fn report(kind: FragmentKind, input: u64, output: u64) -> StageReport {
        StageReport {
            stage: format!("stage-{kind}"),
            fragment: kind,
            model: "mock".to_string(),
            template_version: "v1".to_string(),
            duration_ms: 1.0,
            usage: TokenUsage::new(input, output),
        }
    }

    #[test]
    fn test_assemble_orders_fragments() {
        let fragments = vec![
            fragment(FragmentKind::Faq, "<dt>Q</dt><dd>A</dd>"),
            fragment(FragmentKind::CallsToAction, "<p>Apply now</p>"),
            fragment(FragmentKind::MainContent, "<h1>Main</h1>"),
            fragment(FragmentKind::OfficialSources, "<p>RBI</p>"),
        ];
        let doc = WebpageDocument::assemble(Uuid::now_v7(), fragments, vec![]).unwrap();

        assert_eq!(doc.fragments(), &FragmentKind::STAGED);
        let html = doc.as_html();
        let main = html.find("<h1>Main</h1>").unwrap();
        let sources = html.find("<p>RBI</p>").unwrap();
        let cta = html.find("<p>Apply now</p>").unwrap();
        let faq = html.find("<dt>Q</dt>").unwrap();
        assert!(main < sources && sources < cta && cta < faq);
        assert!(html.starts_with("<section data-fragment=\"main-content\">"));
    }

    #[test]
    fn test_with_seo_leads_the_document() {
        let doc = WebpageDocument::assemble(
            Uuid::now_v7(),
            vec![fragment(FragmentKind::MainContent, "<h1>Main</h1>")],
            vec![],
        )
        .unwrap();
        assert!(doc.seo().is_none());

        let doc = doc
            .with_seo(SeoMetadata::new("First title", "First description"))
            .with_seo(SeoMetadata::new("Home Loan Rates", "Compare home loan rates."));
        let html = doc.as_html();
        assert!(html.starts_with("<header data-seo>\n<title>Home Loan Rates</title>"));
        assert!(!html.contains("First title"));
        assert_eq!(html.matches("<header data-seo>").count(), 1);
        assert!(html.contains("</header>\n\n<section data-fragment=\"main-content\">"));
        assert_eq!(doc.seo().map(|s| s.title.as_str()), Some("Home Loan Rates"));
        assert!(check_well_formed(html).is_ok());
    }

    #[test]
    fn test_assemble_sums_usage() {
        let doc = WebpageDocument::assemble(
            Uuid::now_v7(),
            vec![fragment(FragmentKind::MainContent, "<h1>x</h1>")],
            vec![
                report(FragmentKind::MainContent, 10, 20),
                report(FragmentKind::Faq, 1, 2),
            ],
        )
        .unwrap();
        assert_eq!(doc.usage(), TokenUsage::new(11, 22));
        assert_eq!(doc.usage().total(), 33);
    }

    #[test]
    fn test_assemble_rejects_empty_and_duplicates() {
        let err = WebpageDocument::assemble(Uuid::now_v7(), vec![], vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Misconfigured);

        let err = WebpageDocument::assemble(
            Uuid::now_v7(),
            vec![
                fragment(FragmentKind::Faq, "<dt>a</dt><dd>b</dd>"),
                fragment(FragmentKind::Faq, "<dt>c</dt><dd>d</dd>"),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_assemble_rejects_blank_or_malformed() {
        let err = WebpageDocument::assemble(
            Uuid::now_v7(),
            vec![fragment(FragmentKind::MainContent, "   ")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputValidationFailed);

        let err = WebpageDocument::assemble(
            Uuid::now_v7(),
            vec![fragment(FragmentKind::MainContent, "<div><h1>open")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputValidationFailed);
    }
}
