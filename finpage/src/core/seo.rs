//! Page-level SEO metadata.

use serde::{Deserialize, Serialize};

/// Title tag and meta description for the generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    /// Contents of the `<title>` tag.
    pub title: String,
    /// Contents of the description `<meta>` tag.
    pub description: String,
}

impl SeoMetadata {
    /// Creates metadata from a title and description.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Renders the `<header data-seo>` block that leads the document.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "<header data-seo>\n<title>{}</title>\n<meta name=\"description\" content=\"{}\">\n</header>",
            escape(self.title.trim()),
            escape(self.description.trim())
        )
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
