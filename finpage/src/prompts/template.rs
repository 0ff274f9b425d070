//! Template expansion.

use crate::errors::TemplateError;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex is valid")
});

/// A natural-language instruction with `{{field}}` placeholders.
///
/// Expansion is plain substitution: no conditionals, no recursion, so the
/// same input always yields the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: &'static str,
    version: Cow<'static, str>,
    body: Cow<'static, str>,
}

impl PromptTemplate {
    /// Creates a compiled-in template.
    #[must_use]
    pub const fn new(name: &'static str, version: &'static str, body: &'static str) -> Self {
        Self {
            name,
            version: Cow::Borrowed(version),
            body: Cow::Borrowed(body),
        }
    }

    /// Creates a template whose text was loaded at runtime.
    #[must_use]
    pub fn custom(name: &'static str, version: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name,
            version: Cow::Owned(version.into()),
            body: Cow::Owned(body.into()),
        }
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the template version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the distinct placeholder names in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(&self.body) {
            if let Some(m) = caps.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// Short content hash identifying this exact template text.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.body.as_bytes());
        hex::encode(digest)[..12].to_string()
    }

    /// Expands the template with the given fields.
    ///
    /// String values are inserted verbatim; other JSON values use their JSON
    /// text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if a placeholder has no matching field.
    pub fn render(
        &self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .placeholders()
            .into_iter()
            .find(|name| !fields.contains_key(*name))
        {
            return Err(TemplateError::new(self.name, missing));
        }

        let rendered = PLACEHOLDER_RE.replace_all(&self.body, |caps: &regex::Captures<'_>| {
            match fields.get(&caps[1]) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            }
        });
        Ok(rendered.into_owned())
    }
}
