//! Typed stage results.

use crate::core::{FragmentKind, StageReport, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated output of one stage invocation.
///
/// Created per invocation and consumed by assembly; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult<T> {
    /// Stage name.
    pub stage: String,
    /// The typed, validated output.
    pub value: T,
    /// Model that served the call.
    pub model: String,
    /// Capability implementation.
    pub provider: String,
    /// Tokens consumed.
    pub usage: TokenUsage,
    /// When the capability call was issued.
    pub started_at: DateTime<Utc>,
    /// When validation finished.
    pub ended_at: DateTime<Utc>,
    /// Version label of the template used.
    pub template_version: String,
    /// Content hash of the template used.
    pub template_fingerprint: String,
}

impl<T> StageResult<T> {
    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at)
            .num_microseconds()
            .map_or(0.0, |us| us as f64 / 1000.0)
    }

    /// Transforms the value, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageResult<U> {
        StageResult {
            stage: self.stage,
            value: f(self.value),
            model: self.model,
            provider: self.provider,
            usage: self.usage,
            started_at: self.started_at,
            ended_at: self.ended_at,
            template_version: self.template_version,
            template_fingerprint: self.template_fingerprint,
        }
    }

    /// Summarizes the invocation for the document.
    #[must_use]
    pub fn report(&self, fragment: FragmentKind) -> StageReport {
        StageReport {
            stage: self.stage.clone(),
            fragment,
            model: self.model.clone(),
            template_version: self.template_version.clone(),
            duration_ms: self.duration_ms(),
            usage: self.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn result() -> StageResult<&'static str> {
        let started_at = Utc::now();
        StageResult {
            stage: "generate_faq_section".into(),
            value: "<dt>Q</dt><dd>A</dd>",
            model: "gemini-2.0-flash".into(),
            provider: "mock".into(),
            usage: TokenUsage::new(120, 80),
            started_at,
            ended_at: started_at + Duration::milliseconds(250),
            template_version: "v1".into(),
            template_fingerprint: "abc123def456".into(),
        }
    }

    #[test]
    fn test_duration_ms() {
        assert!((result().duration_ms() - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mapped = result().map(str::len);
        assert_eq!(mapped.value, 20);
        assert_eq!(mapped.template_version, "v1");
        assert_eq!(mapped.usage.total(), 200);
    }

    #[test]
    fn test_report() {
        let report = result().report(FragmentKind::Faq);
        assert_eq!(report.stage, "generate_faq_section");
        assert_eq!(report.fragment, FragmentKind::Faq);
        assert_eq!(report.usage, TokenUsage::new(120, 80));
    }
}
