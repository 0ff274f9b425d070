//! Catalog of stage contracts.

use super::{SchemaSpec, StageContract};
use crate::core::FragmentKind;
use crate::errors::{codes, ContractErrorInfo, PipelineValidationError};
use crate::prompts::PromptTemplate;
use crate::stages::{
    GenerateFaqSection, GenerateLandingPage, InsertRelevantCtas, IntegrateOfficialSources,
    StructureFinancialContent,
};
use std::collections::HashSet;

/// Type-erased view of one stage contract.
#[derive(Debug, Clone)]
pub struct ContractEntry {
    /// Stage name.
    pub name: &'static str,
    /// The slot the stage fills.
    pub fragment: FragmentKind,
    /// Input schema.
    pub input: SchemaSpec,
    /// Output schema.
    pub output: SchemaSpec,
    /// Canonical template.
    pub template: PromptTemplate,
}

impl ContractEntry {
    /// Captures the associated items of a contract.
    #[must_use]
    pub fn of<C: StageContract>() -> Self {
        Self {
            name: C::NAME,
            fragment: C::FRAGMENT,
            input: C::INPUT,
            output: C::OUTPUT,
            template: C::TEMPLATE,
        }
    }

    /// Checks that a template fits this contract's input schema.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the template is blank or references a
    /// field the input schema does not declare.
    pub fn check_template(&self, template: &PromptTemplate) -> Result<(), PipelineValidationError> {
        check_template(self.name, &self.input, template)
    }
}

/// Checks a template against an input schema.
fn check_template(
    stage: &str,
    input: &SchemaSpec,
    template: &PromptTemplate,
) -> Result<(), PipelineValidationError> {
    if template.body().trim().is_empty() {
        return Err(PipelineValidationError::new(format!(
            "Template for stage '{stage}' is empty"
        ))
        .with_stages(vec![stage.to_string()])
        .with_error_info(ContractErrorInfo::new(codes::EMPTY, "Empty prompt template")));
    }

    if let Some(unknown) = template
        .placeholders()
        .into_iter()
        .find(|name| !input.declares(name))
    {
        return Err(PipelineValidationError::new(format!(
            "Template '{}' {} for stage '{stage}' references '{unknown}', which {} does not declare",
            template.name(),
            template.version(),
            input.name
        ))
        .with_stages(vec![stage.to_string()])
        .with_error_info(
            ContractErrorInfo::new(codes::TEMPLATE, "Unknown template placeholder")
                .with_context_entry("placeholder", unknown)
                .with_fix_hint(format!(
                    "Use only {}",
                    input
                        .fields
                        .iter()
                        .map(|f| format!("{{{{{}}}}}", f.name))
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
        ));
    }

    Ok(())
}

/// Every stage contract known to the crate.
#[derive(Debug, Clone)]
pub struct ContractCatalog {
    entries: Vec<ContractEntry>,
}

impl ContractCatalog {
    /// Creates a catalog from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<ContractEntry>) -> Self {
        Self { entries }
    }

    /// The built-in stage contracts.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            ContractEntry::of::<StructureFinancialContent>(),
            ContractEntry::of::<IntegrateOfficialSources>(),
            ContractEntry::of::<InsertRelevantCtas>(),
            ContractEntry::of::<GenerateFaqSection>(),
            ContractEntry::of::<GenerateLandingPage>(),
        ])
    }

    /// All entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[ContractEntry] {
        &self.entries
    }

    /// Finds a contract by stage name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ContractEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Stage names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Validates every contract definition.
    ///
    /// # Errors
    ///
    /// Returns the first defect found: an empty catalog, a duplicate stage
    /// name, a schema without fields or descriptions, or a template that
    /// does not fit its input schema.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.entries.is_empty() {
            return Err(PipelineValidationError::new("Contract catalog is empty")
                .with_error_info(ContractErrorInfo::new(codes::EMPTY, "No contracts")));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.name) {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' is declared more than once",
                    entry.name
                ))
                .with_stages(vec![entry.name.to_string()])
                .with_error_info(ContractErrorInfo::new(
                    codes::DUPLICATE,
                    "Duplicate stage contract",
                )));
            }

            for schema in [&entry.input, &entry.output] {
                check_schema(entry.name, schema)?;
            }
            check_template(entry.name, &entry.input, &entry.template)?;
        }

        Ok(())
    }
}

fn check_schema(stage: &str, schema: &SchemaSpec) -> Result<(), PipelineValidationError> {
    let defect = if schema.fields.is_empty() {
        Some(format!("Schema '{}' declares no fields", schema.name))
    } else {
        let mut names = HashSet::new();
        schema.fields.iter().find_map(|field| {
            if !names.insert(field.name) {
                Some(format!("Schema '{}' declares '{}' twice", schema.name, field.name))
            } else if field.description.trim().is_empty() {
                Some(format!(
                    "Field '{}' of schema '{}' has no description",
                    field.name, schema.name
                ))
            } else {
                None
            }
        })
    };

    match defect {
        Some(message) => Err(PipelineValidationError::new(message)
            .with_stages(vec![stage.to_string()])
            .with_error_info(ContractErrorInfo::new(codes::EMPTY, "Malformed schema"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{FieldSpec, KEYWORD_INPUT};

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = ContractCatalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(
            catalog.names(),
            vec![
                "structure_financial_content",
                "integrate_official_sources",
                "insert_relevant_ctas",
                "generate_faq_section",
                "generate_landing_page",
            ]
        );
        assert_eq!(
            catalog.lookup("generate_faq_section").map(|e| e.fragment),
            Some(FragmentKind::Faq)
        );
        assert!(catalog.lookup("nope").is_none());
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let entry = ContractEntry::of::<GenerateFaqSection>();
        let catalog = ContractCatalog::new(vec![entry.clone(), entry]);
        let err = catalog.validate().unwrap_err();
        assert_eq!(err.error_info.map(|i| i.code), Some(codes::DUPLICATE.to_string()));
    }

    #[test]
    fn test_template_with_unknown_placeholder_rejected() {
        let mut entry = ContractEntry::of::<GenerateFaqSection>();
        entry.template = PromptTemplate::custom("generate_faq_section", "v2", "Write about {{audience}}");
        let err = ContractCatalog::new(vec![entry]).validate().unwrap_err();
        let info = err.error_info.unwrap();
        assert_eq!(info.code, codes::TEMPLATE);
        assert_eq!(info.context.get("placeholder"), Some(&"audience".to_string()));
        assert!(err.message.contains("v2"));
    }

    #[test]
    fn test_blank_template_rejected() {
        let entry = ContractEntry::of::<GenerateFaqSection>();
        let blank = PromptTemplate::custom("generate_faq_section", "v2", "   ");
        assert!(entry.check_template(&blank).is_err());
    }

    #[test]
    fn test_schema_without_description_rejected() {
        const BARE: SchemaSpec =
            SchemaSpec::new("Bare", "", &[FieldSpec::html("body", "Body", " ")]);
        let mut entry = ContractEntry::of::<GenerateFaqSection>();
        entry.output = BARE;
        let err = ContractCatalog::new(vec![entry]).validate().unwrap_err();
        assert!(err.message.contains("has no description"));
        assert_eq!(KEYWORD_INPUT.fields.len(), 2);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(ContractCatalog::new(Vec::new()).validate().is_err());
    }
}
