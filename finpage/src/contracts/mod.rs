//! Schema contracts for stage inputs and outputs.
//!
//! This module provides:
//! - Statically declared field and schema specifications
//! - Validation of JSON payloads against a schema
//! - JSON Schema rendering for structured-output requests
//! - The `StageContract` trait binding schemas, template and fragment slot
//! - A catalog of every stage contract, validated at startup

mod catalog;
mod contract;
mod schema;

pub use catalog::{ContractCatalog, ContractEntry};
pub use contract::{StageContract, KEYWORD_INPUT, PRIMARY_KEYWORD_MAX, SECONDARY_KEYWORDS_MAX, KEYWORD_MIN};
pub use schema::{FieldKind, FieldSpec, SchemaSpec};
