//! Core domain model types for finpage.
//!
//! This module contains the values that flow through a generation run:
//! - The keyword input submitted by the caller
//! - Fragment kinds and the fragments stages produce
//! - The assembled webpage document and its SEO metadata
//! - The uniform outcome returned across the facade boundary

mod document;
mod fragment;
mod keywords;
mod outcome;
mod seo;

pub use document::{StageReport, TokenUsage, WebpageDocument};
pub use fragment::{Fragment, FragmentKind};
pub use keywords::KeywordInput;
pub use outcome::{GenerationOutcome, SUCCESS_MESSAGE};
pub use seo::SeoMetadata;
