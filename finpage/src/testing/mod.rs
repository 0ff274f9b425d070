//! Testing utilities for finpage pipelines.
//!
//! This module provides:
//! - A scripted generation capability with call recording
//! - Valid stage outputs for the "best credit cards for travel" example
//! - Assertions for generation outcomes

mod assertions;
mod capability;
pub mod fixtures;

pub use assertions::{assert_fragment_order, assert_outcome_failed, assert_outcome_succeeded};
pub use capability::{ScriptedCapability, ScriptedReply};
