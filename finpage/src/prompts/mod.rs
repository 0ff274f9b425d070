//! Prompt templates.
//!
//! Every stage has one canonical template. The text lives in
//! `finpage/prompts/<name>.<version>.txt` and is compiled in; configuration
//! may swap in a newer version per stage without touching stage code.

mod library;
mod template;

pub use library::{
    FAQ_SECTION, LANDING_PAGE, OFFICIAL_SOURCES, RELEVANT_CTAS, STRUCTURED_CONTENT,
};
pub use template::PromptTemplate;
