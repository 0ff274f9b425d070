//! HTML fragment inspection.
//!
//! Fragments come back from the generation capability as plain strings. These
//! helpers answer the structural questions the stage contracts care about:
//! is the markup balanced, where are the ad slots, what is the first heading,
//! and is a FAQ block shaped the way FAQ schema expects.

mod faq;
mod inspect;

pub use faq::{inspect_faq, FaqShape, MAX_FAQ_PAIRS, MIN_FAQ_PAIRS};
pub use inspect::{
    ad_slots, check_well_formed, count_tag, first_heading, headings, Heading,
};

pub(crate) use inspect::tags;
