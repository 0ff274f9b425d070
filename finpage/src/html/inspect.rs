//! Tag scanning, heading extraction and ad-slot detection.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("tag regex is valid")
});

static AD_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*AD_SLOT_(\d+)\s*-->").expect("ad slot regex is valid"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A tag occurrence in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
}

/// Scans the tags of a fragment, ignoring comments.
pub(crate) fn tags(html: &str) -> Vec<Tag> {
    let stripped = COMMENT_RE.replace_all(html, "");
    TAG_RE
        .captures_iter(&stripped)
        .map(|caps| Tag {
            name: caps[2].to_ascii_lowercase(),
            closing: !caps[1].is_empty(),
            self_closing: caps[3].trim_end().ends_with('/'),
        })
        .collect()
}

/// Checks that every non-void element is closed in the right order.
///
/// Returns a description of the first problem found.
pub fn check_well_formed(html: &str) -> Result<(), String> {
    let mut stack: Vec<String> = Vec::new();

    for tag in tags(html) {
        if VOID_ELEMENTS.contains(&tag.name.as_str()) || tag.self_closing {
            continue;
        }
        if !tag.closing {
            stack.push(tag.name);
            continue;
        }
        match stack.pop() {
            Some(open) if open == tag.name => {}
            Some(open) => {
                return Err(format!("</{}> closes <{}>", tag.name, open));
            }
            None => return Err(format!("</{}> has no matching opening tag", tag.name)),
        }
    }

    match stack.last() {
        Some(open) => Err(format!("<{open}> is never closed")),
        None => Ok(()),
    }
}

/// Counts opening occurrences of a tag.
#[must_use]
pub fn count_tag(html: &str, name: &str) -> usize {
    tags(html)
        .iter()
        .filter(|t| !t.closing && t.name.eq_ignore_ascii_case(name))
        .count()
}

/// Returns the indices of `<!-- AD_SLOT_n -->` markers in source order.
#[must_use]
pub fn ad_slots(html: &str) -> Vec<u32> {
    AD_SLOT_RE
        .captures_iter(html)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// A heading element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1-6).
    pub level: u8,
    /// Whitespace-normalized text content.
    pub text: String,
}

/// Returns every H1-H6 heading in document order.
#[must_use]
pub fn headings(html: &str) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };
    let fragment = Html::parse_fragment(html);

    fragment
        .select(&selector)
        .filter_map(|el| {
            let level = el.value().name().get(1..)?.parse().ok()?;
            let text = el.text().collect::<String>();
            Some(Heading {
                level,
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            })
        })
        .collect()
}

/// Returns the first structural heading.
#[must_use]
pub fn first_heading(html: &str) -> Option<Heading> {
    headings(html).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_formed_accepts_nested_and_void() {
        let html = "<h1>Title</h1><p>Intro<br>line<img src=\"a.png\"/></p>\
                    <table><tr><td>1</td></tr></table><!-- AD_SLOT_1 -->";
        assert_eq!(check_well_formed(html), Ok(()));
    }

    #[test]
    fn test_well_formed_rejects_unclosed() {
        let err = check_well_formed("<h2>Rates<p>text</p>").unwrap_err();
        assert!(err.contains("<h2> is never closed"));
    }

    #[test]
    fn test_well_formed_rejects_mismatch_and_stray_close() {
        assert!(check_well_formed("<p><strong>x</p></strong>").is_err());
        assert!(check_well_formed("text</div>").is_err());
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(check_well_formed("<p>a</p><!-- <div> -->"), Ok(()));
        assert_eq!(count_tag("<!-- <dt> --><dt>q</dt>", "dt"), 1);
    }

    #[test]
    fn test_ad_slots_in_order() {
        let html = "<p>a</p><!-- AD_SLOT_1 --><p>b</p><!--AD_SLOT_2--><!-- note -->";
        assert_eq!(ad_slots(html), vec![1, 2]);
        assert!(ad_slots("<p>none</p>").is_empty());
    }

    #[test]
    fn test_first_heading() {
        let html = "<p>lead</p><h1>Best Credit Cards for <em>Travel</em></h1><h2>Rewards</h2>";
        let heading = first_heading(html).unwrap();
        assert_eq!(heading.level, 1);
        assert_eq!(heading.text, "Best Credit Cards for Travel");
        assert_eq!(headings(html).len(), 2);
        assert!(first_heading("<p>no headings</p>").is_none());
    }
}
