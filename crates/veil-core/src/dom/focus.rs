#![forbid(unsafe_code)]

//! Focusability rules.
//!
//! An element is *focusable* when it is a button, an element with an `href`,
//! an input, a select, a text area, or carries a `tabindex`. A negative
//! `tabindex` opts any element out, form controls included. This is the set a
//! dialog enumerates for its focus trap.
//!
//! An element is *tabbable* (reachable by default sequential navigation) when
//! its parsed `tabindex` is not negative, falling back to the focusable rule.
//! The two sets coincide, so the default traversal never skips a member of a
//! trapped set.

use std::collections::BTreeMap;

use super::node::Tag;

/// Parse a `tabindex` attribute value.
#[must_use]
pub fn parse_tabindex(attrs: &BTreeMap<String, String>) -> Option<i32> {
    attrs.get("tabindex").and_then(|v| v.trim().parse().ok())
}

#[must_use]
pub fn is_focusable(tag: Tag, attrs: &BTreeMap<String, String>) -> bool {
    if parse_tabindex(attrs).is_some_and(|index| index < 0) {
        return false;
    }
    tag.is_form_control() || attrs.contains_key("href") || attrs.contains_key("tabindex")
}

#[must_use]
pub fn is_tabbable(tag: Tag, attrs: &BTreeMap<String, String>) -> bool {
    match parse_tabindex(attrs) {
        Some(index) => index >= 0,
        None => is_focusable(tag, attrs),
    }
}
