//! Building blocks for attribute value constraints.
//!
//! Each constraint is a link in an attribute's transform chain: it
//! receives `(element, attribute, value)` and returns the sanitized
//! value, or `None` to drop the attribute. The chain composes by
//! short-circuiting on the first rejection.

use std::sync::Arc;

use regex::Regex;

use crate::policy::AttrTransform;

/// Accepts values the pattern matches in full.
pub(crate) fn matching(pattern: Regex) -> AttrTransform {
    Arc::new(move |_element, _attr, value: String| {
        match pattern.find(&value) {
            Some(found) if found.start() == 0 && found.end() == value.len() => Some(value),
            _ => None,
        }
    })
}

/// Accepts values equal to one of a fixed set.
pub(crate) fn one_of(values: &[impl AsRef<str>], ignore_case: bool) -> AttrTransform {
    let values: Vec<Box<str>> = values
        .iter()
        .map(|v| {
            if ignore_case {
                v.as_ref().to_ascii_lowercase().into()
            } else {
                v.as_ref().into()
            }
        })
        .collect();

    Arc::new(move |_element, _attr, value: String| {
        let probe = if ignore_case {
            value.to_ascii_lowercase()
        } else {
            value.clone()
        };
        values
            .iter()
            .any(|allowed| allowed.as_ref() == probe)
            .then_some(value)
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matching_requires_a_full_match() {
        let link = matching(Regex::new("[0-9]+").unwrap());
        assert_eq!(link.as_ref()("img", "width", "640".into()), Some("640".into()));
        assert_eq!(link.as_ref()("img", "width", "640px".into()), None);
        assert_eq!(link.as_ref()("img", "width", "x640".into()), None);
    }

    #[test]
    fn one_of_sets() {
        let link = one_of(&["ltr", "rtl"], false);
        assert_eq!(link.as_ref()("bdo", "dir", "ltr".into()), Some("ltr".into()));
        assert_eq!(link.as_ref()("bdo", "dir", "LTR".into()), None);

        let relaxed = one_of(&["ltr", "rtl"], true);
        assert_eq!(relaxed.as_ref()("bdo", "dir", "LTR".into()), Some("LTR".into()));
    }
}
