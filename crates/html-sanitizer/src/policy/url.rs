//! URL vetting for URL-typed attributes and CSS `url(...)` values.

use url::{ParseError, Url};

use crate::policy::Policy;

/// The schemes enabled by `allow_standard_url_protocols`.
pub(crate) const STANDARD_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Attributes whose values name a resource to fetch or navigate to.
/// These are checked against the protocol whitelist on every element;
/// a couple of legacy attributes are URL-typed only on one element.
pub(crate) fn is_url_attribute(element: &str, attr: &str) -> bool {
    matches!(
        attr,
        "href"
            | "src"
            | "action"
            | "formaction"
            | "cite"
            | "poster"
            | "background"
            | "longdesc"
            | "usemap"
            | "dynsrc"
            | "lowsrc"
    ) || (element == "object" && matches!(attr, "data" | "codebase"))
        || (element == "applet" && attr == "codebase")
}

/// A value passes when its scheme is whitelisted, or when it has no
/// scheme and the policy admits relative URLs. Anything unparseable is
/// rejected outright.
pub(crate) fn url_allowed(policy: &Policy, value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => policy.protocols.contains(url.scheme()),
        Err(ParseError::RelativeUrlWithoutBase) => policy.allow_relative_urls,
        Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::policy::Policy;

    fn policy() -> Policy {
        Policy::builder()
            .allow_elements(["a"])
            .allow_standard_url_protocols()
            .build()
    }

    #[test]
    fn schemes_are_whitelisted() {
        let p = policy();
        assert!(url_allowed(&p, "http://example.com/"));
        assert!(url_allowed(&p, "HTTPS://example.com/"));
        assert!(url_allowed(&p, "mailto:x@example.com"));
        assert!(!url_allowed(&p, "javascript:alert(1)"));
        assert!(!url_allowed(&p, "vbscript:x"));
        assert!(!url_allowed(&p, "data:text/html,x"));
    }

    #[test]
    fn scheme_obfuscation_does_not_help() {
        let p = policy();
        // Embedded whitespace is stripped by URL parsing, exactly as
        // browsers treat it.
        assert!(!url_allowed(&p, "java\tscript:alert(1)"));
        assert!(!url_allowed(&p, "java\nscript:alert(1)"));
        assert!(!url_allowed(&p, "  javascript:alert(1)"));
    }

    #[test]
    fn relative_urls_follow_the_flag() {
        let p = policy();
        assert!(url_allowed(&p, "/path/only"));
        assert!(url_allowed(&p, "foo.png"));

        let strict = Policy::builder()
            .allow_standard_url_protocols()
            .allow_relative_urls(false)
            .build();
        assert!(!url_allowed(&strict, "/path/only"));
    }

    #[test]
    fn url_typed_attributes() {
        assert!(is_url_attribute("a", "href"));
        assert!(is_url_attribute("img", "src"));
        assert!(is_url_attribute("form", "action"));
        assert!(is_url_attribute("object", "data"));
        assert!(!is_url_attribute("span", "data"));
        assert!(!is_url_attribute("a", "title"));
    }
}
