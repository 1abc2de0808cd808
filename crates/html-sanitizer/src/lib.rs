//! An allow-list HTML sanitizer.
//!
//! Untrusted HTML goes in, HTML that is safe to embed in a larger
//! document comes out. The input is lexed without backtracking, tag
//! nesting is repaired against an HTML element containment table, a
//! caller-built [`Policy`] filters elements, attributes, URLs and
//! (optionally) CSS, and the renderer escapes everything on the way
//! out. Malformed input never fails: every construct has a
//! defined fallback, most of them "render as text" or "drop the
//! offending piece".
//!
//! # Example
//!
//! ```
//! use html_sanitizer::Policy;
//!
//! let policy = Policy::builder()
//!     .allow_elements(["a", "b", "i", "p"])
//!     .allow_attributes(["href"]).on_elements(["a"])
//!     .allow_standard_url_protocols()
//!     .build();
//!
//! let clean = html_sanitizer::sanitize(
//!     &policy,
//!     "<b onclick=\"evil()\">bold</b><script>attack()</script>",
//! );
//! assert_eq!(clean, "<b>bold</b>");
//! ```
//!
//! The [`Policy`] is immutable once built and may be shared freely
//! across threads; each `sanitize` call builds its own pipeline
//! around its own output buffer. Embedders with custom needs can
//! assemble the stages themselves: an [`EventReader`] drives any
//! [`HtmlSink`], and [`TagBalancer`], [`PolicySink`] and
//! [`HtmlRenderer`] each wrap a downstream sink.

#[macro_use]
mod macros;

mod balancer;
mod css;
mod element_table;
mod elements;
mod encode;
mod policy;
mod renderer;
mod sink;
mod str_fns;
mod tokenizer;

pub use balancer::{TagBalancer, DEFAULT_NESTING_LIMIT};
pub use css::CssSchema;
pub use elements::{element_ix, ElementIx};
pub use policy::{
    AttrTransform, AttributeBuilder, ElementTransform, HtmlChangeListener, Policy, PolicyBuilder,
    PolicySink, TextProcessor,
};
pub use renderer::{BadHtml, HtmlRenderer};
pub use sink::{Attribute, HtmlSink};
pub use tokenizer::{EventReader, Token, TokenKind, Tokenizer};

/// Sanitizes one HTML fragment under a policy.
pub fn sanitize(policy: &Policy, html: &str) -> String {
    sanitize_with(policy, html, None)
}

/// Like [`sanitize`], with an observer for everything the policy
/// rejects.
pub fn sanitize_with(
    policy: &Policy,
    html: &str,
    listener: Option<&dyn HtmlChangeListener>,
) -> String {
    let mut out = String::with_capacity(html.len());
    {
        let renderer = HtmlRenderer::new(&mut out);
        let policy_sink = policy.apply_with_listener(renderer, listener);
        let mut balancer = TagBalancer::with_nesting_limit(policy_sink, policy.nesting_limit());
        EventReader::new(html).run(&mut balancer);
    }
    out
}
