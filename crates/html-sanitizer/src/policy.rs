//! The policy engine: a compiled allow-list applied as a pipeline
//! stage between the balancer and the renderer.
//!
//! A [`Policy`] is a plain value assembled by [`PolicyBuilder`]:
//! element names map to chains of element transforms, attribute names
//! map to chains of value transforms (global chain first, then the
//! per-element chain), plus the URL protocol whitelist and a handful
//! of global flags. Applying a policy wraps a downstream sink in a
//! [`PolicySink`]; the policy itself stays immutable and shareable
//! across threads.

pub(crate) mod attr;
mod builder;
pub(crate) mod url;

use std::sync::Arc;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::css::{self, CssSchema};
use crate::element_table;
use crate::sink::{Attribute, HtmlSink};

pub use builder::{AttributeBuilder, PolicyBuilder};

/// A link in an element's transform chain: receives the current name
/// and the attribute list, returns the (possibly renamed) element and
/// (possibly rewritten) attributes, or `None` to reject the element.
pub type ElementTransform =
    Arc<dyn Fn(&str, Vec<Attribute>) -> Option<(String, Vec<Attribute>)> + Send + Sync>;

/// A link in an attribute's transform chain: receives
/// `(element, attribute, value)` and returns the sanitized value, or
/// `None` to drop the attribute.
pub type AttrTransform = Arc<dyn Fn(&str, &str, String) -> Option<String> + Send + Sync>;

/// Hook run over text chunks before and after filtering.
pub type TextProcessor = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Observer for policy rejections, the feed for intrusion-detection
/// pipelines. Invocations happen serially within one sanitize call.
pub trait HtmlChangeListener {
    fn discarded_tag(&self, element: &str);
    fn discarded_attributes(&self, element: &str, attributes: &[&str]);
}

pub(crate) struct ElementRule {
    pub transforms: Vec<ElementTransform>,
    pub attrs: FxHashMap<Box<str>, Vec<AttrTransform>>,
}

/// A compiled sanitization policy. Build one with [`Policy::builder`],
/// then apply it to any number of documents, concurrently if desired.
pub struct Policy {
    pub(crate) elements: FxHashMap<Box<str>, ElementRule>,
    pub(crate) global_attrs: FxHashMap<Box<str>, Vec<AttrTransform>>,
    pub(crate) protocols: FxHashSet<Box<str>>,
    pub(crate) allow_relative_urls: bool,
    pub(crate) require_rel_nofollow: bool,
    /// Elements whose open/close pair drops when no attribute
    /// survives filtering (their children stay).
    pub(crate) skip_if_no_attributes: FxHashSet<Box<str>>,
    pub(crate) allow_text_in: FxHashSet<Box<str>>,
    pub(crate) styling: Option<CssSchema>,
    pub(crate) urls_in_styles: bool,
    pub(crate) nesting_limit: usize,
    pub(crate) pre_processor: Option<TextProcessor>,
    pub(crate) post_processor: Option<TextProcessor>,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    pub fn nesting_limit(&self) -> usize {
        self.nesting_limit
    }

    /// Wraps a downstream sink with this policy's filtering.
    pub fn apply<S: HtmlSink>(&self, sink: S) -> PolicySink<'_, S> {
        PolicySink {
            policy: self,
            sink,
            listener: None,
            stack: Vec::new(),
        }
    }

    pub fn apply_with_listener<'p, S: HtmlSink>(
        &'p self,
        sink: S,
        listener: Option<&'p dyn HtmlChangeListener>,
    ) -> PolicySink<'p, S> {
        PolicySink {
            policy: self,
            sink,
            listener,
            stack: Vec::new(),
        }
    }

    fn url_allowed(&self, value: &str) -> bool {
        url::url_allowed(self, value)
    }
}

/// The legacy raw-text elements render as `pre`: their contents come
/// through escaped instead of raw, which is the only safe way to keep
/// them.
fn substitute_element(name: &str) -> &str {
    match name {
        "xmp" | "listing" | "plaintext" => "pre",
        _ => name,
    }
}

/// What to do with raw (CDATA) contents of a forwarded host.
enum RawText {
    Forward,
    /// Host was renamed to a PCDATA element; raw chunks become
    /// ordinary text and get escaped downstream.
    Escape,
    /// Host is `style` with styling enabled.
    FilterCss,
}

struct PolicyFrame {
    /// The emitted name, or `None` when the open was dropped and the
    /// frame is transparent.
    out_name: Option<Box<str>>,
    /// Whether direct text children survive.
    text_allowed: bool,
    raw_text: RawText,
}

/// The policy engine as a pipeline stage. Tracks one frame per
/// open/close pair so that closes of dropped opens drop too.
pub struct PolicySink<'p, S: HtmlSink> {
    policy: &'p Policy,
    sink: S,
    listener: Option<&'p dyn HtmlChangeListener>,
    stack: Vec<PolicyFrame>,
}

impl<'p, S: HtmlSink> PolicySink<'p, S> {
    pub fn into_inner(self) -> S {
        self.sink
    }

    fn discarded_tag(&mut self, name: &str) {
        debug!("policy discarded <{name}>");
        if let Some(listener) = self.listener {
            listener.discarded_tag(name);
        }
    }

    fn push_dropped(&mut self, name: &str) {
        let meta = element_table::meta_for(name);
        if meta.is_void() {
            return;
        }
        self.stack.push(PolicyFrame {
            out_name: None,
            text_allowed: meta.allows_text() || self.policy.allow_text_in.contains(name),
            raw_text: RawText::Forward,
        });
    }

    /// Runs the global and per-element chains over one attribute,
    /// then the URL whitelist where the attribute is URL-typed and
    /// the styling schema for `style`.
    fn filter_attribute(
        &self,
        rule: &ElementRule,
        element: &str,
        attribute: Attribute,
    ) -> Option<Attribute> {
        let Attribute { name, value } = attribute;
        let global_chain = self.policy.global_attrs.get(name.as_str());
        let scoped_chain = rule.attrs.get(name.as_str());

        let is_style = name == "style" && self.policy.styling.is_some();
        if global_chain.is_none() && scoped_chain.is_none() && !is_style {
            return None;
        }

        let mut value = value;
        for link in global_chain
            .into_iter()
            .flatten()
            .chain(scoped_chain.into_iter().flatten())
        {
            value = link.as_ref()(element, &name, value)?;
        }

        if is_style {
            let schema = self.policy.styling.as_ref().expect("checked above");
            let url_check = |target: &str| self.policy.url_allowed(target);
            let url_ok: Option<&dyn Fn(&str) -> bool> = if self.policy.urls_in_styles {
                Some(&url_check)
            } else {
                None
            };
            value = css::sanitize_declarations(&value, schema, url_ok)?;
        }

        if url::is_url_attribute(element, &name) && !self.policy.url_allowed(&value) {
            debug!("dropping {element}@{name}: URL scheme not allowed");
            return None;
        }

        Some(Attribute { name, value })
    }
}

/// Ensures `rel` carries each wanted token exactly once.
fn merge_rel_tokens(attrs: &mut Vec<Attribute>, wanted: &[&str]) {
    let position = attrs.iter().position(|a| a.name == "rel");
    let mut rel = match position {
        Some(position) => attrs.remove(position),
        None => Attribute::new("rel", ""),
    };

    for token in wanted {
        if !rel.value.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token)) {
            if !rel.value.is_empty() {
                rel.value.push(' ');
            }
            rel.value.push_str(token);
        }
    }

    attrs.push(rel);
}

impl<'p, S: HtmlSink> HtmlSink for PolicySink<'p, S> {
    fn open_document(&mut self) {
        self.sink.open_document();
    }

    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
        let Some(rule) = self.policy.elements.get(name) else {
            self.discarded_tag(name);
            self.push_dropped(name);
            return;
        };

        // Element transform chain, rejection short-circuits.
        let mut out_name = name.to_string();
        let mut attrs = attrs;
        for transform in &rule.transforms {
            match transform.as_ref()(&out_name, attrs) {
                Some((renamed, rewritten)) => {
                    out_name = renamed;
                    attrs = rewritten;
                }
                None => {
                    self.discarded_tag(name);
                    self.push_dropped(name);
                    return;
                }
            }
        }

        let out_name = substitute_element(&out_name).to_string();

        // Attribute filtering: no chain means no attribute.
        let mut kept = Vec::with_capacity(attrs.len());
        let mut discarded: Vec<String> = Vec::new();
        for attribute in attrs {
            let attr_name = attribute.name.clone();
            match self.filter_attribute(rule, name, attribute) {
                Some(attribute) => kept.push(attribute),
                None => discarded.push(attr_name),
            }
        }
        if !discarded.is_empty() {
            debug!("policy discarded attributes on <{name}>: {discarded:?}");
            if let Some(listener) = self.listener {
                let names: Vec<&str> = discarded.iter().map(String::as_str).collect();
                listener.discarded_attributes(name, &names);
            }
        }

        // Links that open a new browsing context must not leak the
        // opener; nofollow is appended when the policy asks for it.
        if out_name == "a" || out_name == "area" {
            if kept.iter().any(|a| a.name == "target") {
                merge_rel_tokens(&mut kept, &["noopener", "noreferrer"]);
            }
            if self.policy.require_rel_nofollow && kept.iter().any(|a| a.name == "href") {
                merge_rel_tokens(&mut kept, &["nofollow"]);
            }
        }

        // An element stripped of every attribute usually carries no
        // meaning of its own; the skip set drops the tag, not the
        // children.
        if kept.is_empty() && self.policy.skip_if_no_attributes.contains(name) {
            self.discarded_tag(name);
            self.push_dropped(name);
            return;
        }

        let meta = element_table::meta_for(name);
        if !meta.is_void() {
            let renamed_meta = element_table::meta_for(&out_name);
            self.stack.push(PolicyFrame {
                out_name: Some(out_name.as_str().into()),
                text_allowed: meta.allows_text() || self.policy.allow_text_in.contains(name),
                raw_text: if !renamed_meta.buffers_contents() {
                    RawText::Escape
                } else if name == "style" && self.policy.styling.is_some() {
                    RawText::FilterCss
                } else {
                    RawText::Forward
                },
            });
        }

        self.sink.open_tag(&out_name, kept);
    }

    fn close_tag(&mut self, name: &str) {
        if element_table::meta_for(name).is_void() {
            return;
        }
        // The balancer guarantees well-nested events, so the top
        // frame is always this close's open.
        if let Some(frame) = self.stack.pop() {
            if let Some(out_name) = frame.out_name {
                self.sink.close_tag(&out_name);
            }
        }
    }

    fn text(&mut self, text: &str) {
        let preprocessed = self.policy.pre_processor.as_ref().map(|f| f.as_ref()(text));
        let text = preprocessed.as_deref().unwrap_or(text);

        // The nearest forwarded frame owns the text; dropped frames
        // are transparent, their children belong to the context the
        // drop exposed.
        let allowed = self
            .stack
            .iter()
            .rev()
            .find(|frame| frame.out_name.is_some())
            .map_or(true, |frame| frame.text_allowed);
        if !allowed {
            debug!("dropping text inside an element with no text content model");
            return;
        }

        match self.policy.post_processor.as_ref() {
            Some(post) => self.sink.text(&post.as_ref()(text)),
            None => self.sink.text(text),
        }
    }

    fn unescaped_text(&mut self, text: &str) {
        // Raw contents only ever arrive directly inside their host.
        match self.stack.last() {
            Some(frame) if frame.out_name.is_some() => match frame.raw_text {
                RawText::Forward => self.sink.unescaped_text(text),
                RawText::Escape => self.sink.text(text),
                RawText::FilterCss => {
                    let schema = self.policy.styling.as_ref().expect("frame requires styling");
                    let url_check = |target: &str| self.policy.url_allowed(target);
                    let url_ok: Option<&dyn Fn(&str) -> bool> = if self.policy.urls_in_styles {
                        Some(&url_check)
                    } else {
                        None
                    };
                    match css::sanitize_stylesheet(text, schema, url_ok) {
                        Some(filtered) => self.sink.unescaped_text(&filtered),
                        None => debug!("style contents dropped: nothing survived the schema"),
                    }
                }
            },
            _ => debug!("dropping raw text: host element was not permitted"),
        }
    }

    fn close_document(&mut self) {
        self.stack.clear();
        self.sink.close_document();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl HtmlSink for Recorder {
        fn open_document(&mut self) {}
        fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
            let attrs = attrs
                .iter()
                .map(|a| format!(" {}=\"{}\"", a.name, a.value))
                .collect::<String>();
            self.0.push(format!("<{name}{attrs}>"));
        }
        fn close_tag(&mut self, name: &str) {
            self.0.push(format!("</{name}>"));
        }
        fn text(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
        fn unescaped_text(&mut self, text: &str) {
            self.0.push(format!("[raw]{text}"));
        }
        fn close_document(&mut self) {}
    }

    fn run(policy: &Policy, drive: impl FnOnce(&mut dyn HtmlSink)) -> String {
        let mut sink = policy.apply(Recorder::default());
        sink.open_document();
        drive(&mut sink);
        sink.close_document();
        sink.into_inner().0.concat()
    }

    fn links_policy() -> Policy {
        Policy::builder()
            .allow_elements(["a", "b", "p"])
            .allow_attributes(["href", "target"])
            .on_elements(["a"])
            .allow_standard_url_protocols()
            .build()
    }

    #[test]
    fn unknown_elements_drop_but_children_pass() {
        let out = run(&links_policy(), |s| {
            s.open_tag("div", Vec::new());
            s.text("kept");
            s.close_tag("div");
        });
        assert_eq!(out, "kept");
    }

    #[test]
    fn unlisted_attributes_drop() {
        let out = run(&links_policy(), |s| {
            s.open_tag(
                "b",
                vec![
                    Attribute::new("onclick", "evil()"),
                    Attribute::new("style", "x"),
                ],
            );
            s.text("x");
            s.close_tag("b");
        });
        assert_eq!(out, "<b>x</b>");
    }

    #[test]
    fn url_schemes_are_enforced() {
        let policy = links_policy();
        let out = run(&policy, |s| {
            s.open_tag("a", vec![Attribute::new("href", "javascript:alert(1)")]);
            s.text("x");
            s.close_tag("a");
        });
        // href dropped, then the bare <a> falls below the
        // skip-if-no-attributes threshold.
        assert_eq!(out, "x");

        let out = run(&policy, |s| {
            s.open_tag("a", vec![Attribute::new("href", "http://example.com/")]);
            s.text("x");
            s.close_tag("a");
        });
        assert_eq!(out, "<a href=\"http://example.com/\">x</a>");
    }

    #[test]
    fn target_links_get_noopener_noreferrer() {
        let out = run(&links_policy(), |s| {
            s.open_tag(
                "a",
                vec![
                    Attribute::new("href", "http://example.com/"),
                    Attribute::new("target", "_blank"),
                ],
            );
            s.text("x");
            s.close_tag("a");
        });
        assert_eq!(
            out,
            "<a href=\"http://example.com/\" target=\"_blank\" rel=\"noopener noreferrer\">x</a>"
        );
    }

    #[test]
    fn rel_merging_is_idempotent() {
        let mut attrs = vec![Attribute::new("rel", "noreferrer me")];
        merge_rel_tokens(&mut attrs, &["noopener", "noreferrer"]);
        assert_eq!(attrs[0].value, "noreferrer me noopener");
    }

    #[test]
    fn nofollow_on_links_when_required() {
        let policy = Policy::builder()
            .allow_elements(["a"])
            .allow_attributes(["href"])
            .on_elements(["a"])
            .allow_standard_url_protocols()
            .require_rel_nofollow_on_links()
            .build();
        let out = run(&policy, |s| {
            s.open_tag("a", vec![Attribute::new("href", "http://x/")]);
            s.text("x");
            s.close_tag("a");
        });
        assert_eq!(out, "<a href=\"http://x/\" rel=\"nofollow\">x</a>");
    }

    #[test]
    fn allow_without_attributes_overrides_the_skip_set() {
        let policy = Policy::builder()
            .allow_elements(["a"])
            .allow_without_attributes(["a"])
            .build();
        let out = run(&policy, |s| {
            s.open_tag("a", Vec::new());
            s.text("x");
            s.close_tag("a");
        });
        assert_eq!(out, "<a>x</a>");
    }

    #[test]
    fn element_transforms_can_rename_and_reject() {
        let policy = Policy::builder()
            .allow_elements_with(
                |_name: &str, attrs: Vec<Attribute>| {
                    if attrs.is_empty() {
                        Some(("strong".to_string(), attrs))
                    } else {
                        None
                    }
                },
                ["b"],
            )
            .allow_without_attributes(["b"])
            .build();
        let out = run(&policy, |s| {
            s.open_tag("b", Vec::new());
            s.text("x");
            s.close_tag("b");
            s.open_tag("b", vec![Attribute::new("class", "z")]);
            s.text("y");
            s.close_tag("b");
        });
        assert_eq!(out, "<strong>x</strong>y");
    }

    #[test]
    fn legacy_raw_elements_render_as_pre() {
        let policy = Policy::builder().allow_elements(["xmp"]).build();
        let out = run(&policy, |s| {
            s.open_tag("xmp", Vec::new());
            s.unescaped_text("A<B>C</B>");
            s.close_tag("xmp");
        });
        assert_eq!(out, "<pre>A<B>C</B></pre>");
    }

    #[test]
    fn raw_text_drops_with_its_host() {
        let out = run(&links_policy(), |s| {
            s.open_tag("script", vec![Attribute::new("src", "x.js")]);
            s.unescaped_text("evil()");
            s.close_tag("script");
        });
        assert_eq!(out, "");
    }

    #[test]
    fn style_attribute_goes_through_the_schema() {
        let policy = Policy::builder()
            .allow_elements(["p"])
            .allow_without_attributes(["p"])
            .allow_styling()
            .build();
        let out = run(&policy, |s| {
            s.open_tag(
                "p",
                vec![Attribute::new("style", "color: red; position: fixed")],
            );
            s.text("x");
            s.close_tag("p");
        });
        assert_eq!(out, "<p style=\"color:red\">x</p>");
    }

    #[test]
    fn style_attribute_without_styling_is_dropped() {
        let out = run(&links_policy(), |s| {
            s.open_tag("p", vec![Attribute::new("style", "color: red")]);
            s.text("x");
            s.close_tag("p");
        });
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn style_element_contents_are_filtered() {
        let policy = Policy::builder()
            .allow_elements(["style"])
            .allow_without_attributes(["style"])
            .allow_styling()
            .build();
        let out = run(&policy, |s| {
            s.open_tag("style", Vec::new());
            s.unescaped_text("p { color: red } @import url(x);");
            s.close_tag("style");
        });
        assert_eq!(out, "<style>[raw]p{color:red}</style>");
    }

    #[test]
    fn text_inside_structural_elements_drops() {
        let policy = Policy::builder()
            .allow_elements(["table", "tbody", "tr", "td"])
            .build();
        let out = run(&policy, |s| {
            s.open_tag("table", Vec::new());
            s.text("stray");
            s.open_tag("tbody", Vec::new());
            s.open_tag("tr", Vec::new());
            s.open_tag("td", Vec::new());
            s.text("cell");
            s.close_tag("td");
            s.close_tag("tr");
            s.close_tag("tbody");
            s.close_tag("table");
        });
        assert_eq!(out, "<table><tbody><tr><td>cell</td></tr></tbody></table>");
    }

    #[test]
    fn allow_text_in_opts_back_in() {
        let policy = Policy::builder()
            .allow_elements(["ul"])
            .allow_text_in(["ul"])
            .build();
        let out = run(&policy, |s| {
            s.open_tag("ul", Vec::new());
            s.text("free text");
            s.close_tag("ul");
        });
        assert_eq!(out, "<ul>free text</ul>");
    }

    #[test]
    fn text_processors_wrap_text() {
        let policy = Policy::builder()
            .allow_elements(["b"])
            .with_pre_processor(|t: &str| t.replace("wrong", "right"))
            .with_post_processor(|t: &str| t.to_uppercase())
            .build();
        let out = run(&policy, |s| {
            s.open_tag("b", Vec::new());
            s.text("wrong way");
            s.close_tag("b");
        });
        assert_eq!(out, "<b>RIGHT WAY</b>");
    }

    struct Collecting(std::sync::Mutex<Vec<String>>);

    impl HtmlChangeListener for Collecting {
        fn discarded_tag(&self, element: &str) {
            self.0.lock().unwrap().push(format!("tag:{element}"));
        }
        fn discarded_attributes(&self, element: &str, attributes: &[&str]) {
            self.0
                .lock()
                .unwrap()
                .push(format!("attrs:{element}:{}", attributes.join("+")));
        }
    }

    #[test]
    fn change_listener_sees_rejections() {
        let policy = links_policy();
        let listener = Collecting(std::sync::Mutex::new(Vec::new()));
        {
            let mut sink = policy.apply_with_listener(Recorder::default(), Some(&listener));
            sink.open_document();
            sink.open_tag("script", Vec::new());
            sink.close_tag("script");
            sink.open_tag("b", vec![Attribute::new("onclick", "x()")]);
            sink.close_tag("b");
            sink.close_document();
        }
        assert_eq!(
            listener.0.into_inner().unwrap(),
            vec!["tag:script", "attrs:b:onclick"]
        );
    }
}
