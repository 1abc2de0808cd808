//! The event contract shared by every pipeline stage.

/// One name/value attribute pair. Names are canonical (lower-case) and
/// values are fully entity-decoded by the time a pair enters the
/// pipeline; stages own the list for the duration of one event and may
/// reorder, drop, rename or add pairs before forwarding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receiver for a stream of document events.
///
/// Stages are composed leaf-first: a [`crate::renderer::HtmlRenderer`]
/// is the terminal sink, a policy stage wraps it, the balancer wraps
/// the policy, and the tokenizer's event reader drives the outermost
/// sink. Each stage forwards the same shape of events downstream.
///
/// `open_document`/`close_document` bound one session; `text` carries
/// parsed character data (already entity-decoded), while
/// `unescaped_text` carries the raw contents of CDATA elements such as
/// `script` and must never be emitted without vetting.
pub trait HtmlSink {
    fn open_document(&mut self);
    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>);
    fn close_tag(&mut self, name: &str);
    fn text(&mut self, text: &str);
    fn unescaped_text(&mut self, text: &str);
    fn close_document(&mut self);
}

impl<S: HtmlSink + ?Sized> HtmlSink for &mut S {
    fn open_document(&mut self) {
        (**self).open_document();
    }

    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
        (**self).open_tag(name, attrs);
    }

    fn close_tag(&mut self, name: &str) {
        (**self).close_tag(name);
    }

    fn text(&mut self, text: &str) {
        (**self).text(text);
    }

    fn unescaped_text(&mut self, text: &str) {
        (**self).unescaped_text(text);
    }

    fn close_document(&mut self) {
        (**self).close_document();
    }
}
