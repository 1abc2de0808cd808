//! Terminal sink: writes normalized, safely-escaped HTML.
//!
//! Concatenating the output of two independent renderer runs is safe:
//! every text chunk and attribute value is escape-encoded, element and
//! attribute names are validated, and the contents of CDATA-like
//! elements are buffered and suppressed outright when they contain
//! anything that could terminate the host early or open an escaping
//! text span that never closes.

use std::fmt::{self, Write};

use log::debug;

use crate::element_table;
use crate::encode::{encode_attr_onto, encode_text_onto};
use crate::sink::{Attribute, HtmlSink};
use crate::str_fns::strpos;

/// Impossible states detected by the renderer. These indicate misuse
/// by the embedder (the upstream pipeline never produces them), so
/// they are reported out-of-band rather than silently corrupting
/// output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BadHtml {
    InvalidElementName(String),
    InvalidAttributeName(String),
    DocumentAlreadyOpen,
    DocumentNotOpen,
    /// An open, close or raw-text event arrived while a CDATA
    /// element's contents were pending.
    UnexpectedInsideCdata,
    /// Raw text arrived with no CDATA host open.
    OrphanedRawText,
}

impl fmt::Display for BadHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadHtml::InvalidElementName(name) => write!(f, "invalid element name `{name}`"),
            BadHtml::InvalidAttributeName(name) => write!(f, "invalid attribute name `{name}`"),
            BadHtml::DocumentAlreadyOpen => f.write_str("open-document while a document is open"),
            BadHtml::DocumentNotOpen => f.write_str("event received before open-document"),
            BadHtml::UnexpectedInsideCdata => {
                f.write_str("tag event inside the contents of a CDATA element")
            }
            BadHtml::OrphanedRawText => f.write_str("raw text outside any CDATA element"),
        }
    }
}

impl std::error::Error for BadHtml {}

struct PendingCdata {
    name: Box<str>,
    buf: String,
    plaintext: bool,
}

pub struct HtmlRenderer<'h, W: Write> {
    out: W,
    document_open: bool,
    /// Set once a write fails; all further events produce no output.
    dead: bool,
    pending: Option<PendingCdata>,
    bad_html: Option<Box<dyn FnMut(BadHtml) + 'h>>,
    io_error: Option<Box<dyn FnMut(fmt::Error) + 'h>>,
}

impl<'h, W: Write> HtmlRenderer<'h, W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            document_open: false,
            dead: false,
            pending: None,
            bad_html: None,
            io_error: None,
        }
    }

    /// Installs an observer for renderer-detected misuse.
    pub fn on_bad_html(mut self, handler: impl FnMut(BadHtml) + 'h) -> Self {
        self.bad_html = Some(Box::new(handler));
        self
    }

    /// Installs an observer for output write failures.
    pub fn on_io_error(mut self, handler: impl FnMut(fmt::Error) + 'h) -> Self {
        self.io_error = Some(Box::new(handler));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn report(&mut self, problem: BadHtml) {
        debug!("renderer: {problem}");
        if let Some(handler) = self.bad_html.as_mut() {
            handler(problem);
        }
    }

    fn put(&mut self, write: impl FnOnce(&mut W) -> fmt::Result) {
        if self.dead {
            return;
        }
        if let Err(error) = write(&mut self.out) {
            self.dead = true;
            if let Some(handler) = self.io_error.as_mut() {
                handler(error);
            }
        }
    }
}

/// Element and attribute names: ASCII letters and digits starting with
/// a letter, `-` internally, at most one `:` namespace separator, at
/// most 128 bytes.
fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 128 {
        return false;
    }

    let mut parts = name.split(':');
    let (first, second) = (parts.next(), parts.next());
    if parts.next().is_some() {
        return false;
    }

    let valid_part = |part: &str| {
        !part.is_empty()
            && part.starts_with(|c: char| c.is_ascii_alphabetic())
            && !part.ends_with('-')
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    first.is_some_and(valid_part) && second.map_or(true, |part| valid_part(part))
}

/// True when the buffered contents of `name` can be emitted verbatim
/// without any risk of terminating the element early: no `<` followed
/// by an optional `/` and the host's name, and no `<!--` opening an
/// escaping text span that never closes.
fn cdata_is_safe(buf: &str, name: &str) -> bool {
    let bytes = buf.as_bytes();
    let name = name.as_bytes();
    let mut at = 0;

    while let Some(found) = memchr::memchr(b'<', &bytes[at..]) {
        let lt = at + found;
        let name_at = lt + 1 + usize::from(bytes.get(lt + 1) == Some(&b'/'));

        if name_at + name.len() <= bytes.len()
            && bytes[name_at..name_at + name.len()].eq_ignore_ascii_case(name)
        {
            return false;
        }

        if bytes[lt..].starts_with(b"<!--") && strpos(bytes, b"-->", lt + 4).is_none() {
            return false;
        }

        at = lt + 1;
    }

    true
}

impl<'h, W: Write> HtmlRenderer<'h, W> {
    /// Vets and flushes (or suppresses) the pending CDATA contents,
    /// then emits the host's close tag where HTML defines one.
    fn finish_cdata(&mut self, pending: PendingCdata) {
        if cdata_is_safe(&pending.buf, &pending.name) {
            self.put(|out| out.write_str(&pending.buf));
        } else {
            debug!(
                "suppressing contents of <{}>: they cannot be closed safely",
                pending.name
            );
        }

        // PLAINTEXT has no close tag at all.
        if !pending.plaintext {
            self.put(|out| write!(out, "</{}>", pending.name));
        }
    }
}

impl<'h, W: Write> HtmlSink for HtmlRenderer<'h, W> {
    fn open_document(&mut self) {
        if self.document_open {
            self.report(BadHtml::DocumentAlreadyOpen);
            return;
        }
        self.document_open = true;
    }

    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
        if !self.document_open {
            self.report(BadHtml::DocumentNotOpen);
            return;
        }
        if self.pending.is_some() {
            self.report(BadHtml::UnexpectedInsideCdata);
            return;
        }
        if !is_valid_name(name) {
            self.report(BadHtml::InvalidElementName(name.to_string()));
            return;
        }

        self.put(|out| {
            out.write_char('<')?;
            out.write_str(name)
        });

        for attr in &attrs {
            if !is_valid_name(&attr.name) {
                self.report(BadHtml::InvalidAttributeName(attr.name.clone()));
                continue;
            }
            self.put(|out| {
                out.write_char(' ')?;
                out.write_str(&attr.name)?;
                out.write_str("=\"")?;
                encode_attr_onto(&attr.value, out)?;
                out.write_char('"')
            });
        }

        self.put(|out| out.write_char('>'));

        let meta = element_table::meta_for(name);
        if meta.buffers_contents() {
            self.pending = Some(PendingCdata {
                name: name.into(),
                buf: String::new(),
                plaintext: meta.is_plaintext(),
            });
        }
    }

    fn close_tag(&mut self, name: &str) {
        if !self.document_open {
            self.report(BadHtml::DocumentNotOpen);
            return;
        }

        if let Some(pending) = self.pending.take() {
            if pending.name.as_ref() == name {
                self.finish_cdata(pending);
            } else {
                // The upstream stages never mis-pair a CDATA host; an
                // embedder driving the renderer directly did.
                self.report(BadHtml::UnexpectedInsideCdata);
            }
            return;
        }

        if !is_valid_name(name) {
            self.report(BadHtml::InvalidElementName(name.to_string()));
            return;
        }

        // Void elements have no close tag to emit.
        if element_table::meta_for(name).is_void() {
            return;
        }

        self.put(|out| write!(out, "</{name}>"));
    }

    fn text(&mut self, text: &str) {
        if !self.document_open {
            self.report(BadHtml::DocumentNotOpen);
            return;
        }
        if let Some(pending) = self.pending.as_mut() {
            // Escaped text is inert inside the buffer as well; only
            // raw chunks can make the contents unsafe.
            let _ = encode_text_onto(text, &mut pending.buf);
            return;
        }
        self.put(|out| encode_text_onto(text, out));
    }

    fn unescaped_text(&mut self, text: &str) {
        if !self.document_open {
            self.report(BadHtml::DocumentNotOpen);
            return;
        }
        match self.pending.as_mut() {
            Some(pending) => pending.buf.push_str(text),
            None => self.report(BadHtml::OrphanedRawText),
        }
    }

    fn close_document(&mut self) {
        if !self.document_open {
            self.report(BadHtml::DocumentNotOpen);
            return;
        }
        if let Some(pending) = self.pending.take() {
            self.finish_cdata(pending);
        }
        self.document_open = false;
    }
}
