//! Tag balancing: turns the raw open/close event stream into a
//! well-nested one.
//!
//! The balancer owns a stack of open frames and consults the element
//! table: an arriving start tag first force-closes whatever it is
//! declared to close, then pops every open frame that cannot contain
//! it, then inserts the implied chain (`<table><td>` opens `tbody` and
//! `tr` on the way). Formatting frames popped on the way out are
//! re-opened afterwards, which resolves the classic
//! `<b><i></b></i>` mis-nesting. A depth cap bounds the stack against
//! hostile nesting; everything still open at close-document is closed
//! innermost-first.

use log::debug;

use crate::element_table::{self, ElementMeta};
use crate::elements::{element_ix, ElementIx};
use crate::sink::{Attribute, HtmlSink};

pub const DEFAULT_NESTING_LIMIT: usize = 256;

struct Frame {
    ix: ElementIx,
    name: Box<str>,
    resumable: bool,
}

pub struct TagBalancer<S: HtmlSink> {
    sink: S,
    stack: Vec<Frame>,
    limit: usize,
}

impl<S: HtmlSink> TagBalancer<S> {
    pub fn new(sink: S) -> Self {
        Self::with_nesting_limit(sink, DEFAULT_NESTING_LIMIT)
    }

    pub fn with_nesting_limit(sink: S, limit: usize) -> Self {
        Self {
            sink,
            stack: Vec::new(),
            limit,
        }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    fn is_open(&self, name: &str) -> bool {
        self.stack.iter().any(|frame| frame.name.as_ref() == name)
    }

    /// Pops the top frame, emits its close, and records it for
    /// re-opening when it is a formatting element.
    fn pop_and_close(&mut self, resumables: &mut Vec<Frame>) {
        let frame = self.stack.pop().expect("caller checked a frame is open");
        self.sink.close_tag(&frame.name);
        if frame.resumable {
            resumables.push(frame);
        }
    }

    /// Emits an open tag and pushes its frame, unless that would put
    /// the stack past the nesting limit.
    fn try_open(&mut self, frame: Frame, attrs: Vec<Attribute>) -> bool {
        if self.stack.len() >= self.limit {
            debug!("nesting limit {} reached; dropping <{}>", self.limit, frame.name);
            return false;
        }
        self.sink.open_tag(&frame.name, attrs);
        self.stack.push(frame);
        true
    }

    fn reopen(&mut self, resumables: Vec<Frame>) {
        // Re-open outermost-first to restore the original order. A
        // frame only resumes where the current parent can contain it;
        // this keeps formatting from leaking into table structure,
        // the way the HTML5 formatting-element markers do.
        for frame in resumables.into_iter().rev() {
            let fits = match self.stack.last() {
                Some(top) => {
                    element_table::meta(top.ix).contents & element_table::meta(frame.ix).types != 0
                }
                None => true,
            };
            if fits {
                self.try_open(frame, Vec::new());
            } else {
                debug!("not resuming <{}> into an incompatible parent", frame.name);
            }
        }
    }

    fn frame_for(name: &str, ix: ElementIx, meta: &ElementMeta) -> Frame {
        Frame {
            ix,
            name: name.into(),
            resumable: meta.is_resumable(),
        }
    }
}

impl<S: HtmlSink> HtmlSink for TagBalancer<S> {
    fn open_document(&mut self) {
        self.sink.open_document();
    }

    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
        if self.stack.len() >= self.limit {
            debug!("nesting limit {} reached; dropping <{name}>", self.limit);
            return;
        }

        let ix = element_ix(name);
        let meta = element_table::meta(ix);
        let mut resumables = Vec::new();

        /*
         * Unrecognized elements forward as-is: they close nothing,
         * imply nothing, and any element may contain them.
         */
        if !ix.is_custom() {
            /*
             * Force-closes first: `<a>` inside an open `a` closes it,
             * however deep the open one sits. The closed frame does
             * not resume; frames popped on the way down do.
             */
            if !meta.closes_on_open.is_empty() {
                let closed = self.stack.iter().rposition(|frame| {
                    meta.closes_on_open.iter().any(|&c| c == frame.name.as_ref())
                });
                if let Some(position) = closed {
                    while self.stack.len() > position + 1 {
                        self.pop_and_close(&mut resumables);
                    }
                    let frame = self.stack.pop().expect("position is within the stack");
                    debug!("<{name}> force-closes open <{}>", frame.name);
                    self.sink.close_tag(&frame.name);
                }
            }

            loop {
                let pop = match self.stack.last() {
                    Some(top) => element_table::meta(top.ix).contents & meta.types == 0,
                    None => false,
                };
                if !pop {
                    break;
                }
                debug!("auto-closing an element that cannot contain <{name}>");
                self.pop_and_close(&mut resumables);
            }

            let implied: &'static [&'static str] = match self.stack.last() {
                Some(top) => element_table::implied_path(&top.name, name),
                None => &[],
            };
            for &implied_name in implied {
                if !self.is_open(implied_name) {
                    let implied_ix = element_ix(implied_name);
                    let implied_meta = element_table::meta(implied_ix);
                    self.try_open(
                        Self::frame_for(implied_name, implied_ix, implied_meta),
                        Vec::new(),
                    );
                }
            }
        }

        if meta.is_void() {
            self.sink.open_tag(name, attrs);
        } else {
            self.try_open(Self::frame_for(name, ix, meta), attrs);
        }

        self.reopen(resumables);
    }

    fn close_tag(&mut self, name: &str) {
        let ix = element_ix(name);

        let matched = self.stack.iter().rposition(|frame| {
            if ix.is_custom() {
                frame.ix.is_custom() && frame.name.as_ref() == name
            } else {
                frame.ix == ix
            }
        });

        // A close with no open of its own may still close elements
        // that declare it: `</ul>` finishes an open `li`. The deepest
        // declaring frame wins so the whole run above it closes too.
        let through = matched.or_else(|| {
            self.stack.iter().position(|frame| {
                element_table::meta(frame.ix)
                    .closed_by
                    .iter()
                    .any(|&closer| closer == name)
            })
        });

        let Some(position) = through else {
            debug!("dropping </{name}> with no matching open tag");
            return;
        };

        let mut resumables = Vec::new();
        while self.stack.len() > position + 1 {
            self.pop_and_close(&mut resumables);
        }
        let frame = self.stack.pop().expect("position is within the stack");
        self.sink.close_tag(&frame.name);
        self.reopen(resumables);
    }

    fn text(&mut self, text: &str) {
        self.sink.text(text);
    }

    fn unescaped_text(&mut self, text: &str) {
        self.sink.unescaped_text(text);
    }

    fn close_document(&mut self) {
        while let Some(frame) = self.stack.pop() {
            self.sink.close_tag(&frame.name);
        }
        self.sink.close_document();
    }
}
