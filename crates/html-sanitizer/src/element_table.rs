//! Static metadata for the recognized HTML elements.
//!
//! One record per element: the content categories it belongs to, the
//! categories it can contain, its text content model, which start tags
//! force it closed, and which end tags close it implicitly. The
//! balancer and renderer consult this table at runtime; it is the
//! generated-source form of the element containment data and has no
//! deserialization path.

use crate::elements::category::*;
use crate::elements::ElementIx;

pub(crate) mod flags {
    /// No content and no close tag (`br`, `img`, ...).
    pub const VOID: u8 = 1 << 0;
    /// Formatting element re-opened after a mis-nested close.
    pub const RESUMABLE: u8 = 1 << 1;
}

/// Text content model bits.
pub(crate) mod text_mode {
    pub const COMMENTS: u8 = 1 << 0;
    pub const ENTITIES: u8 = 1 << 1;
    pub const RAW: u8 = 1 << 2;
    pub const TEXT: u8 = 1 << 3;
    pub const PLAIN_TEXT: u8 = 1 << 4;
    pub const UNENDED: u8 = 1 << 5;

    /// Ordinary parsed character data.
    pub const PCDATA: u8 = COMMENTS | ENTITIES | TEXT;
    /// Elements whose direct text children are dropped (`table`, `ul`, ...).
    pub const STRUCTURAL: u8 = COMMENTS;
    /// Raw text, character references NOT decoded (`script`, `style`).
    pub const CDATA: u8 = RAW | TEXT;
    /// Raw text with character references decoded (`title`, `textarea`).
    pub const RCDATA: u8 = RAW | ENTITIES | TEXT;
    /// Legacy unclosable everything-to-end-of-input.
    pub const PLAINTEXT: u8 = PLAIN_TEXT | TEXT | UNENDED;
}

pub(crate) struct ElementMeta {
    pub name: &'static str,
    /// Categories this element belongs to.
    pub types: u32,
    /// Categories this element can contain.
    pub contents: u32,
    pub flags: u8,
    pub text_mode: u8,
    /// End tags which close this element even without a matching open
    /// (`</ul>` closes an open `li`).
    pub closed_by: &'static [&'static str],
    /// Open elements force-closed when this start tag appears (`<a>`
    /// closes an open `a`).
    pub closes_on_open: &'static [&'static str],
}

impl ElementMeta {
    const fn new(name: &'static str, types: u32, contents: u32) -> Self {
        Self {
            name,
            types,
            contents,
            flags: 0,
            text_mode: text_mode::PCDATA,
            closed_by: &[],
            closes_on_open: &[],
        }
    }

    const fn void(mut self) -> Self {
        self.flags |= flags::VOID;
        self
    }

    const fn resumable(mut self) -> Self {
        self.flags |= flags::RESUMABLE;
        self
    }

    const fn mode(mut self, text_mode: u8) -> Self {
        self.text_mode = text_mode;
        self
    }

    const fn closed_by(mut self, closers: &'static [&'static str]) -> Self {
        self.closed_by = closers;
        self
    }

    const fn closes_on_open(mut self, closed: &'static [&'static str]) -> Self {
        self.closes_on_open = closed;
        self
    }

    pub fn is_void(&self) -> bool {
        self.flags & flags::VOID != 0
    }

    pub fn is_resumable(&self) -> bool {
        self.flags & flags::RESUMABLE != 0
    }

    /// Raw text whose character references stay undecoded.
    pub fn is_raw_text(&self) -> bool {
        self.text_mode & text_mode::RAW != 0 && self.text_mode & text_mode::ENTITIES == 0
    }

    /// Raw text with character references decoded.
    pub fn is_rcdata(&self) -> bool {
        self.text_mode & text_mode::RAW != 0 && self.text_mode & text_mode::ENTITIES != 0
    }

    pub fn is_plaintext(&self) -> bool {
        self.text_mode & text_mode::PLAIN_TEXT != 0
    }

    /// Whether direct text children are kept at all.
    pub fn allows_text(&self) -> bool {
        self.text_mode & text_mode::TEXT != 0
    }

    /// Whether the renderer must buffer this element's contents and
    /// vet them before emitting (every non-PCDATA text mode).
    pub fn buffers_contents(&self) -> bool {
        self.text_mode & (text_mode::RAW | text_mode::PLAIN_TEXT) != 0
    }
}

const TABLE_INNER: u32 =
    CAPTION | COLUMN | COLUMN_GROUP | TABLE_SECTION | TABLE_ROW | TABLE_CELL;
const CELL_CLOSERS: &[&str] = &["tr", "tbody", "tfoot", "thead", "table"];

/// Sorted by name; `index_of` binary-searches it.
static ELEMENTS: &[ElementMeta] = &[
    ElementMeta::new("a", PHRASING, FLOW).resumable().closes_on_open(&["a"]),
    ElementMeta::new("abbr", PHRASING, INLINE),
    ElementMeta::new("acronym", PHRASING, INLINE),
    ElementMeta::new("address", BLOCK, FLOW),
    ElementMeta::new("area", PHRASING, 0).void(),
    ElementMeta::new("article", BLOCK, FLOW),
    ElementMeta::new("aside", BLOCK, FLOW),
    ElementMeta::new("audio", PHRASING, FLOW | MEDIA_SOURCE),
    ElementMeta::new("b", PHRASING, FLOW).resumable(),
    ElementMeta::new("bdi", PHRASING, INLINE),
    ElementMeta::new("bdo", PHRASING, INLINE),
    ElementMeta::new("big", PHRASING, FLOW).resumable(),
    ElementMeta::new("blockquote", BLOCK, FLOW),
    ElementMeta::new("br", PHRASING, 0).void(),
    ElementMeta::new("button", PHRASING, INLINE),
    ElementMeta::new("canvas", PHRASING, FLOW),
    ElementMeta::new("caption", CAPTION, FLOW).closed_by(&["table"]),
    ElementMeta::new("center", BLOCK, FLOW),
    ElementMeta::new("cite", PHRASING, INLINE),
    ElementMeta::new("code", PHRASING, FLOW).resumable(),
    ElementMeta::new("col", COLUMN, 0).void(),
    ElementMeta::new("colgroup", COLUMN_GROUP, COLUMN)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["table"]),
    ElementMeta::new("data", PHRASING, INLINE),
    ElementMeta::new("datalist", PHRASING, INLINE | OPTION),
    ElementMeta::new("dd", DL_ITEM, FLOW).closed_by(&["dl"]),
    ElementMeta::new("del", PHRASING, FLOW),
    ElementMeta::new("details", BLOCK, FLOW),
    ElementMeta::new("dfn", PHRASING, INLINE),
    ElementMeta::new("dialog", BLOCK, FLOW),
    ElementMeta::new("dir", BLOCK, LIST_ITEM).mode(text_mode::STRUCTURAL),
    ElementMeta::new("div", BLOCK, FLOW),
    ElementMeta::new("dl", BLOCK, DL_ITEM).mode(text_mode::STRUCTURAL),
    ElementMeta::new("dt", DL_ITEM, FLOW).closed_by(&["dl"]),
    ElementMeta::new("em", PHRASING, FLOW).resumable(),
    ElementMeta::new("fieldset", BLOCK, FLOW),
    ElementMeta::new("figcaption", BLOCK, FLOW),
    ElementMeta::new("figure", BLOCK, FLOW),
    ElementMeta::new("font", PHRASING, FLOW).resumable(),
    ElementMeta::new("footer", BLOCK, FLOW),
    ElementMeta::new("form", BLOCK, FLOW),
    ElementMeta::new("h1", BLOCK | HEADING, INLINE),
    ElementMeta::new("h2", BLOCK | HEADING, INLINE),
    ElementMeta::new("h3", BLOCK | HEADING, INLINE),
    ElementMeta::new("h4", BLOCK | HEADING, INLINE),
    ElementMeta::new("h5", BLOCK | HEADING, INLINE),
    ElementMeta::new("h6", BLOCK | HEADING, INLINE),
    ElementMeta::new("header", BLOCK, FLOW),
    ElementMeta::new("hgroup", BLOCK, FLOW),
    ElementMeta::new("hr", BLOCK, 0).void(),
    ElementMeta::new("i", PHRASING, FLOW).resumable(),
    ElementMeta::new("iframe", PHRASING, TEXT).mode(text_mode::CDATA),
    ElementMeta::new("img", PHRASING, 0).void(),
    ElementMeta::new("input", PHRASING, 0).void(),
    ElementMeta::new("ins", PHRASING, FLOW),
    ElementMeta::new("kbd", PHRASING, INLINE),
    ElementMeta::new("label", PHRASING, INLINE),
    ElementMeta::new("legend", PHRASING, INLINE),
    ElementMeta::new("li", LIST_ITEM, FLOW).closed_by(&["ol", "ul", "menu", "dir"]),
    ElementMeta::new("listing", BLOCK, TEXT).mode(text_mode::CDATA),
    ElementMeta::new("main", BLOCK, FLOW),
    ElementMeta::new("map", PHRASING, FLOW),
    ElementMeta::new("mark", PHRASING, INLINE),
    ElementMeta::new("menu", BLOCK, LIST_ITEM).mode(text_mode::STRUCTURAL),
    ElementMeta::new("meter", PHRASING, INLINE),
    ElementMeta::new("nav", BLOCK, FLOW),
    ElementMeta::new("nobr", PHRASING, FLOW).resumable().closes_on_open(&["nobr"]),
    // Deliberately ordinary containers rather than raw text: raw
    // contents would render as live markup in scripting-disabled
    // browsers after a policy let the wrapper through.
    ElementMeta::new("noembed", PHRASING, FLOW),
    ElementMeta::new("noframes", PHRASING, FLOW),
    ElementMeta::new("noscript", PHRASING, FLOW),
    ElementMeta::new("ol", BLOCK, LIST_ITEM).mode(text_mode::STRUCTURAL),
    ElementMeta::new("optgroup", OPTION_GROUP, OPTION)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["select"]),
    ElementMeta::new("option", OPTION, TEXT).closed_by(&["select", "optgroup", "datalist"]),
    ElementMeta::new("output", PHRASING, INLINE),
    ElementMeta::new("p", BLOCK, INLINE),
    ElementMeta::new("picture", PHRASING, PHRASING | MEDIA_SOURCE).mode(text_mode::STRUCTURAL),
    ElementMeta::new("plaintext", BLOCK, TEXT).mode(text_mode::PLAINTEXT),
    ElementMeta::new("pre", BLOCK, INLINE),
    ElementMeta::new("progress", PHRASING, INLINE),
    ElementMeta::new("q", PHRASING, INLINE),
    ElementMeta::new("rp", RUBY_TEXT, INLINE),
    ElementMeta::new("rt", RUBY_TEXT, INLINE),
    ElementMeta::new("ruby", PHRASING, INLINE | RUBY_TEXT),
    ElementMeta::new("s", PHRASING, FLOW).resumable(),
    ElementMeta::new("samp", PHRASING, INLINE),
    ElementMeta::new("script", PHRASING, TEXT).mode(text_mode::CDATA),
    ElementMeta::new("section", BLOCK, FLOW),
    ElementMeta::new("select", PHRASING, OPTION | OPTION_GROUP).mode(text_mode::STRUCTURAL),
    ElementMeta::new("small", PHRASING, FLOW).resumable(),
    ElementMeta::new("source", MEDIA_SOURCE, 0).void(),
    ElementMeta::new("span", PHRASING, FLOW),
    ElementMeta::new("strike", PHRASING, FLOW).resumable(),
    ElementMeta::new("strong", PHRASING, FLOW).resumable(),
    ElementMeta::new("style", PHRASING, TEXT).mode(text_mode::CDATA),
    ElementMeta::new("sub", PHRASING, INLINE),
    ElementMeta::new("summary", BLOCK, INLINE),
    ElementMeta::new("sup", PHRASING, INLINE),
    ElementMeta::new("table", BLOCK, TABLE_INNER).mode(text_mode::STRUCTURAL),
    ElementMeta::new("tbody", TABLE_SECTION, TABLE_ROW | TABLE_CELL)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["table"]),
    ElementMeta::new("td", TABLE_CELL, FLOW).closed_by(CELL_CLOSERS),
    ElementMeta::new("textarea", PHRASING, TEXT).mode(text_mode::RCDATA),
    ElementMeta::new("tfoot", TABLE_SECTION, TABLE_ROW | TABLE_CELL)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["table"]),
    ElementMeta::new("th", TABLE_CELL, FLOW).closed_by(CELL_CLOSERS),
    ElementMeta::new("thead", TABLE_SECTION, TABLE_ROW | TABLE_CELL)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["table"]),
    ElementMeta::new("time", PHRASING, INLINE),
    ElementMeta::new("title", PHRASING, TEXT).mode(text_mode::RCDATA),
    ElementMeta::new("tr", TABLE_ROW, TABLE_CELL)
        .mode(text_mode::STRUCTURAL)
        .closed_by(&["tbody", "tfoot", "thead", "table"]),
    ElementMeta::new("tt", PHRASING, FLOW).resumable(),
    ElementMeta::new("u", PHRASING, FLOW).resumable(),
    ElementMeta::new("ul", BLOCK, LIST_ITEM).mode(text_mode::STRUCTURAL),
    ElementMeta::new("var", PHRASING, INLINE),
    ElementMeta::new("video", PHRASING, FLOW | MEDIA_SOURCE),
    ElementMeta::new("wbr", PHRASING, 0).void(),
    ElementMeta::new("xmp", BLOCK, TEXT).mode(text_mode::CDATA),
];

/// Metadata applied to unrecognized (custom) elements: an ordinary
/// inline container with no special text handling.
static CUSTOM: ElementMeta = ElementMeta::new("", PHRASING, FLOW);

pub(crate) fn index_of(name: &str) -> Option<ElementIx> {
    ELEMENTS
        .binary_search_by(|meta| meta.name.cmp(name))
        .ok()
        .map(|pos| ElementIx(pos as u8))
}

pub(crate) fn meta(ix: ElementIx) -> &'static ElementMeta {
    if ix.is_custom() {
        &CUSTOM
    } else {
        &ELEMENTS[ix.0 as usize]
    }
}

pub(crate) fn lookup(name: &str) -> Option<&'static ElementMeta> {
    index_of(name).map(meta)
}

/// Metadata for a canonical name, falling back to the custom-element
/// defaults for unrecognized names.
pub(crate) fn meta_for(name: &str) -> &'static ElementMeta {
    lookup(name).unwrap_or(&CUSTOM)
}

/// Chain of elements implicitly opened when `child` appears directly
/// inside `parent` (`<table><td>` implies `tbody` then `tr`).
pub(crate) fn implied_path(parent: &str, child: &str) -> &'static [&'static str] {
    match (parent, child) {
        ("table", "td") | ("table", "th") => &["tbody", "tr"],
        ("table", "tr") => &["tbody"],
        ("table", "col") => &["colgroup"],
        ("thead" | "tbody" | "tfoot", "td") | ("thead" | "tbody" | "tfoot", "th") => &["tr"],
        _ => &[],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        for pair in ELEMENTS.windows(2) {
            assert!(pair[0].name < pair[1].name, "{} !< {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn containment_basics() {
        let table = meta_for("table");
        let td = meta_for("td");
        let p = meta_for("p");
        let div = meta_for("div");
        // p cannot hold a div, so an open p pops when a div arrives.
        assert_eq!(p.contents & div.types, 0);
        // The table matrix admits td directly; the implied chain
        // supplies the intermediate structure.
        assert_ne!(table.contents & td.types, 0);
        assert_eq!(implied_path("table", "td"), &["tbody", "tr"]);
        assert_eq!(implied_path("tbody", "th"), &["tr"]);
        assert!(implied_path("div", "td").is_empty());
    }

    #[test]
    fn text_modes() {
        assert!(meta_for("script").is_raw_text());
        assert!(!meta_for("script").is_rcdata());
        assert!(meta_for("title").is_rcdata());
        assert!(meta_for("plaintext").is_plaintext());
        assert!(!meta_for("noscript").is_raw_text());
        assert!(!meta_for("table").allows_text());
        assert!(meta_for("p").allows_text());
    }

    #[test]
    fn flags() {
        assert!(meta_for("br").is_void());
        assert!(meta_for("b").is_resumable());
        assert!(!meta_for("div").is_resumable());
        assert!(!meta_for("x-custom").is_void());
    }
}
