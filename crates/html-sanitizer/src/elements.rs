//! Element identity: canonical names, dense indexes, content categories.

use crate::element_table;

/// Content categories used for the containment relation. An element
/// belongs to a set of categories (`types`) and can hold a set of
/// categories (`contents`); a parent can contain a child when the two
/// masks intersect.
pub(crate) mod category {
    /// Pseudo-category carried by text nodes.
    pub const TEXT: u32 = 1 << 0;
    pub const PHRASING: u32 = 1 << 1;
    pub const BLOCK: u32 = 1 << 2;
    pub const HEADING: u32 = 1 << 3;
    pub const LIST_ITEM: u32 = 1 << 4;
    pub const DL_ITEM: u32 = 1 << 5;
    pub const CAPTION: u32 = 1 << 6;
    pub const COLUMN: u32 = 1 << 7;
    pub const COLUMN_GROUP: u32 = 1 << 8;
    pub const TABLE_SECTION: u32 = 1 << 9;
    pub const TABLE_ROW: u32 = 1 << 10;
    pub const TABLE_CELL: u32 = 1 << 11;
    pub const OPTION: u32 = 1 << 12;
    pub const OPTION_GROUP: u32 = 1 << 13;
    pub const RUBY_TEXT: u32 = 1 << 14;
    pub const MEDIA_SOURCE: u32 = 1 << 15;

    /// What generic containers hold. Tables, lists and such enter
    /// through [`BLOCK`]; their internal structure stays out.
    pub const FLOW: u32 = TEXT | PHRASING | BLOCK | HEADING;
    /// Phrasing-only containers such as `p` and the headings.
    pub const INLINE: u32 = TEXT | PHRASING;
}

/// Dense index of a recognized element, or [`ElementIx::CUSTOM`] for
/// every unrecognized name. Custom elements share one index for table
/// lookups but round-trip as their canonical lower-case text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementIx(pub(crate) u8);

impl ElementIx {
    pub const CUSTOM: ElementIx = ElementIx(u8::MAX);

    pub fn is_custom(self) -> bool {
        self == Self::CUSTOM
    }
}

/// Looks up the index for a canonical (lower-case) element name.
pub fn element_ix(name: &str) -> ElementIx {
    element_table::index_of(name).unwrap_or(ElementIx::CUSTOM)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_ne!(element_ix("div"), ElementIx::CUSTOM);
        assert_ne!(element_ix("a"), ElementIx::CUSTOM);
        assert_ne!(element_ix("xmp"), ElementIx::CUSTOM);
    }

    #[test]
    fn unknown_names_share_custom() {
        assert_eq!(element_ix("x-widget"), ElementIx::CUSTOM);
        assert_eq!(element_ix("blink"), element_ix("marquee"));
    }

    #[test]
    fn distinct_names_distinct_indexes() {
        assert_ne!(element_ix("td"), element_ix("th"));
        assert_ne!(element_ix("ol"), element_ix("ul"));
    }
}
