//! Decoding of HTML character references.
//!
//! Supports the `;`-terminated form and the browser-compatible bare form
//! (reference names running up to the first non-alphanumeric byte), with
//! the attribute-context exception that keeps ampersands literal inside
//! URL query strings. Numeric references are range-checked and remapped
//! the way browsers do, so no caller ever sees a surrogate, a NUL, or a
//! code point past the Unicode maximum.

use std::borrow::Cow;

mod table;

/// Where the text being decoded came from. Attribute values follow the
/// ambiguous-ampersand rule; body text does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtmlContext {
    BodyText,
    Attribute,
}

/// Replacement produced by a single decoded reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedText {
    Str(&'static str),
    Char(char),
}

impl DecodedText {
    fn push_onto(self, out: &mut String) {
        match self {
            DecodedText::Str(s) => out.push_str(s),
            DecodedText::Char(c) => out.push(c),
        }
    }
}

/// Decodes every character reference in `input`, returning the input
/// unchanged (and unallocated) when nothing needed rewriting.
pub fn decode(ctx: HtmlContext, input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let mut decoded: Option<String> = None;
    let mut at = 0;
    let mut was_at = 0;

    while at < bytes.len() {
        let next_reference_at = match memchr::memchr(b'&', &bytes[at..]) {
            Some(pos) => at + pos,
            None => break,
        };

        match decode_reference(ctx, bytes, next_reference_at) {
            Some((text, token_len)) => {
                let out = decoded.get_or_insert_with(|| String::with_capacity(input.len()));
                out.push_str(&input[was_at..next_reference_at]);
                text.push_onto(out);
                at = next_reference_at + token_len;
                was_at = at;
            }
            None => at = next_reference_at + 1,
        }
    }

    match decoded {
        Some(mut out) => {
            out.push_str(&input[was_at..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(input),
    }
}

/// Decodes one reference starting at `offset`, which must point at an
/// `&`. Returns the replacement and the byte length of the consumed
/// span, or `None` when the ampersand stays literal.
pub fn decode_reference(
    ctx: HtmlContext,
    input: &[u8],
    offset: usize,
) -> Option<(DecodedText, usize)> {
    if offset + 2 >= input.len() || input[offset] != b'&' {
        return None;
    }

    if input[offset + 1] == b'#' {
        return decode_numeric_reference(input, offset);
    }

    let name_at = offset + 1;
    let entity = lookup(&input[name_at..])?;
    let mut token_len = 1 + entity.name.len();

    let after = input.get(offset + token_len).copied();
    if after == Some(b';') {
        token_len += 1;
    } else if ctx == HtmlContext::Attribute {
        /*
         * A bare reference inside an attribute value is ambiguous when
         * the next byte continues as if the reference were longer, or
         * is an equals sign. Leaving the ampersand alone keeps URL
         * query strings such as `?copy=1&lang=en` intact.
         */
        if matches!(after, Some(b'=')) || after.is_some_and(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
    }

    Some((DecodedText::Str(entity.text), token_len))
}

fn lookup(name_bytes: &[u8]) -> Option<&'static table::Entity> {
    let first = *name_bytes.first()?;

    if let Some(entity) = scan(table::bucket(first), name_bytes, false) {
        return Some(entity);
    }

    // Sloppy authoring like `&AMP;` or `&Nbsp;` falls back to a
    // case-insensitive pass over both case buckets.
    for bucket_key in [first.to_ascii_lowercase(), first.to_ascii_uppercase()] {
        if let Some(entity) = scan(table::bucket(bucket_key), name_bytes, true) {
            return Some(entity);
        }
    }

    None
}

fn scan(
    bucket: &'static [table::Entity],
    name_bytes: &[u8],
    ignore_case: bool,
) -> Option<&'static table::Entity> {
    // Buckets are ordered longest-first, so the first prefix hit is the
    // longest match.
    bucket.iter().find(|entity| {
        let name = entity.name.as_bytes();
        match name_bytes.get(..name.len()) {
            Some(head) if ignore_case => head.eq_ignore_ascii_case(name),
            Some(head) => head == name,
            None => false,
        }
    })
}

/// Replacements for the C1 control range, which authors almost always
/// intend as Windows-1252.
static CP1252_REPLACEMENTS: [u32; 32] = [
    0x20AC, 0x81, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0x8D, 0x017D, 0x8F, 0x90, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014,
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x9D, 0x017E, 0x0178,
];

const REPLACEMENT: DecodedText = DecodedText::Char('\u{fffd}');

fn decode_numeric_reference(input: &[u8], offset: usize) -> Option<(DecodedText, usize)> {
    let end = input.len();
    let mut at = offset + 2;

    let hex = at < end && b'X' == (input[at] & 0xDF);
    if hex {
        at += 1;
    }

    // Skip leading zeros so `&#x0000041;` still parses within the digit cap.
    let zeros_at = at;
    while at < end && b'0' == input[at] {
        at += 1;
    }
    let zero_count = at - zeros_at;

    let digits_at = at;
    if hex {
        while at < end && input[at].is_ascii_hexdigit() {
            at += 1;
        }
    } else {
        while at < end && input[at].is_ascii_digit() {
            at += 1;
        }
    }
    let digit_count = at - digits_at;

    let has_semicolon = at < end && b';' == input[at];
    let token_len = at + usize::from(has_semicolon) - offset;

    // `&#` or `&#x` without any digits stays plaintext.
    if zero_count == 0 && digit_count == 0 {
        return None;
    }

    // All zeros is a reference to NUL, which never survives decoding.
    if digit_count == 0 {
        return Some((REPLACEMENT, token_len));
    }

    // Too many digits puts the value past the Unicode maximum.
    if digit_count > if hex { 6 } else { 7 } {
        return Some((REPLACEMENT, token_len));
    }

    let mut code_point = 0u32;
    for &digit in &input[digits_at..digits_at + digit_count] {
        if hex {
            code_point = (code_point << 4) + (digit as char).to_digit(16).unwrap();
        } else {
            code_point = code_point * 10 + (digit as char).to_digit(10).unwrap();
        }
    }

    if (0x80..=0x9F).contains(&code_point) {
        code_point = CP1252_REPLACEMENTS[(code_point - 0x80) as usize];
    }

    // Surrogates and anything past U+10FFFF fail here and map to U+FFFD.
    match char::from_u32(code_point) {
        Some(c) => Some((DecodedText::Char(c), token_len)),
        None => Some((REPLACEMENT, token_len)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(input: &str) -> String {
        decode(HtmlContext::BodyText, input).into_owned()
    }

    fn attr(input: &str) -> String {
        decode(HtmlContext::Attribute, input).into_owned()
    }

    #[test]
    fn named_terminated() {
        assert_eq!(body("fish &amp; chips"), "fish & chips");
        assert_eq!(body("&lt;b&gt;"), "<b>");
        assert_eq!(body("&copy; 2024"), "\u{a9} 2024");
    }

    #[test]
    fn named_bare() {
        assert_eq!(body("&amp chips"), "& chips");
        assert_eq!(body("&nbsp"), "\u{a0}");
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(body("&notin;"), "\u{2209}");
        assert_eq!(body("&not;in"), "\u{ac}in");
        assert_eq!(body("&notit"), "\u{ac}it");
    }

    #[test]
    fn attribute_ambiguity() {
        // `&para=` would break the query string if decoded.
        assert_eq!(attr("?title=1&para=2"), "?title=1&para=2");
        assert_eq!(attr("?title=1&lang=en"), "?title=1&lang=en");
        // The terminated form always decodes.
        assert_eq!(attr("?a=1&amp;b=2"), "?a=1&b=2");
        // Body text has no such rule.
        assert_eq!(body("&para=2"), "\u{b6}=2");
    }

    #[test]
    fn case_insensitive_fallback() {
        assert_eq!(body("&AMP;"), "&");
        assert_eq!(body("&COPY;"), "\u{a9}");
        assert_eq!(body("&Nbsp;"), "\u{a0}");
        // Exact-case entries still win over the fallback.
        assert_eq!(body("&Sigma;&sigma;"), "\u{3a3}\u{3c3}");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(body("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(body("&#65 bare"), "A bare");
        assert_eq!(body("&#x0000041;"), "A");
        assert_eq!(body("&#128169;"), "\u{1f4a9}");
    }

    #[test]
    fn numeric_out_of_range() {
        assert_eq!(body("&#1114112;"), "\u{fffd}");
        assert_eq!(body("&#x110000;"), "\u{fffd}");
        assert_eq!(body("&#xD83D;"), "\u{fffd}");
        assert_eq!(body("&#0;"), "\u{fffd}");
        assert_eq!(body("&#xfffffffffffff;"), "\u{fffd}");
    }

    #[test]
    fn cp1252_remapping() {
        assert_eq!(body("&#x80;"), "\u{20ac}");
        assert_eq!(body("&#147;quoted&#148;"), "\u{201c}quoted\u{201d}");
    }

    #[test]
    fn plaintext_ampersands() {
        assert_eq!(body("AT&T"), "AT&T");
        assert_eq!(body("a & b"), "a & b");
        assert_eq!(body("&#;"), "&#;");
        assert_eq!(body("&#x;"), "&#x;");
        assert_eq!(body("&bogusname;"), "&bogusname;");
    }

    #[test]
    fn borrows_when_untouched() {
        assert!(matches!(
            decode(HtmlContext::BodyText, "no references here"),
            Cow::Borrowed(_)
        ));
    }
}
