//! The styling sub-policy: a whitelist of CSS properties with
//! per-property value shapes, applied to `style="…"` attribute values
//! and, when a policy lets the element through, to `<style>` bodies.
//!
//! Values are re-emitted normalized: identifiers lower-cased, strings
//! re-quoted with CSS escapes for markup-significant characters, urls
//! canonicalized to `url('…')` and vetted against the URL policy.
//! Anything outside the whitelist drops its whole declaration:
//! unknown properties, at-keywords, unexpected functions (notably
//! `expression(`), bad strings and bad urls.

pub(crate) mod tokenizer;

use log::debug;
use rustc_hash::FxHashMap;

use tokenizer::{CssToken, CssTokenizer};

mod value_class {
    /// Property-specific keyword list.
    pub const KEYWORD: u8 = 1 << 0;
    pub const COLOR: u8 = 1 << 1;
    pub const LENGTH: u8 = 1 << 2;
    pub const PERCENTAGE: u8 = 1 << 3;
    pub const NUMBER: u8 = 1 << 4;
    pub const STRING: u8 = 1 << 5;
    pub const URL: u8 = 1 << 6;
    /// Any identifier (font family names).
    pub const IDENT: u8 = 1 << 7;
}

use value_class::*;

const GLOBAL_KEYWORDS: &[&str] = &["inherit", "initial", "unset"];

const COLOR_NAMES: &[&str] = &[
    "aqua", "black", "blue", "brown", "fuchsia", "gray", "green", "grey", "lime", "maroon",
    "navy", "olive", "orange", "purple", "red", "silver", "teal", "transparent", "white",
    "yellow",
];

const LENGTH_UNITS: &[&str] = &[
    "ch", "cm", "em", "ex", "in", "mm", "pc", "pt", "px", "q", "rem", "vh", "vmax", "vmin", "vw",
];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const LIST_STYLES: &[&str] = &[
    "none", "disc", "circle", "square", "decimal", "decimal-leading-zero", "lower-alpha",
    "lower-roman", "upper-alpha", "upper-roman", "inside", "outside",
];

#[derive(Clone, Debug, Default)]
pub(crate) struct PropertySpec {
    classes: u8,
    keywords: Vec<Box<str>>,
}

impl PropertySpec {
    fn new(classes: u8, keywords: &[&str]) -> Self {
        Self {
            classes,
            keywords: keywords.iter().map(|k| (*k).into()).collect(),
        }
    }

    fn allows_keyword(&self, ident: &str) -> bool {
        self.classes & KEYWORD != 0 && self.keywords.iter().any(|k| k.as_ref() == ident)
    }
}

/// The property whitelist. [`CssSchema::standard`] covers the common
/// formatting properties; schemas compose by [`CssSchema::union`].
#[derive(Clone, Debug, Default)]
pub struct CssSchema {
    properties: FxHashMap<Box<str>, PropertySpec>,
}

impl CssSchema {
    /// A schema permitting nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whitelists a property constrained to an identifier keyword set.
    pub fn allow_property_keywords(mut self, name: &str, keywords: &[&str]) -> Self {
        self.insert(name, PropertySpec::new(KEYWORD, keywords));
        self
    }

    /// Merges another schema in; its entries win on collision.
    pub fn union(mut self, other: CssSchema) -> Self {
        self.properties.extend(other.properties);
        self
    }

    fn insert(&mut self, name: &str, spec: PropertySpec) {
        self.properties.insert(name.into(), spec);
    }

    fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// The default property catalog: colors, fonts, text layout,
    /// boxes, lists and tables. URL-valued properties participate
    /// only when the policy grants `allow_urls_in_styles`.
    pub fn standard() -> Self {
        let mut schema = Self::default();

        let sides = ["", "-top", "-right", "-bottom", "-left"];

        schema.insert("color", PropertySpec::new(COLOR | KEYWORD, &[]));
        schema.insert("background-color", PropertySpec::new(COLOR | KEYWORD, &[]));
        schema.insert(
            "background",
            PropertySpec::new(
                COLOR | URL | LENGTH | PERCENTAGE | KEYWORD,
                &[
                    "none", "left", "right", "top", "bottom", "center", "repeat", "repeat-x",
                    "repeat-y", "no-repeat", "scroll", "fixed",
                ],
            ),
        );
        schema.insert("background-image", PropertySpec::new(URL | KEYWORD, &["none"]));

        for side in sides {
            schema.insert(
                &format!("border{side}-color"),
                PropertySpec::new(COLOR | KEYWORD, &[]),
            );
            schema.insert(
                &format!("border{side}-style"),
                PropertySpec::new(KEYWORD, BORDER_STYLES),
            );
            schema.insert(
                &format!("border{side}-width"),
                PropertySpec::new(LENGTH | KEYWORD, &["thin", "medium", "thick"]),
            );
            let mut border = PropertySpec::new(LENGTH | COLOR | KEYWORD, BORDER_STYLES);
            border.keywords.extend(["thin", "medium", "thick"].map(Into::into));
            schema.insert(&format!("border{side}"), border);

            let margin_classes = LENGTH | PERCENTAGE | KEYWORD;
            schema.insert(
                &format!("margin{side}"),
                PropertySpec::new(margin_classes, &["auto"]),
            );
            schema.insert(
                &format!("padding{side}"),
                PropertySpec::new(LENGTH | PERCENTAGE, &[]),
            );
        }

        schema.insert("border-collapse", PropertySpec::new(KEYWORD, &["collapse", "separate"]));
        schema.insert("border-spacing", PropertySpec::new(LENGTH, &[]));
        schema.insert("caption-side", PropertySpec::new(KEYWORD, &["top", "bottom"]));
        schema.insert("clear", PropertySpec::new(KEYWORD, &["none", "left", "right", "both"]));
        schema.insert("direction", PropertySpec::new(KEYWORD, &["ltr", "rtl"]));
        schema.insert("float", PropertySpec::new(KEYWORD, &["none", "left", "right"]));

        schema.insert(
            "font",
            PropertySpec::new(
                IDENT | STRING | LENGTH | PERCENTAGE | NUMBER | KEYWORD,
                &["normal", "italic", "oblique", "small-caps", "bold", "bolder", "lighter"],
            ),
        );
        schema.insert(
            "font-family",
            PropertySpec::new(
                IDENT | STRING | KEYWORD,
                &["serif", "sans-serif", "cursive", "fantasy", "monospace"],
            ),
        );
        schema.insert(
            "font-size",
            PropertySpec::new(
                LENGTH | PERCENTAGE | KEYWORD,
                &[
                    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
                    "smaller", "larger",
                ],
            ),
        );
        schema.insert("font-style", PropertySpec::new(KEYWORD, &["normal", "italic", "oblique"]));
        schema.insert("font-variant", PropertySpec::new(KEYWORD, &["normal", "small-caps"]));
        schema.insert(
            "font-weight",
            PropertySpec::new(NUMBER | KEYWORD, &["normal", "bold", "bolder", "lighter"]),
        );

        for dimension in ["width", "height", "max-width", "max-height", "min-width", "min-height"]
        {
            schema.insert(
                dimension,
                PropertySpec::new(LENGTH | PERCENTAGE | KEYWORD, &["auto", "none"]),
            );
        }

        schema.insert("letter-spacing", PropertySpec::new(LENGTH | KEYWORD, &["normal"]));
        schema.insert("word-spacing", PropertySpec::new(LENGTH | KEYWORD, &["normal"]));
        schema.insert(
            "line-height",
            PropertySpec::new(NUMBER | LENGTH | PERCENTAGE | KEYWORD, &["normal"]),
        );

        schema.insert("list-style", PropertySpec::new(KEYWORD, LIST_STYLES));
        schema.insert(
            "list-style-position",
            PropertySpec::new(KEYWORD, &["inside", "outside"]),
        );
        schema.insert("list-style-type", PropertySpec::new(KEYWORD, LIST_STYLES));

        schema.insert("table-layout", PropertySpec::new(KEYWORD, &["auto", "fixed"]));
        schema.insert(
            "text-align",
            PropertySpec::new(KEYWORD, &["left", "right", "center", "justify"]),
        );
        schema.insert(
            "text-decoration",
            PropertySpec::new(KEYWORD, &["none", "underline", "overline", "line-through"]),
        );
        schema.insert("text-indent", PropertySpec::new(LENGTH | PERCENTAGE, &[]));
        schema.insert("text-overflow", PropertySpec::new(KEYWORD, &["clip", "ellipsis"]));
        schema.insert(
            "text-transform",
            PropertySpec::new(KEYWORD, &["none", "capitalize", "uppercase", "lowercase"]),
        );
        schema.insert(
            "unicode-bidi",
            PropertySpec::new(KEYWORD, &["normal", "embed", "bidi-override"]),
        );
        schema.insert(
            "vertical-align",
            PropertySpec::new(
                LENGTH | PERCENTAGE | KEYWORD,
                &[
                    "baseline", "sub", "super", "top", "text-top", "middle", "bottom",
                    "text-bottom",
                ],
            ),
        );
        schema.insert(
            "white-space",
            PropertySpec::new(KEYWORD, &["normal", "pre", "nowrap", "pre-wrap", "pre-line"]),
        );

        schema
    }
}

/// Filters a `style` attribute value down to whitelisted declarations.
/// Returns `None` when nothing survives, which drops the attribute.
pub(crate) fn sanitize_declarations(
    css: &str,
    schema: &CssSchema,
    url_ok: Option<&dyn Fn(&str) -> bool>,
) -> Option<String> {
    let tokens = CssTokenizer::tokenize(css);
    let (out, _) = parse_declarations(&tokens, 0, schema, url_ok);
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Filters a `<style>` body: plain rule blocks survive with their
/// declarations filtered; at-rules and rules with exotic selectors
/// drop whole.
pub(crate) fn sanitize_stylesheet(
    css: &str,
    schema: &CssSchema,
    url_ok: Option<&dyn Fn(&str) -> bool>,
) -> Option<String> {
    let tokens = CssTokenizer::tokenize(css);
    let mut out = String::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            CssToken::Whitespace | CssToken::Semicolon | CssToken::CloseBrace => i += 1,
            CssToken::AtKeyword(name) => {
                debug!("dropping @{name} rule");
                i = skip_at_rule(&tokens, i + 1);
            }
            _ => {
                let (selector, at_brace) = parse_selector(&tokens, i);
                match selector {
                    Some(selector) if at_brace < tokens.len() => {
                        let (decls, next) =
                            parse_declarations(&tokens, at_brace + 1, schema, url_ok);
                        if !decls.is_empty() {
                            if !out.is_empty() {
                                out.push(' ');
                            }
                            out.push_str(&selector);
                            out.push('{');
                            out.push_str(&decls);
                            out.push('}');
                        }
                        i = next;
                    }
                    _ => {
                        // Unsupported selector; skip its whole block.
                        i = skip_block(&tokens, at_brace);
                    }
                }
            }
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Consumes an at-rule: through its `;` or through a balanced block.
fn skip_at_rule(tokens: &[CssToken], mut i: usize) -> usize {
    while i < tokens.len() {
        match tokens[i] {
            CssToken::Semicolon => return i + 1,
            CssToken::OpenBrace => return skip_block(tokens, i),
            _ => i += 1,
        }
    }
    i
}

/// Consumes a balanced `{ ... }` starting at or after `i`.
fn skip_block(tokens: &[CssToken], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < tokens.len() {
        match tokens[i] {
            CssToken::OpenBrace => depth += 1,
            CssToken::CloseBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// Rebuilds a conservative selector (type, class, id, the simple
/// combinators) up to the opening brace. Anything else rejects the
/// rule.
fn parse_selector(tokens: &[CssToken], mut i: usize) -> (Option<String>, usize) {
    let mut selector = String::new();
    let mut supported = true;

    while i < tokens.len() {
        match &tokens[i] {
            CssToken::OpenBrace => {
                let trimmed = selector.trim().to_string();
                if trimmed.is_empty() {
                    supported = false;
                }
                return (supported.then_some(trimmed), i);
            }
            CssToken::Ident(name) => selector.push_str(&name.to_ascii_lowercase()),
            CssToken::Hash(name) => {
                selector.push('#');
                selector.push_str(name);
            }
            CssToken::Delim(c @ ('.' | '*' | '>' | '+' | '~')) => selector.push(*c),
            CssToken::Colon => selector.push(':'),
            CssToken::Comma => selector.push(','),
            CssToken::Whitespace => selector.push(' '),
            _ => supported = false,
        }
        i += 1;
    }

    (None, i)
}

/// Parses `name:value` declarations until end of input or an
/// unbalanced `}`, emitting the survivors joined by `;`.
fn parse_declarations(
    tokens: &[CssToken],
    mut i: usize,
    schema: &CssSchema,
    url_ok: Option<&dyn Fn(&str) -> bool>,
) -> (String, usize) {
    let mut out = String::new();

    loop {
        while i < tokens.len()
            && matches!(tokens[i], CssToken::Whitespace | CssToken::Semicolon)
        {
            i += 1;
        }
        if i >= tokens.len() {
            return (out, i);
        }
        if matches!(tokens[i], CssToken::CloseBrace) {
            return (out, i + 1);
        }

        let CssToken::Ident(ref property) = tokens[i] else {
            i = skip_declaration(tokens, i);
            continue;
        };
        let property = property.to_ascii_lowercase();
        i += 1;

        while i < tokens.len() && matches!(tokens[i], CssToken::Whitespace) {
            i += 1;
        }
        if !matches!(tokens.get(i), Some(CssToken::Colon)) {
            i = skip_declaration(tokens, i);
            continue;
        }
        i += 1;

        let value_start = i;
        i = skip_declaration(tokens, i);
        let value_end = match tokens.get(i.saturating_sub(1)) {
            Some(CssToken::Semicolon) | Some(CssToken::CloseBrace) => i - 1,
            _ => i,
        };
        // A close brace ends the whole list, not just this declaration.
        let ends_block = matches!(tokens.get(value_end), Some(CssToken::CloseBrace));

        match schema.get(&property) {
            Some(spec) => {
                match normalize_value(&tokens[value_start..value_end], spec, url_ok) {
                    Some(value) if !value.is_empty() => {
                        if !out.is_empty() {
                            out.push(';');
                        }
                        out.push_str(&property);
                        out.push(':');
                        out.push_str(&value);
                    }
                    _ => debug!("dropping css declaration `{property}`: value rejected"),
                }
            }
            None => debug!("dropping css declaration `{property}`: not whitelisted"),
        }

        if ends_block {
            return (out, value_end + 1);
        }
    }
}

/// Consumes through the end of the current declaration: the `;` or
/// `}` at nesting depth zero.
fn skip_declaration(tokens: &[CssToken], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < tokens.len() {
        match tokens[i] {
            CssToken::Semicolon if depth == 0 => return i + 1,
            CssToken::CloseBrace if depth == 0 => return i + 1,
            CssToken::Function(_) | CssToken::OpenParen | CssToken::OpenSquare
            | CssToken::OpenBrace => depth += 1,
            CssToken::CloseParen | CssToken::CloseSquare | CssToken::CloseBrace => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        i += 1;
    }
    i
}

fn normalize_value(
    tokens: &[CssToken],
    spec: &PropertySpec,
    url_ok: Option<&dyn Fn(&str) -> bool>,
) -> Option<String> {
    let mut out = String::new();
    let mut pending_space = false;
    let push = |out: &mut String, piece: &str, pending_space: &mut bool| {
        if *pending_space && !out.is_empty() && !out.ends_with(',') {
            out.push(' ');
        }
        *pending_space = false;
        out.push_str(piece);
    };

    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            CssToken::Whitespace => pending_space = true,
            CssToken::Comma => {
                out.push(',');
                pending_space = false;
            }
            CssToken::Ident(ident) => {
                let ident = ident.to_ascii_lowercase();
                let accepted = spec.allows_keyword(&ident)
                    || GLOBAL_KEYWORDS.contains(&ident.as_str())
                    || spec.classes & IDENT != 0
                    || (spec.classes & COLOR != 0 && COLOR_NAMES.contains(&ident.as_str()));
                if !accepted {
                    return None;
                }
                push(&mut out, &ident, &mut pending_space);
            }
            CssToken::Hash(hex) => {
                let valid = spec.classes & COLOR != 0
                    && matches!(hex.len(), 3 | 4 | 6 | 8)
                    && hex.bytes().all(|b| b.is_ascii_hexdigit());
                if !valid {
                    return None;
                }
                push(&mut out, &format!("#{}", hex.to_ascii_lowercase()), &mut pending_space);
            }
            CssToken::Number { value, repr } => {
                let accepted = spec.classes & NUMBER != 0
                    || (*value == 0.0 && spec.classes & (LENGTH | PERCENTAGE) != 0);
                if !accepted {
                    return None;
                }
                push(&mut out, repr, &mut pending_space);
            }
            CssToken::Percentage { repr, .. } => {
                if spec.classes & PERCENTAGE == 0 {
                    return None;
                }
                push(&mut out, &format!("{repr}%"), &mut pending_space);
            }
            CssToken::Dimension { repr, unit, .. } => {
                let unit = unit.to_ascii_lowercase();
                if spec.classes & LENGTH == 0 || !LENGTH_UNITS.contains(&unit.as_str()) {
                    return None;
                }
                push(&mut out, &format!("{repr}{unit}"), &mut pending_space);
            }
            CssToken::Str(text) => {
                if spec.classes & STRING == 0 {
                    return None;
                }
                push(&mut out, &css_quote(text), &mut pending_space);
            }
            CssToken::Url(target) => {
                let quoted = vet_url(target, spec, url_ok)?;
                push(&mut out, &quoted, &mut pending_space);
            }
            CssToken::Function(name) if name.eq_ignore_ascii_case("url") => {
                // url( '...' ): a string argument then the close paren.
                let mut j = i + 1;
                while matches!(tokens.get(j), Some(CssToken::Whitespace)) {
                    j += 1;
                }
                let Some(CssToken::Str(target)) = tokens.get(j) else {
                    return None;
                };
                let quoted = vet_url(target, spec, url_ok)?;
                j += 1;
                while matches!(tokens.get(j), Some(CssToken::Whitespace)) {
                    j += 1;
                }
                if !matches!(tokens.get(j), Some(CssToken::CloseParen)) {
                    return None;
                }
                push(&mut out, &quoted, &mut pending_space);
                i = j;
            }
            CssToken::Function(name)
                if spec.classes & COLOR != 0
                    && matches!(
                        name.to_ascii_lowercase().as_str(),
                        "rgb" | "rgba" | "hsl" | "hsla"
                    ) =>
            {
                let (piece, next) = normalize_color_function(&name.to_ascii_lowercase(), tokens, i + 1)?;
                push(&mut out, &piece, &mut pending_space);
                i = next;
            }
            // Everything else rejects the declaration: unexpected
            // functions (expression!), at-keywords, bad strings and
            // urls, stray delimiters and brackets.
            _ => return None,
        }
        i += 1;
    }

    Some(out)
}

/// Rebuilds `rgb(…)`-family arguments from numbers, percentages and
/// commas only.
fn normalize_color_function(
    name: &str,
    tokens: &[CssToken],
    mut i: usize,
) -> Option<(String, usize)> {
    let mut args = String::new();
    while i < tokens.len() {
        match &tokens[i] {
            CssToken::CloseParen => {
                if args.is_empty() {
                    return None;
                }
                return Some((format!("{name}({args})"), i));
            }
            CssToken::Whitespace => {}
            CssToken::Comma => args.push(','),
            CssToken::Number { repr, .. } => args.push_str(repr),
            CssToken::Percentage { repr, .. } => {
                args.push_str(repr);
                args.push('%');
            }
            _ => return None,
        }
        i += 1;
    }
    None
}

fn vet_url(
    target: &str,
    spec: &PropertySpec,
    url_ok: Option<&dyn Fn(&str) -> bool>,
) -> Option<String> {
    if spec.classes & URL == 0 {
        return None;
    }
    let url_ok = url_ok?;
    if !url_ok(target) {
        debug!("dropping css url: scheme rejected");
        return None;
    }
    Some(format!("url({})", css_quote_url(target)))
}

/// Single-quotes a string, CSS-escaping everything that could matter
/// to an HTML or CSS parser downstream.
fn css_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\27 "),
            '"' => out.push_str("\\22 "),
            '\\' => out.push_str("\\5c "),
            '<' => out.push_str("\\3c "),
            '>' => out.push_str("\\3e "),
            '&' => out.push_str("\\26 "),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:x} ", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Like [`css_quote`] but with non-ASCII percent-encoded, so the url
/// survives any downstream charset handling byte-for-byte.
fn css_quote_url(target: &str) -> String {
    let mut out = String::with_capacity(target.len() + 2);
    out.push('\'');
    for c in target.chars() {
        match c {
            '\'' => out.push_str("\\27 "),
            '"' => out.push_str("\\22 "),
            '\\' => out.push_str("\\5c "),
            '<' => out.push_str("\\3c "),
            '>' => out.push_str("\\3e "),
            '&' => out.push_str("\\26 "),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            ' ' => out.push_str("%20"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:x} ", c as u32));
            }
            c if !c.is_ascii() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn filter(css: &str) -> Option<String> {
        sanitize_declarations(css, &CssSchema::standard(), None)
    }

    fn filter_with_urls(css: &str) -> Option<String> {
        let allow_http = |url: &str| url.starts_with("http:") || url.starts_with("https:");
        sanitize_declarations(css, &CssSchema::standard(), Some(&allow_http))
    }

    #[test]
    fn keeps_whitelisted_declarations() {
        assert_eq!(filter("color: red"), Some("color:red".into()));
        assert_eq!(
            filter("color:RED; background-color: #FFF"),
            Some("color:red;background-color:#fff".into())
        );
        assert_eq!(
            filter("margin: 0 auto; padding-left: 12px"),
            Some("margin:0 auto;padding-left:12px".into())
        );
    }

    #[test]
    fn drops_unknown_properties() {
        assert_eq!(filter("position: fixed"), None);
        assert_eq!(
            filter("color: blue; position: fixed"),
            Some("color:blue".into())
        );
    }

    #[test]
    fn drops_bad_values_whole() {
        assert_eq!(filter("color: #12345"), None);
        assert_eq!(filter("width: 10parsecs"), None);
        assert_eq!(filter("color: red blue extra( )"), None);
    }

    #[test]
    fn rejects_expression_and_friends() {
        assert_eq!(filter("width: expression(alert(1))"), None);
        assert_eq!(filter("width: e\\78 pression(alert(1))"), None);
        assert_eq!(filter("font-family: @import"), None);
    }

    #[test]
    fn color_functions() {
        assert_eq!(
            filter("color: rgb(1, 2, 3)"),
            Some("color:rgb(1,2,3)".into())
        );
        assert_eq!(
            filter("color: rgba(0,0,0,.5)"),
            Some("color:rgba(0,0,0,.5)".into())
        );
        assert_eq!(filter("color: rgb(alert(1))"), None);
    }

    #[test]
    fn urls_require_the_url_policy() {
        assert_eq!(filter("background-image: url(http://x/y.png)"), None);
        assert_eq!(
            filter_with_urls("background-image: url(http://x/y.png)"),
            Some("background-image:url('http://x/y.png')".into())
        );
        assert_eq!(
            filter_with_urls("background-image: url('javascript:alert(1)')"),
            None
        );
    }

    #[test]
    fn url_quoting_escapes_and_percent_encodes() {
        assert_eq!(
            filter_with_urls("background-image: url(http://x/a'b.png)"),
            Some("background-image:url('http://x/a\\27 b.png')".into())
        );
        assert_eq!(
            filter_with_urls("background-image: url(http://x/\u{e9}.png)"),
            Some("background-image:url('http://x/%C3%A9.png')".into())
        );
    }

    #[test]
    fn font_families() {
        assert_eq!(
            filter("font-family: \"Gill Sans\", Arial, sans-serif"),
            Some("font-family:'Gill Sans',arial,sans-serif".into())
        );
    }

    #[test]
    fn stylesheets_keep_plain_rules() {
        let sheet = "p { color: red; } @import url(evil); .x>b { float: left }";
        assert_eq!(
            sanitize_stylesheet(sheet, &CssSchema::standard(), None),
            Some("p{color:red} .x>b{float:left}".into())
        );
    }

    #[test]
    fn stylesheet_with_nothing_left_is_none() {
        assert_eq!(
            sanitize_stylesheet("@media x { p { color: red } }", &CssSchema::standard(), None),
            None
        );
    }
}
