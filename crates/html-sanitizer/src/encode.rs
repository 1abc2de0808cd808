//! Defensive character escaping for rendered output.
//!
//! The escape set is deliberately wider than what HTML strictly
//! requires: besides the markup characters, backtick, `+`, `=` and `@`
//! are encoded numerically, as is every code point outside
//! `[U+0020, U+FF00)` other than CR and LF in text. Supplementary-plane
//! characters always become one numeric entity, never a surrogate
//! pair, so downstream UTF-16 consumers cannot be confused about where
//! a character ends.

use std::fmt::{self, Write};

/// Escapes parsed character data.
pub fn encode_text_onto<W: Write>(text: &str, out: &mut W) -> fmt::Result {
    encode_onto(text, out, false)
}

/// Escapes an attribute value for a double-quoted position.
pub fn encode_attr_onto<W: Write>(value: &str, out: &mut W) -> fmt::Result {
    encode_onto(value, out, true)
}

fn encode_onto<W: Write>(text: &str, out: &mut W, in_attribute: bool) -> fmt::Result {
    for c in text.chars() {
        match c {
            // NULs never reach output in any form.
            '\0' => {}
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&#34;")?,
            '\'' => out.write_str("&#39;")?,
            '`' => out.write_str("&#96;")?,
            '=' => out.write_str("&#61;")?,
            '@' => out.write_str("&#64;")?,
            '+' => out.write_str("&#43;")?,
            '\r' | '\n' if !in_attribute => out.write_char(c)?,
            c if (c as u32) < 0x20 || (c as u32) >= 0xFF00 => {
                write!(out, "&#x{:x};", c as u32)?;
            }
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn text(input: &str) -> String {
        let mut out = String::new();
        encode_text_onto(input, &mut out).unwrap();
        out
    }

    fn attr(input: &str) -> String {
        let mut out = String::new();
        encode_attr_onto(input, &mut out).unwrap();
        out
    }

    #[test]
    fn markup_characters() {
        assert_eq!(text("<b> & \"c\""), "&lt;b&gt; &amp; &#34;c&#34;");
        assert_eq!(text("a'`="), "a&#39;&#96;&#61;");
        assert_eq!(text("x@y+z"), "x&#64;y&#43;z");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(text("hello world, 100%"), "hello world, 100%");
        assert_eq!(text("caf\u{e9} \u{2014} ok"), "caf\u{e9} \u{2014} ok");
    }

    #[test]
    fn newlines_pass_in_text_but_not_attributes() {
        assert_eq!(text("a\r\nb"), "a\r\nb");
        assert_eq!(attr("a\r\nb"), "a&#xd;&#xa;b");
    }

    #[test]
    fn controls_are_numeric() {
        assert_eq!(text("a\tb"), "a&#x9;b");
        assert_eq!(text("a\u{1b}b"), "a&#x1b;b");
    }

    #[test]
    fn nul_is_dropped() {
        assert_eq!(text("a\0b"), "ab");
        assert_eq!(attr("a\0b"), "ab");
    }

    #[test]
    fn supplementary_code_points_are_single_entities() {
        assert_eq!(text("\u{2f81a}"), "&#x2f81a;");
        assert_eq!(text("\u{1f4a9}"), "&#x1f4a9;");
    }

    #[test]
    fn upper_bmp_is_numeric() {
        assert_eq!(text("\u{ff01}"), "&#xff01;");
        assert_eq!(text("\u{fffd}"), "&#xfffd;");
    }
}
