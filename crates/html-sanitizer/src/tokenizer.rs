//! Backtrack-free lexer over a borrowed HTML fragment.
//!
//! The tokenizer walks the input once with a byte cursor and hands out
//! `(kind, start, end)` spans in strictly increasing order; nothing is
//! scanned twice and malformed constructs still come out as tokens.
//! Surface grammar differs per
//! element: ordinary PCDATA, RCDATA (`title`, `textarea`), raw text
//! (`script`, `style`, `iframe`, `xmp`, `listing`) with the script
//! escaping-text-span rules, and the legacy unending `plaintext`.
//!
//! [`EventReader`] sits on top and assembles spans into [`HtmlSink`]
//! events: names canonicalized, attribute values and parsed text
//! entity-decoded, NULs stripped.

use crate::element_table;
use crate::sink::{Attribute, HtmlSink};
use crate::str_fns::{stripos, strpos};
use entities::HtmlContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Parsed character data; references decode downstream.
    Text,
    /// Raw contents of a CDATA or plaintext element; never decoded.
    Unescaped,
    /// `<name` or `</name`.
    TagBegin { closing: bool },
    /// The `>` finishing a tag (zero-width when input ends inside one).
    TagEnd,
    AttrName,
    AttrValue,
    Comment,
    /// Doctypes, processing instructions, bogus comments, `</>`.
    Ignorable,
}

/// A half-open `[start, end)` byte span of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

fn is_tag_terminator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0C' | b'\r' | b'\n' | b'/' | b'>')
}

#[derive(Clone, Copy)]
enum State {
    Data,
    /// Scanning attributes inside a tag whose name spans the range.
    InTag {
        closing: bool,
        name_start: usize,
        name_end: usize,
    },
    /// Contents of a raw-text element; the span names the host.
    RawText {
        name_start: usize,
        name_end: usize,
        script: bool,
    },
    /// Contents of an RCDATA element.
    Rcdata {
        name_start: usize,
        name_end: usize,
    },
    Plaintext,
}

pub struct Tokenizer<'a> {
    bytes: &'a [u8],
    at: usize,
    state: State,
    /// Attribute value waiting to be handed out after its name.
    pending: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            at: 0,
            state: State::Data,
            pending: None,
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        match self.state {
            State::Data => self.next_in_data(),
            State::InTag {
                closing,
                name_start,
                name_end,
            } => self.next_in_tag(closing, name_start, name_end),
            State::RawText {
                name_start,
                name_end,
                script,
            } => self.next_in_raw_text(name_start, name_end, script),
            State::Rcdata {
                name_start,
                name_end,
            } => self.next_in_rcdata(name_start, name_end),
            State::Plaintext => {
                let start = self.at;
                self.at = self.bytes.len();
                if start < self.bytes.len() {
                    Some(Token::new(TokenKind::Unescaped, start, self.bytes.len()))
                } else {
                    None
                }
            }
        }
    }

    fn next_in_data(&mut self) -> Option<Token> {
        let bytes = self.bytes;
        let doc_length = bytes.len();
        let was_at = self.at;
        let mut at = was_at;

        while at < doc_length {
            let Some(lt) = strpos(bytes, b"<", at) else {
                break;
            };

            /*
             * A "<" without a viable token after it is plaintext, as in
             * "i <3 html". Keep scanning; the text run swallows it.
             */
            if lt + 1 >= doc_length
                || !matches!(bytes[lt + 1], b'!' | b'/' | b'?' | b'a'..=b'z' | b'A'..=b'Z')
            {
                at = lt + 1;
                continue;
            }

            // Flush the text run before the token boundary.
            if lt > was_at {
                self.at = lt;
                return Some(Token::new(TokenKind::Text, was_at, lt));
            }

            return Some(self.lex_token_at(lt));
        }

        self.at = doc_length;
        if was_at < doc_length {
            return Some(Token::new(TokenKind::Text, was_at, doc_length));
        }
        None
    }

    /// Lexes the token starting at `lt`, which points at a `<` known
    /// to be followed by `!`, `/`, `?` or a letter.
    fn lex_token_at(&mut self, lt: usize) -> Token {
        let bytes = self.bytes;
        let doc_length = bytes.len();
        let closing = bytes[lt + 1] == b'/';
        let name_start = lt + 1 + usize::from(closing);

        let letters = if name_start < doc_length {
            strspn!(bytes, b'a'..=b'z' | b'A'..=b'Z', name_start)
        } else {
            0
        };

        if letters > 0 {
            /*
             * Tag names start with a letter and run to whitespace, "/"
             * or ">"; whatever else lands in between is part of the
             * name and gets rejected later by name validation.
             */
            let name_end = name_start
                + letters
                + strcspn!(
                    bytes,
                    b' ' | b'\t' | 0x0C | b'\r' | b'\n' | b'/' | b'>',
                    name_start + letters
                );
            self.at = name_end;
            self.state = State::InTag {
                closing,
                name_start,
                name_end,
            };
            return Token::new(TokenKind::TagBegin { closing }, lt, name_end);
        }

        if closing {
            // `</>` is a missing end tag name and is ignored whole.
            if name_start < doc_length && bytes[name_start] == b'>' {
                self.at = name_start + 1;
                return Token::new(TokenKind::Ignorable, lt, name_start + 1);
            }

            // `</%` and other non-letter closers are bogus comments.
            return self.lex_through_gt(lt, TokenKind::Ignorable);
        }

        if bytes[lt + 1] == b'!' && lt + 4 <= doc_length && &bytes[lt + 2..lt + 4] == b"--" {
            return self.lex_comment(lt);
        }

        // `<!doctype ...>`, `<![CDATA[...]]>`, `<?php ... ?>` and the
        // rest of the markup-declaration lookalikes all skip to the
        // nearest ">".
        self.lex_through_gt(lt, TokenKind::Ignorable)
    }

    fn lex_through_gt(&mut self, start: usize, kind: TokenKind) -> Token {
        let end = match strpos(self.bytes, b">", start + 1) {
            Some(gt) => gt + 1,
            None => self.bytes.len(),
        };
        self.at = end;
        Token::new(kind, start, end)
    }

    fn lex_comment(&mut self, lt: usize) -> Token {
        let bytes = self.bytes;
        let doc_length = bytes.len();
        let mut closer_at = lt + 4;

        if closer_at >= doc_length {
            self.at = doc_length;
            return Token::new(TokenKind::Comment, lt, doc_length);
        }

        // Abruptly-closed comments are a run of dashes ending in ">",
        // as in `<!-->` and `<!--->`.
        let span_of_dashes = strspn!(bytes, b'-', closer_at);
        if closer_at + span_of_dashes < doc_length && b'>' == bytes[closer_at + span_of_dashes] {
            let end = closer_at + span_of_dashes + 1;
            self.at = end;
            return Token::new(TokenKind::Comment, lt, end);
        }

        /*
         * Comments close at the first "-->", or at the invalid "--!>"
         * which browsers accept as well.
         */
        while let Some(dashes_at) = strpos(bytes, b"--", closer_at) {
            if dashes_at + 2 < doc_length && b'>' == bytes[dashes_at + 2] {
                self.at = dashes_at + 3;
                return Token::new(TokenKind::Comment, lt, self.at);
            }
            if dashes_at + 3 < doc_length
                && b'!' == bytes[dashes_at + 2]
                && b'>' == bytes[dashes_at + 3]
            {
                self.at = dashes_at + 4;
                return Token::new(TokenKind::Comment, lt, self.at);
            }
            closer_at = dashes_at + 1;
        }

        self.at = doc_length;
        Token::new(TokenKind::Comment, lt, doc_length)
    }

    fn next_in_tag(&mut self, closing: bool, name_start: usize, name_end: usize) -> Option<Token> {
        let bytes = self.bytes;
        let doc_length = bytes.len();

        // Skip whitespace and stray slashes, including the
        // self-closing flag.
        self.at += strspn!(bytes, b' ' | b'\t' | 0x0C | b'\r' | b'\n' | b'/', self.at);

        if self.at >= doc_length {
            // Input ended inside the tag; surface a zero-width end so
            // the tag still reaches the downstream stages.
            self.state = State::Data;
            return Some(Token::new(TokenKind::TagEnd, doc_length, doc_length));
        }

        if b'>' == bytes[self.at] {
            let token = Token::new(TokenKind::TagEnd, self.at, self.at + 1);
            self.at += 1;
            self.state = self.state_after_tag(closing, name_start, name_end);
            return Some(token);
        }

        /*
         * A leading "=" becomes part of the attribute name, matching
         * the before-attribute-name state; the resulting name never
         * validates and the attribute drops later.
         */
        let starts_with_equal = b'=' == bytes[self.at];
        let name_length = usize::from(starts_with_equal)
            + strcspn!(
                bytes,
                b'=' | b'/' | b'>' | b' ' | b'\t' | 0x0C | b'\r' | b'\n',
                self.at + usize::from(starts_with_equal)
            );

        let attr_name = Token::new(TokenKind::AttrName, self.at, self.at + name_length);
        self.at += name_length;

        self.at += strspn!(bytes, b' ' | b'\t' | 0x0C | b'\r' | b'\n', self.at);
        if self.at < doc_length && b'=' == bytes[self.at] {
            self.at += 1;
            self.at += strspn!(bytes, b' ' | b'\t' | 0x0C | b'\r' | b'\n', self.at);

            if self.at < doc_length {
                self.pending = Some(match bytes[self.at] {
                    quote @ (b'\'' | b'"') => {
                        let value_start = self.at + 1;
                        match strpos(bytes, &[quote], value_start) {
                            Some(end_quote_at) => {
                                self.at = end_quote_at + 1;
                                Token::new(TokenKind::AttrValue, value_start, end_quote_at)
                            }
                            None => {
                                // Unterminated quote runs to end of input.
                                self.at = doc_length;
                                Token::new(TokenKind::AttrValue, value_start, doc_length)
                            }
                        }
                    }
                    _ => {
                        let value_start = self.at;
                        let value_length =
                            strcspn!(bytes, b'>' | b' ' | b'\t' | 0x0C | b'\r' | b'\n', value_start);
                        self.at = value_start + value_length;
                        Token::new(TokenKind::AttrValue, value_start, value_start + value_length)
                    }
                });
            }
        }

        Some(attr_name)
    }

    fn state_after_tag(&self, closing: bool, name_start: usize, name_end: usize) -> State {
        if closing {
            return State::Data;
        }

        let name = String::from_utf8_lossy(&self.bytes[name_start..name_end]).to_ascii_lowercase();
        let meta = element_table::meta_for(&name);

        if meta.is_plaintext() {
            State::Plaintext
        } else if meta.is_raw_text() {
            State::RawText {
                name_start,
                name_end,
                script: name == "script",
            }
        } else if meta.is_rcdata() {
            State::Rcdata {
                name_start,
                name_end,
            }
        } else {
            State::Data
        }
    }

    fn next_in_raw_text(
        &mut self,
        name_start: usize,
        name_end: usize,
        script: bool,
    ) -> Option<Token> {
        let start = self.at;
        let closer_at = if script {
            scan_script_end(self.bytes, start)
        } else {
            scan_raw_end(self.bytes, start, &self.bytes[name_start..name_end])
        };

        self.emit_raw_span(start, closer_at, TokenKind::Unescaped)
    }

    fn next_in_rcdata(&mut self, name_start: usize, name_end: usize) -> Option<Token> {
        let start = self.at;
        let closer_at = scan_raw_end(self.bytes, start, &self.bytes[name_start..name_end]);
        self.emit_raw_span(start, closer_at, TokenKind::Text)
    }

    fn emit_raw_span(
        &mut self,
        start: usize,
        closer_at: Option<usize>,
        kind: TokenKind,
    ) -> Option<Token> {
        match closer_at {
            Some(closer_at) => {
                self.at = closer_at;
                self.state = State::Data;
                if closer_at > start {
                    Some(Token::new(kind, start, closer_at))
                } else {
                    // Empty contents; go straight to the end tag.
                    self.next_token()
                }
            }
            None => {
                // No end tag; the contents run to end of input.
                self.at = self.bytes.len();
                self.state = State::Data;
                if start < self.bytes.len() {
                    Some(Token::new(kind, start, self.bytes.len()))
                } else {
                    None
                }
            }
        }
    }
}

/// Finds the `<` of the `</name` sequence ending a raw-text or RCDATA
/// region: a case-insensitive name match followed by whitespace, `/`,
/// `>` or end of input, so `</textarearug` does not end a `textarea`.
fn scan_raw_end(bytes: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    let mut needle = Vec::with_capacity(name.len() + 2);
    needle.extend_from_slice(b"</");
    needle.extend_from_slice(name);

    let mut at = from;
    while let Some(candidate_at) = stripos(bytes, &needle, at) {
        match bytes.get(candidate_at + needle.len()) {
            None => return Some(candidate_at),
            Some(&b) if is_tag_terminator(b) => return Some(candidate_at),
            Some(_) => at = candidate_at + 2,
        }
    }
    None
}

#[derive(PartialEq)]
enum ScriptState {
    Unescaped,
    Escaped,
    DoubleEscaped,
}

/// Finds the `<` of the `</script` that genuinely ends a script
/// element, honoring the escaping text span: inside `<!-- ... -->` a
/// nested `<script>` opens a double-escaped region whose `</script>`
/// returns to the escaped state instead of ending the element.
fn scan_script_end(bytes: &[u8], from: usize) -> Option<usize> {
    let doc_length = bytes.len();
    let mut state = ScriptState::Unescaped;
    let mut at = from;

    while at < doc_length {
        at += strcspn!(bytes, b'-' | b'<', at);
        if at >= doc_length {
            return None;
        }

        // For all states a "-->" transitions back to unescaped.
        if bytes[at] == b'-' {
            if at + 2 < doc_length && bytes[at + 1] == b'-' && bytes[at + 2] == b'>' {
                at += 3;
                state = ScriptState::Unescaped;
            } else {
                at += 1;
            }
            continue;
        }

        let lt = at;
        at += 1;

        // "<!--" moves into the escaped span unless already past it.
        if at + 2 < doc_length && bytes[at] == b'!' && bytes[at + 1] == b'-' && bytes[at + 2] == b'-'
        {
            at += 3;
            if state == ScriptState::Unescaped {
                state = ScriptState::Escaped;
            }
            continue;
        }

        let closing = bytes.get(at) == Some(&b'/');
        let name_at = at + usize::from(closing);

        if name_at + 6 > doc_length || !bytes[name_at..name_at + 6].eq_ignore_ascii_case(b"script")
        {
            continue;
        }

        // "<script123" opens no region; the name needs a terminator.
        if let Some(&b) = bytes.get(name_at + 6) {
            if !is_tag_terminator(b) {
                continue;
            }
        }

        match (&state, closing) {
            (ScriptState::Escaped, false) => state = ScriptState::DoubleEscaped,
            (ScriptState::DoubleEscaped, true) => state = ScriptState::Escaped,
            (_, true) => return Some(lt),
            _ => {}
        }
        at = name_at + 6;
    }

    None
}

/// Drives an [`HtmlSink`] from the token stream: pairs attribute names
/// with values, canonicalizes names, entity-decodes attribute values
/// and parsed text, and strips NULs.
pub struct EventReader<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
}

impl<'a> EventReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            tokenizer: Tokenizer::new(input),
        }
    }

    pub fn run(mut self, sink: &mut impl HtmlSink) {
        sink.open_document();

        let mut tag_name = String::new();
        let mut tag_closing = false;
        let mut attrs: Vec<Attribute> = Vec::new();
        let mut attr_name: Option<String> = None;

        while let Some(token) = self.tokenizer.next_token() {
            let slice = &self.input[token.start..token.end];
            match token.kind {
                TokenKind::TagBegin { closing } => {
                    let name_at = token.start + 1 + usize::from(closing);
                    tag_name = self.input[name_at..token.end].to_ascii_lowercase();
                    tag_closing = closing;
                    attrs.clear();
                    attr_name = None;
                }
                TokenKind::AttrName => {
                    flush_attribute(&mut attrs, &mut attr_name, String::new());
                    attr_name = Some(slice.to_ascii_lowercase());
                }
                TokenKind::AttrValue => {
                    let value = decode_text(HtmlContext::Attribute, slice);
                    flush_attribute(&mut attrs, &mut attr_name, value);
                }
                TokenKind::TagEnd => {
                    flush_attribute(&mut attrs, &mut attr_name, String::new());
                    if tag_closing {
                        sink.close_tag(&tag_name);
                    } else {
                        sink.open_tag(&tag_name, std::mem::take(&mut attrs));
                    }
                }
                TokenKind::Text => {
                    let text = decode_text(HtmlContext::BodyText, slice);
                    if !text.is_empty() {
                        sink.text(&text);
                    }
                }
                TokenKind::Unescaped => {
                    if slice.contains('\0') {
                        sink.unescaped_text(&slice.replace('\0', ""));
                    } else {
                        sink.unescaped_text(slice);
                    }
                }
                TokenKind::Comment | TokenKind::Ignorable => {}
            }
        }

        sink.close_document();
    }
}

fn decode_text(ctx: HtmlContext, slice: &str) -> String {
    let decoded = entities::decode(ctx, slice);
    if decoded.contains('\0') {
        decoded.replace('\0', "")
    } else {
        decoded.into_owned()
    }
}

/// Completes the attribute under construction. Duplicate names keep
/// their first occurrence, the way browsers resolve them.
fn flush_attribute(attrs: &mut Vec<Attribute>, name: &mut Option<String>, value: String) {
    if let Some(name) = name.take() {
        if !attrs.iter().any(|a| a.name == name) {
            attrs.push(Attribute { name, value });
        }
    }
}
