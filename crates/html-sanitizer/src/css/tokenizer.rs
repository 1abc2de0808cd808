//! CSS tokenization, the subset of CSS Syntax Module Level 3 the
//! style sanitizer needs: idents, functions, at-keywords, hashes,
//! strings, urls, numbers in their three flavors, punctuation and
//! comments. Escapes are decoded here; re-encoding happens when the
//! sanitizer emits normalized declarations.

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CssToken {
    Ident(String),
    /// Function name with the `(` consumed (`rgb(`, `expression(`).
    Function(String),
    AtKeyword(String),
    /// `#` followed by a name (colors, fragments).
    Hash(String),
    Str(String),
    BadStr,
    /// Unquoted `url(...)` contents.
    Url(String),
    BadUrl,
    Number { value: f64, repr: String },
    Percentage { value: f64, repr: String },
    Dimension { value: f64, repr: String, unit: String },
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenBrace,
    CloseBrace,
    Delim(char),
}

pub(crate) struct CssTokenizer {
    chars: Vec<char>,
    pos: usize,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c as u32 >= 0x80
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

impl CssTokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(input: &str) -> Vec<CssToken> {
        let mut tokenizer = Self::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        Some(c)
    }

    /// A backslash followed by anything but a newline is an escape.
    fn starts_escape(&self, offset: usize) -> bool {
        self.peek(offset) == Some('\\') && !matches!(self.peek(offset + 1), Some('\n') | None)
    }

    fn would_start_ident(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some('-') => match self.peek(offset + 1) {
                Some('-') => true,
                Some(c) if is_name_start(c) => true,
                _ => self.starts_escape(offset + 1),
            },
            Some(c) if is_name_start(c) => true,
            _ => self.starts_escape(offset),
        }
    }

    fn would_start_number(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some('+') | Some('-') => matches!(
                self.peek(offset + 1),
                Some(c) if c.is_ascii_digit()
            ) || (self.peek(offset + 1) == Some('.')
                && matches!(self.peek(offset + 2), Some(c) if c.is_ascii_digit())),
            Some('.') => matches!(self.peek(offset + 1), Some(c) if c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn next_token(&mut self) -> Option<CssToken> {
        loop {
            match self.peek(0)? {
                '/' if self.peek(1) == Some('*') => {
                    self.pos += 2;
                    while self.pos < self.chars.len() {
                        if self.peek(0) == Some('*') && self.peek(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                c if c.is_whitespace() => {
                    while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
                        self.pos += 1;
                    }
                    return Some(CssToken::Whitespace);
                }
                _ => break,
            }
        }

        let c = self.peek(0)?;
        Some(match c {
            '"' | '\'' => self.consume_string(c),
            '#' => {
                self.pos += 1;
                if matches!(self.peek(0), Some(c) if is_name_char(c)) || self.starts_escape(0) {
                    CssToken::Hash(self.consume_name())
                } else {
                    CssToken::Delim('#')
                }
            }
            '(' => self.punct(CssToken::OpenParen),
            ')' => self.punct(CssToken::CloseParen),
            '[' => self.punct(CssToken::OpenSquare),
            ']' => self.punct(CssToken::CloseSquare),
            '{' => self.punct(CssToken::OpenBrace),
            '}' => self.punct(CssToken::CloseBrace),
            ':' => self.punct(CssToken::Colon),
            ';' => self.punct(CssToken::Semicolon),
            ',' => self.punct(CssToken::Comma),
            '@' => {
                if self.would_start_ident(1) {
                    self.pos += 1;
                    CssToken::AtKeyword(self.consume_name())
                } else {
                    self.punct(CssToken::Delim('@'))
                }
            }
            '+' | '.' if self.would_start_number(0) => self.consume_numeric(),
            '-' => {
                if self.would_start_number(0) {
                    self.consume_numeric()
                } else if self.would_start_ident(0) {
                    self.consume_ident_like()
                } else {
                    self.punct(CssToken::Delim('-'))
                }
            }
            '\\' => {
                if self.starts_escape(0) {
                    self.consume_ident_like()
                } else {
                    self.punct(CssToken::Delim('\\'))
                }
            }
            c if c.is_ascii_digit() => self.consume_numeric(),
            c if is_name_start(c) => self.consume_ident_like(),
            c => self.punct(CssToken::Delim(c)),
        })
    }

    fn punct(&mut self, token: CssToken) -> CssToken {
        self.pos += 1;
        token
    }

    fn consume_escape(&mut self) -> char {
        // The backslash is already consumed.
        let Some(c) = self.bump() else {
            return '\u{fffd}';
        };

        if !c.is_ascii_hexdigit() {
            return c;
        }

        let mut value = c.to_digit(16).unwrap();
        let mut digits = 1;
        while digits < 6 {
            match self.peek(0) {
                Some(h) if h.is_ascii_hexdigit() => {
                    value = value * 16 + h.to_digit(16).unwrap();
                    self.pos += 1;
                    digits += 1;
                }
                _ => break,
            }
        }
        // One whitespace character after a hex escape is eaten.
        if matches!(self.peek(0), Some(w) if w.is_whitespace()) {
            self.pos += 1;
        }

        match char::from_u32(value) {
            Some('\0') | None => '\u{fffd}',
            Some(decoded) => decoded,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek(0) {
                Some(c) if is_name_char(c) => {
                    name.push(c);
                    self.pos += 1;
                }
                Some('\\') if self.starts_escape(0) => {
                    self.pos += 1;
                    name.push(self.consume_escape());
                }
                _ => return name,
            }
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return CssToken::Str(value),
                Some(c) if c == quote => return CssToken::Str(value),
                Some('\n') => {
                    // Unescaped newline: bad string; the newline stays
                    // for the parser to recover on.
                    self.pos -= 1;
                    return CssToken::BadStr;
                }
                Some('\\') => match self.peek(0) {
                    None => return CssToken::Str(value),
                    Some('\n') => {
                        self.pos += 1;
                    }
                    _ => value.push(self.consume_escape()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_numeric(&mut self) -> CssToken {
        let mut repr = String::new();

        if matches!(self.peek(0), Some('+') | Some('-')) {
            repr.push(self.bump().unwrap());
        }
        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            repr.push(self.bump().unwrap());
        }
        if self.peek(0) == Some('.')
            && matches!(self.peek(1), Some(c) if c.is_ascii_digit())
        {
            repr.push(self.bump().unwrap());
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                repr.push(self.bump().unwrap());
            }
        }
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let sign = matches!(self.peek(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if matches!(self.peek(digit_at), Some(c) if c.is_ascii_digit()) {
                repr.push(self.bump().unwrap());
                if sign {
                    repr.push(self.bump().unwrap());
                }
                while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                    repr.push(self.bump().unwrap());
                }
            }
        }

        let value = repr.parse::<f64>().unwrap_or(0.0);

        if self.peek(0) == Some('%') {
            self.pos += 1;
            return CssToken::Percentage { value, repr };
        }
        if self.would_start_ident(0) {
            let unit = self.consume_name();
            return CssToken::Dimension { value, repr, unit };
        }
        CssToken::Number { value, repr }
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();

        if self.peek(0) != Some('(') {
            return CssToken::Ident(name);
        }
        self.pos += 1;

        if !name.eq_ignore_ascii_case("url") {
            return CssToken::Function(name);
        }

        // url( followed by a quote is a function taking a string
        // argument; unquoted contents are the url token itself.
        let mut lookahead = 0;
        while matches!(self.peek(lookahead), Some(c) if c.is_whitespace()) {
            lookahead += 1;
        }
        if matches!(self.peek(lookahead), Some('"') | Some('\'')) {
            return CssToken::Function(name);
        }

        self.consume_url()
    }

    fn consume_url(&mut self) -> CssToken {
        while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return CssToken::Url(value),
                Some(')') => return CssToken::Url(value),
                Some('\\') => {
                    self.pos -= 1;
                    if self.starts_escape(0) {
                        self.pos += 1;
                        value.push(self.consume_escape());
                    } else {
                        return self.consume_bad_url();
                    }
                }
                Some(c) if c.is_whitespace() => {
                    while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
                        self.pos += 1;
                    }
                    return match self.bump() {
                        Some(')') | None => CssToken::Url(value),
                        _ => self.consume_bad_url(),
                    };
                }
                Some('"') | Some('\'') | Some('(') => return self.consume_bad_url(),
                Some(c) if (c as u32) < 0x20 => return self.consume_bad_url(),
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_bad_url(&mut self) -> CssToken {
        loop {
            match self.bump() {
                None | Some(')') => return CssToken::BadUrl,
                Some('\\') if self.starts_escape(0) => {
                    self.pos += 1;
                    self.consume_escape();
                }
                _ => {}
            }
        }
    }
}
