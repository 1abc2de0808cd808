//! Quantified properties of the sanitizer, exercised over generated
//! tag soup and over arbitrary strings.

use html_sanitizer::{sanitize, Attribute, EventReader, HtmlSink, Policy};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

fn rich_policy() -> Policy {
    Policy::builder()
        .allow_elements([
            "a", "b", "i", "em", "strong", "p", "div", "span", "h1", "h2", "ul", "ol", "li",
            "dl", "dd", "dt", "table", "tbody", "thead", "tr", "td", "th", "caption", "pre",
            "blockquote", "img", "br", "hr", "xmp",
        ])
        .allow_without_attributes(["a", "span"])
        .allow_attributes(["href", "target"])
        .on_elements(["a"])
        .allow_attributes(["src", "alt"])
        .on_elements(["img"])
        .allow_attributes(["title"])
        .globally()
        .allow_standard_url_protocols()
        .allow_styling()
        .build()
}

fn small_policy() -> Policy {
    Policy::builder()
        .allow_elements(["b", "i", "p"])
        .allow_attributes(["title"])
        .globally()
        .build()
}

/// Markup-shaped input: concatenated fragments that exercise nesting
/// repair, raw text, references and malformed constructs.
#[derive(Clone, Debug)]
struct Soup(String);

impl Arbitrary for Soup {
    fn arbitrary(g: &mut Gen) -> Self {
        const FRAGMENTS: &[&str] = &[
            "<div>", "</div>", "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<span>",
            "</span>", "<h1>", "</h1>", "<ul>", "<li>", "</li>", "</ul>", "<table>", "<tr>",
            "<td>", "</td>", "</table>", "<a href=\"http://example.com/\">", "</a>",
            "<a href=\"javascript:alert(1)\">", "<img src=\"a.png\">", "<br>",
            "<script>alert(1)</script>", "<style>p{color:red}</style>", "<xmp>a<b</xmp>",
            "<textarea>t</textarea>", "plain text ", "1 < 2 ", "&amp;", "&#65;", "&nbsp;",
            "<!-- comment -->", "<!doctype html>", "<?pi?>", "</>", "\"q\" 'v' ", "<b",
            "attr=>", "<p title=\"x&amp;y\">", "\u{0}", "\u{2f81a}",
        ];
        let count = usize::arbitrary(g) % 24;
        let mut soup = String::new();
        for _ in 0..count {
            soup.push_str(g.choose(FRAGMENTS).unwrap());
        }
        Soup(soup)
    }
}

#[quickcheck]
fn idempotent_on_tag_soup(input: Soup) -> bool {
    let policy = rich_policy();
    let once = sanitize(&policy, &input.0);
    let twice = sanitize(&policy, &once);
    assert_eq!(once, twice, "input: {:?}", input.0);
    true
}

#[quickcheck]
fn idempotent_on_arbitrary_strings(input: String) -> bool {
    let policy = rich_policy();
    let once = sanitize(&policy, &input);
    let twice = sanitize(&policy, &once);
    assert_eq!(once, twice, "input: {input:?}");
    true
}

/// Re-reads sanitized output as events and records anything that
/// breaks well-nestedness or the depth bound.
#[derive(Default)]
struct OutputAudit {
    stack: Vec<Box<str>>,
    max_depth: usize,
    attrs: Vec<Attribute>,
    violations: Vec<String>,
}

const VOIDS: &[&str] = &["area", "br", "col", "hr", "img", "input", "source", "wbr"];

impl HtmlSink for OutputAudit {
    fn open_document(&mut self) {}
    fn open_tag(&mut self, name: &str, attrs: Vec<Attribute>) {
        self.attrs.extend(attrs);
        if !VOIDS.contains(&name) {
            self.stack.push(name.into());
            self.max_depth = self.max_depth.max(self.stack.len());
        }
    }
    fn close_tag(&mut self, name: &str) {
        if self.stack.pop().as_deref() != Some(name) {
            self.violations.push(format!("mispaired </{name}>"));
        }
    }
    fn text(&mut self, _text: &str) {}
    fn unescaped_text(&mut self, _text: &str) {}
    fn close_document(&mut self) {
        if !self.stack.is_empty() {
            self.violations.push(format!("left open: {:?}", self.stack));
        }
    }
}

fn audit(output: &str) -> OutputAudit {
    let mut audit = OutputAudit::default();
    EventReader::new(output).run(&mut audit);
    audit
}

#[quickcheck]
fn output_is_well_nested_and_depth_bounded(input: Soup) -> bool {
    let output = sanitize(&rich_policy(), &input.0);
    let audit = audit(&output);
    assert!(audit.violations.is_empty(), "{:?} on {output:?}", audit.violations);
    assert!(audit.max_depth <= 256);
    true
}

#[quickcheck]
fn output_urls_carry_no_dangerous_scheme(input: Soup) -> bool {
    let output = sanitize(&rich_policy(), &input.0);
    for attr in audit(&output).attrs {
        if matches!(attr.name.as_str(), "href" | "src" | "action" | "cite") {
            let value = attr.value.trim();
            if let Some(colon) = value.find(':') {
                let scheme = &value[..colon];
                if scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-') {
                    assert!(
                        matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https" | "mailto"),
                        "scheme {scheme:?} leaked into {output:?}"
                    );
                }
            }
        }
    }
    true
}

/// Text over an alphabet no escaping rule touches.
#[derive(Clone, Debug)]
struct PlainText(String);

impl Arbitrary for PlainText {
    fn arbitrary(g: &mut Gen) -> Self {
        const ALPHABET: &[char] = &[
            'a', 'b', 'z', 'A', 'Q', '0', '9', ' ', '.', ',', '!', '?', '-', '(', ')', ':',
            ';', '/', '%',
        ];
        let len = usize::arbitrary(g) % 40;
        PlainText((0..len).map(|_| *g.choose(ALPHABET).unwrap()).collect())
    }
}

#[quickcheck]
fn plain_text_round_trips(input: PlainText) -> bool {
    assert_eq!(sanitize(&rich_policy(), &input.0), input.0);
    true
}

/// A permissive policy accepts everything a stricter subset of it
/// emitted: the smaller policy's output is a fixpoint of the larger.
#[quickcheck]
fn widening_the_policy_changes_nothing_already_accepted(input: Soup) -> bool {
    let narrow = sanitize(&small_policy(), &input.0);
    assert_eq!(sanitize(&rich_policy(), &narrow), narrow, "narrow: {narrow:?}");
    true
}
