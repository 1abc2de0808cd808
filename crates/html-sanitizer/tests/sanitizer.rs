//! End-to-end sanitization scenarios.

use html_sanitizer::{sanitize, sanitize_with, HtmlChangeListener, Policy};

/// The reference policy: basic formatting, links and images over
/// http/https, nofollow enforced on links.
fn links_and_formatting() -> Policy {
    Policy::builder()
        .allow_elements(["a", "b", "i", "p", "img"])
        .allow_attributes(["href", "target"])
        .on_elements(["a"])
        .allow_attributes(["src"])
        .on_elements(["img"])
        .allow_attributes(["title"])
        .globally()
        .allow_url_protocols(["http", "https"])
        .require_rel_nofollow_on_links()
        .build()
}

#[track_caller]
fn check(policy: &Policy, input: &str, expected: &str) {
    let output = sanitize(policy, input);
    assert_eq!(output, expected);
    // Sanitizing a sanitizer's output must change nothing.
    assert_eq!(sanitize(policy, &output), output, "not idempotent");
}

#[test]
fn formatting_passes_through() {
    check(
        &links_and_formatting(),
        "<b>hello <i>world</i></b>",
        "<b>hello <i>world</i></b>",
    );
}

#[test]
fn scripts_vanish_with_their_contents() {
    check(
        &links_and_formatting(),
        "<b>hello <i>world</i><script src=foo.js></script></b>",
        "<b>hello <i>world</i></b>",
    );
    check(
        &links_and_formatting(),
        "an <script>evil()</script> example",
        "an  example",
    );
}

#[test]
fn unclosed_paragraphs_close_each_other() {
    check(&links_and_formatting(), "<p>1<p>2", "<p>1</p><p>2</p>");
}

#[test]
fn javascript_links_strip_down_to_text() {
    check(
        &links_and_formatting(),
        "<a href=\"javascript:alert(1)\">x</a>",
        "x",
    );
}

#[test]
fn target_links_are_hardened() {
    check(
        &links_and_formatting(),
        "<a href=\"http://example.com/\" target=\"_blank\">x</a>",
        "<a href=\"http://example.com/\" target=\"_blank\" rel=\"noopener noreferrer nofollow\">x</a>",
    );
}

#[test]
fn table_structure_is_implied() {
    let policy = Policy::builder()
        .allow_elements(["table", "tbody", "tr", "td"])
        .build();
    check(
        &policy,
        "<table><td>cell</td></table>",
        "<table><tbody><tr><td>cell</td></tr></tbody></table>",
    );
}

#[test]
fn hostile_nesting_is_capped() {
    let policy = Policy::builder().allow_elements(["div"]).build();
    let input = "<div>".repeat(20_000);
    let output = sanitize(&policy, &input);
    let opens = output.matches("<div>").count();
    let closes = output.matches("</div>").count();
    assert_eq!(opens, closes);
    assert!((50..=1000).contains(&opens), "got {opens} divs");
}

#[test]
fn nul_bytes_are_stripped() {
    check(
        &links_and_formatting(),
        "<b>Hello, \u{0}</b>",
        "<b>Hello, </b>",
    );
}

#[test]
fn xmp_renders_as_pre_with_escaped_contents() {
    let policy = Policy::builder().allow_elements(["xmp"]).build();
    check(
        &policy,
        "<xmp>A<B>C</B></xmp>",
        "<pre>A&lt;B&gt;C&lt;/B&gt;</pre>",
    );
}

#[test]
fn plaintext_renders_as_pre_too() {
    let policy = Policy::builder().allow_elements(["plaintext"]).build();
    check(
        &policy,
        "<plaintext>rest <b>of</b> it",
        "<pre>rest &lt;b&gt;of&lt;/b&gt; it</pre>",
    );
}

#[test]
fn supplementary_code_points_are_single_entities() {
    check(
        &links_and_formatting(),
        "<b>\u{2f81a}</b>",
        "<b>&#x2f81a;</b>",
    );
}

#[test]
fn unknown_elements_drop_but_keep_children() {
    check(
        &links_and_formatting(),
        "<div>one <b>two</b></div>",
        "one <b>two</b>",
    );
}

#[test]
fn event_handler_attributes_never_survive() {
    check(
        &links_and_formatting(),
        "<b onclick=\"evil()\" onmouseover=evil()>ok</b>",
        "<b>ok</b>",
    );
    check(
        &links_and_formatting(),
        "a <a onclick=\"evil()\" href=\"http://www.example.com\">link</a> example",
        "a <a href=\"http://www.example.com\" rel=\"nofollow\">link</a> example",
    );
}

#[test]
fn scheme_games_do_not_work() {
    let policy = links_and_formatting();
    // Case games.
    check(&policy, "<a href=\"JaVaScRiPt:alert(1)\">x</a>", "x");
    // Character-reference obfuscation decodes before the check.
    check(&policy, "<a href=\"&#106;avascript:alert(1)\">x</a>", "x");
    check(&policy, "<a href=\"jav&#x61;script:alert(1)\">x</a>", "x");
    // Embedded whitespace is no disguise either.
    check(&policy, "<a href=\"java\tscript:alert(1)\">x</a>", "x");
    // Images too.
    check(&policy, "<IMG SRC=\"javascript:alert(1)\">", "");
}

#[test]
fn images_keep_safe_sources() {
    check(
        &links_and_formatting(),
        "<img src=\"http://example.com/a.png\" title=\"pic\">",
        "<img src=\"http://example.com/a.png\" title=\"pic\">",
    );
    // Relative sources are fine under the default policy.
    check(
        &links_and_formatting(),
        "<img src=\"a.png\">",
        "<img src=\"a.png\">",
    );
}

#[test]
fn comments_and_declarations_vanish() {
    let policy = links_and_formatting();
    check(&policy, "a<!-- secret -->b", "ab");
    check(&policy, "<!DOCTYPE html><?php die() ?>x", "x");
    check(
        &policy,
        "<!-- <a href=\"http://x/\">still a comment</a> -->y",
        "y",
    );
}

#[test]
fn angle_typos_stay_text() {
    let policy = links_and_formatting();
    check(&policy, "1 < 2", "1 &lt; 2");
    check(&policy, "i <3 you", "i &lt;3 you");
    check(&policy, "a < b > c", "a &lt; b &gt; c");
}

#[test]
fn quotes_in_attributes_are_encoded() {
    check(
        &links_and_formatting(),
        "<b title='\"'>contents</b>",
        "<b title=\"&#34;\">contents</b>",
    );
}

#[test]
fn textarea_contents_cannot_break_out() {
    let policy = Policy::builder()
        .allow_elements(["textarea", "b"])
        .build();
    check(
        &policy,
        "<textarea>&lt;/textarea&gt;<b>bold?</b></textarea>",
        "<textarea>&lt;/textarea&gt;&lt;b&gt;bold?&lt;/b&gt;</textarea>",
    );
}

#[test]
fn styling_is_schema_filtered_end_to_end() {
    let policy = Policy::builder()
        .allow_elements(["p"])
        .allow_without_attributes(["p"])
        .allow_styling()
        .build();
    check(
        &policy,
        "<p style=\"color: red; behavior: url(#default#time2)\">x</p>",
        "<p style=\"color:red\">x</p>",
    );
    check(
        &policy,
        "<p style=\"width: expression(alert(1))\">x</p>",
        "<p>x</p>",
    );
}

#[test]
fn listener_reports_what_was_dropped() {
    #[derive(Default)]
    struct Log(std::sync::Mutex<Vec<String>>);

    impl HtmlChangeListener for Log {
        fn discarded_tag(&self, element: &str) {
            self.0.lock().unwrap().push(element.to_string());
        }
        fn discarded_attributes(&self, element: &str, attributes: &[&str]) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{element}[{}]", attributes.join(",")));
        }
    }

    let log = Log::default();
    let policy = links_and_formatting();
    let out = sanitize_with(
        &policy,
        "<script>x</script><b class=\"y\">ok</b>",
        Some(&log),
    );
    assert_eq!(out, "<b>ok</b>");
    assert_eq!(log.0.into_inner().unwrap(), vec!["script", "b[class]"]);
}

#[test]
fn policies_are_shareable_across_threads() {
    let policy = std::sync::Arc::new(links_and_formatting());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let policy = policy.clone();
            std::thread::spawn(move || {
                sanitize(&policy, &format!("<b>thread {i}</b><script>no</script>"))
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("<b>thread {i}</b>"));
    }
}
