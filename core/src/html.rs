use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

lazy_static! {
    static ref COMMENTS: Regex = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    static ref SCRIPTS: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex");
    static ref STYLES: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex");
    static ref TAGS: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
    static ref ENTITIES: Regex = Regex::new(r"&[a-zA-Z#0-9]+;").expect("valid regex");
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Strips comments, scripts, styles, tags, and entities, leaving plain
/// text. Comments go first so markup hidden inside them disappears
/// with them.
pub fn strip_html(raw: &str) -> String {
    let text = COMMENTS.replace_all(raw, " ");
    let text = SCRIPTS.replace_all(&text, " ");
    let text = STYLES.replace_all(&text, " ");
    let text = TAGS.replace_all(&text, " ");
    ENTITIES.replace_all(&text, " ").into_owned()
}

/// All absolute HTTP(S) links in the anchors of `html`, in document
/// order, resolved against `base` and cleaned of fragments. Duplicates
/// are kept; the crawler's visited set deduplicates.
pub fn list_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut absolute) = Url::parse(href).or_else(|_| base.join(href)) else {
            tracing::debug!(href, "skipping unparsable link");
            continue;
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }
        absolute.set_fragment(None);
        links.push(absolute);
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_scripts_and_comments() {
        let html = r#"<html><head><script>var x = "cat";</script>
            <style>p { color: red; }</style></head>
            <body><!-- dog --><p>cat &amp; dog</p></body></html>"#;
        let text = strip_html(html);
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, ["cat", "dog"]);
    }

    #[test]
    fn resolves_relative_links_and_drops_fragments() {
        let base = Url::parse("https://example.com/docs/index.html").unwrap();
        let html = r##"<a href="page.html#top">one</a>
            <a href="https://other.net/a">two</a>
            <a href="mailto:x@example.com">three</a>"##;
        let links = list_links(&base, html);
        assert_eq!(
            links,
            [
                Url::parse("https://example.com/docs/page.html").unwrap(),
                Url::parse("https://other.net/a").unwrap(),
            ]
        );
    }

    #[test]
    fn keeps_only_http_and_https_schemes() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<a href="http://example.com/plain">one</a>
            <a href="httpfoo://example.com/odd">two</a>
            <a href="ftp://example.com/file">three</a>"#;
        let links = list_links(&base, html);
        assert_eq!(links, [Url::parse("http://example.com/plain").unwrap()]);
    }
}
