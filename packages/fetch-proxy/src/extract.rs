//! Readable text and outbound links from an HTML document.

use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use url::Url;

/// Outbound links returned per page.
pub const MAX_LINKS: usize = 25;

/// Elements whose whole subtree is dropped.
const DROPPED: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript", "svg", "head",
    "template",
];

/// Elements that start a new line.
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "main", "h1", "h2",
    "h3", "h4", "h5", "h6", "blockquote", "pre", "dd", "dt", "figcaption", "hr",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    pub text: String,
    pub url: String,
}

/// Page text, one line per block element, capped at `max_chars` characters.
pub fn extract_text(document: &Html, max_chars: usize) -> String {
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    let text = raw
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    text.chars().take(max_chars).collect()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks are layout, not structure
            Node::Text(text) => out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c })),
            Node::Element(el) => {
                let name = el.name();
                if DROPPED.contains(&name) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCKS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_element, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// `http(s)` links with visible text resolved against `base`. In-page
/// anchors are skipped; the first occurrence of each URL is kept, at most
/// [`MAX_LINKS`].
pub fn extract_links(document: &Html, base: &Url) -> Vec<ExtractedLink> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut links: Vec<ExtractedLink> = Vec::new();
    for anchor in document.select(&selector) {
        if links.len() >= MAX_LINKS {
            break;
        }

        let Some(url) = anchor
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.starts_with('#'))
            .and_then(|href| base.join(href).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
        else {
            continue;
        };

        let text = collapse_whitespace(&anchor.text().collect::<String>());
        if text.is_empty() {
            continue;
        }

        let url = url.to_string();
        if links.iter().all(|l| l.url != url) {
            links.push(ExtractedLink { text, url });
        }
    }

    links
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head><title>Annual report</title><style>body { color: red; }</style></head>
<body>
  <header><a href="/">Home</a></header>
  <nav><ul><li><a href="/about">About</a></li></ul></nav>
  <main>
    <h1>Annual   report</h1>
    <p>Sales rose <b>79%</b> in 2023 &amp; costs fell.</p>
    <script>window.track("x");</script>
    <p>See the <a href="/data.csv">raw data</a> or the
       <a href="https://stats.example.org/table?id=4">national table</a>.</p>
  </main>
  <aside>Related posts</aside>
  <footer>&copy; Example</footer>
</body>
</html>"#;

    #[test]
    fn test_text_drops_boilerplate() {
        let document = Html::parse_document(PAGE);
        let text = extract_text(&document, 5000);

        assert_eq!(
            text,
            "Annual report\nSales rose 79% in 2023 & costs fell.\nSee the raw data or the national table."
        );
    }

    #[test]
    fn test_text_is_capped() {
        let document = Html::parse_document("<p>abcdefghij</p>");
        assert_eq!(extract_text(&document, 4), "abcd");
    }

    #[test]
    fn test_links_resolved_against_base() {
        let document = Html::parse_document(PAGE);
        let base = Url::parse("https://example.com/reports/2023").unwrap();

        let links = extract_links(&document, &base);

        assert_eq!(
            links,
            vec![
                ExtractedLink {
                    text: "Home".into(),
                    url: "https://example.com/".into()
                },
                ExtractedLink {
                    text: "About".into(),
                    url: "https://example.com/about".into()
                },
                ExtractedLink {
                    text: "raw data".into(),
                    url: "https://example.com/data.csv".into()
                },
                ExtractedLink {
                    text: "national table".into(),
                    url: "https://stats.example.org/table?id=4".into()
                },
            ]
        );
    }

    #[test]
    fn test_links_filtered_and_deduped() {
        let html = r##"<a href="mailto:a@b.com">Mail</a>
<a href="javascript:void(0)">Click</a>
<a href="#top">Top</a>
<a href="https://a.com/x"><img src="x.png"></a>
<a href="https://a.com/y">First</a>
<a href="https://a.com/y">Again</a>"##;
        let document = Html::parse_document(html);
        let base = Url::parse("https://a.com/").unwrap();

        let links = extract_links(&document, &base);

        assert_eq!(
            links,
            vec![ExtractedLink {
                text: "First".into(),
                url: "https://a.com/y".into()
            }]
        );
    }

    #[test]
    fn test_links_limit() {
        let html = (0..40)
            .map(|i| format!(r#"<a href="/p/{i}">page {i}</a>"#))
            .collect::<String>();
        let document = Html::parse_document(&html);
        let base = Url::parse("https://a.com/").unwrap();

        assert_eq!(extract_links(&document, &base).len(), MAX_LINKS);
    }
}
