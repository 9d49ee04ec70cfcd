//! Local HTML stripping for the legacy raw-HTML proxy response.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::types::page::PageLink;

/// Elements whose whole subtree never reaches the page text.
const DROPPED: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript", "svg", "head",
    "template",
];

/// Elements that start a new line.
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "main", "h1", "h2",
    "h3", "h4", "h5", "h6", "blockquote", "pre", "dd", "dt", "figcaption", "hr",
];

/// Strip markup down to readable text, one line per block element.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }))
            }
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

/// Sample `http(s)` links with visible text, resolved against `base`.
pub fn extract_links(html: &str, base: Option<&Url>, limit: usize) -> Vec<PageLink> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };
    let document = Html::parse_document(html);

    let mut links: Vec<PageLink> = Vec::new();
    for anchor in document.select(&selector) {
        if links.len() >= limit {
            break;
        }

        let Some(href) = anchor
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.starts_with('#'))
        else {
            continue;
        };

        let resolved = match base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        };
        let Some(url) = resolved.filter(|u| matches!(u.scheme(), "http" | "https")) else {
            continue;
        };

        let text = collapse_whitespace(&anchor.text().collect::<String>());
        if text.is_empty() {
            continue;
        }

        let url = url.to_string();
        if links.iter().all(|l| l.url != url) {
            links.push(PageLink::new(text, url));
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

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><style>body{}</style><script>var x = 1;</script></head>
<body><nav><a href="/">Home</a></nav><h1>Report</h1><p>Sales rose <b>79%</b> &amp; costs fell.</p>
<footer>Copyright</footer></body></html>"#;

        let text = html_to_text(html);
        assert_eq!(text, "Report\nSales rose 79% & costs fell.");
    }

    #[test]
    fn test_numeric_entities_decoded() {
        let text = html_to_text("<p>Sales rose 79&#37; last year&#8212;a record.</p>");
        assert_eq!(text, "Sales rose 79% last year\u{2014}a record.");
    }

    #[test]
    fn test_nested_header_dropped() {
        let html = r#"<header><nav><a href="/">Home</a></nav><h1>Title</h1></header><p>Body 81%</p>"#;
        assert_eq!(html_to_text(html), "Body 81%");
    }

    #[test]
    fn test_extract_links_resolves_and_filters() {
        let html = r##"<a href="/data">Data <i>2023</i></a>
<a href="#top">Top</a>
<a href="mailto:x@y.com">Mail</a>
<a href="https://other.org/a">Other</a>
<a href="https://other.org/a">Duplicate</a>
<a href="/empty"> </a>"##;

        let base = Url::parse("https://example.com/page").unwrap();
        let links = extract_links(html, Some(&base), 10);

        assert_eq!(
            links,
            vec![
                PageLink::new("Data 2023", "https://example.com/data"),
                PageLink::new("Other", "https://other.org/a"),
            ]
        );
    }

    #[test]
    fn test_extract_links_decodes_anchor_text() {
        let html = r#"<a href="https://x.com/r">R&amp;D &#8211; 2023</a>"#;
        assert_eq!(
            extract_links(html, None, 10),
            vec![PageLink::new("R&D \u{2013} 2023", "https://x.com/r")]
        );
    }

    #[test]
    fn test_extract_links_limit() {
        let html = (0..20)
            .map(|i| format!(r#"<a href="https://x.com/{i}">link {i}</a>"#))
            .collect::<String>();
        assert_eq!(extract_links(&html, None, 10).len(), 10);
    }
}
