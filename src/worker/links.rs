//! Anchor extraction for link tasks
//!
//! Every `<a>` with a resolvable `href` becomes one link, in document order.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// First non-empty text node directly inside the anchor (empty if none)
    pub text: String,
    /// The href resolved to an absolute URL
    pub url: Url,
}

/// Extracts all anchors from an HTML document
///
/// Relative hrefs resolve against the document's `<base href>` when present,
/// otherwise against `page_url` (the page's final address after redirects).
/// Anchors without an `href`, or whose `href` cannot be joined, are skipped.
///
/// # Example
///
/// ```
/// use sitelint::worker::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><a>no href</a>"#;
/// let page = Url::parse("http://x.com/blog").unwrap();
/// let links = extract_links(html, &page);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].url.as_str(), "http://x.com/about");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let Ok(anchor_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = base.join(href.trim()).ok()?;
            Some(ExtractedLink {
                text: anchor_text(&anchor),
                url,
            })
        })
        .collect()
}

/// Resolves the base URL declared by `<base href>`, if any
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|base| base.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("http://x.com/blog").unwrap()
    }

    fn urls(links: &[ExtractedLink]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[test]
    fn test_mixed_anchors() {
        let html = r#"<html><body>
            <a href="/a">A</a>
            <a>no href</a>
            <a href="http://ext.com/b">B</a>
        </body></html>"#;

        let links = extract_links(html, &page());

        assert_eq!(
            links,
            vec![
                ExtractedLink {
                    text: "A".to_string(),
                    url: Url::parse("http://x.com/a").unwrap(),
                },
                ExtractedLink {
                    text: "B".to_string(),
                    url: Url::parse("http://ext.com/b").unwrap(),
                },
            ]
        );
    }

    #[test]
    fn test_root_relative_href() {
        let links = extract_links(r#"<a href="/about">About</a>"#, &page());
        assert_eq!(urls(&links), vec!["http://x.com/about"]);
    }

    #[test]
    fn test_path_relative_href() {
        let page = Url::parse("http://x.com/blog/post").unwrap();
        let links = extract_links(r#"<a href="other">Other</a>"#, &page);
        assert_eq!(urls(&links), vec!["http://x.com/blog/other"]);
    }

    #[test]
    fn test_base_element_changes_resolution() {
        let html = r#"<html><head><base href="/docs/"></head>
            <body><a href="intro">Intro</a></body></html>"#;
        let links = extract_links(html, &page());
        assert_eq!(urls(&links), vec!["http://x.com/docs/intro"]);
    }

    #[test]
    fn test_text_is_first_direct_text_node() {
        let html = r#"<a href="/x">  <span>nested</span> First <b>bold</b> Second</a>"#;
        let links = extract_links(html, &page());
        assert_eq!(links[0].text, "First");
    }

    #[test]
    fn test_anchor_without_text() {
        let html = r#"<a href="/img"><img src="/i.png"></a>"#;
        let links = extract_links(html, &page());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "");
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"<a href="/3">3</a><a href="/1">1</a><a href="/2">2</a>"#;
        let links = extract_links(html, &page());
        let texts: Vec<&str> = links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_no_anchors() {
        assert!(extract_links("<p>plain text</p>", &page()).is_empty());
        assert!(extract_links("", &page()).is_empty());
    }

    #[test]
    fn test_results_are_always_absolute() {
        let html = r#"<a href="a">1</a><a href="../b">2</a><a href="?q=1">3</a><a href="//cdn.x.com/c">4</a>"#;
        for link in extract_links(html, &page()) {
            assert!(link.url.has_host(), "{} should be absolute", link.url);
        }
    }
}
