use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::normalize::normalize_text;

/// A candidate article found on the listing page, before the detail page
/// has been fetched. `date_text` is the raw text near the link; the
/// normalizer decides whether it is a usable date.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleStub {
    pub title: String,
    pub date_text: String,
    pub url: String,
}

/// Extract article stubs from the listing page.
///
/// Candidate anchors are found by a prioritized sequence of structural
/// predicates, so minor template changes degrade gracefully: first anchors
/// whose target lives under the listing page's own path, then anchors
/// inside containers that carry news-list signals. URLs are deduplicated
/// preserving document order and capped at `max_items`. HTML without any
/// matching structure yields an empty vector.
pub fn listing_stubs(html: &str, base_url: &str, max_items: usize) -> Vec<ArticleStub> {
    let document = Html::parse_document(html);
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let mut stubs = Vec::new();
    let mut seen = HashSet::new();

    for (anchor, url) in candidate_anchors(&document, &base) {
        let url = url.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let container = enclosing_container(anchor);
        let title = stub_title(container, anchor);
        if title.is_empty() {
            continue;
        }

        stubs.push(ArticleStub {
            title,
            date_text: stub_date_text(container),
            url,
        });
        if stubs.len() >= max_items {
            break;
        }
    }

    stubs
}

/// Anchors that look like links to article detail pages, resolved to
/// absolute same-host URLs. Predicates are tried in order; the first one
/// that produces any candidates wins.
fn candidate_anchors<'a>(document: &'a Html, base: &Url) -> Vec<(ElementRef<'a>, Url)> {
    let anchor_selector = Selector::parse("a[href]").unwrap();
    let news_selector =
        Selector::parse("article a[href], [class*=\"news\"] a[href], [class*=\"nyhet\"] a[href]")
            .unwrap();

    let under_listing_path: Vec<_> = document
        .select(&anchor_selector)
        .filter_map(|a| resolve(a, base).map(|url| (a, url)))
        .filter(|(_, url)| url.path().starts_with(base.path()) && url.path() != base.path())
        .collect();
    if !under_listing_path.is_empty() {
        return under_listing_path;
    }

    document
        .select(&news_selector)
        .filter_map(|a| resolve(a, base).map(|url| (a, url)))
        .filter(|(_, url)| url.as_str() != base.as_str())
        .collect()
}

fn resolve(anchor: ElementRef<'_>, base: &Url) -> Option<Url> {
    let href = anchor.value().attr("href")?;
    let mut url = base.join(href).ok()?;
    if url.host_str() != base.host_str() {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Climb a few ancestors to find the element most likely to hold the
/// stub's title and date alongside the link.
fn enclosing_container(anchor: ElementRef<'_>) -> ElementRef<'_> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(3)
        .find(|el| matches!(el.value().name(), "article" | "li" | "div"))
        .unwrap_or(anchor)
}

fn stub_title(container: ElementRef<'_>, anchor: ElementRef<'_>) -> String {
    let heading_selector = Selector::parse("h1, h2, h3").unwrap();
    let raw = container
        .select(&heading_selector)
        .next()
        .map(|heading| heading.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_else(|| anchor.text().collect::<Vec<_>>().join(" "));
    normalize_text(&raw)
}

fn stub_date_text(container: ElementRef<'_>) -> String {
    let time_selector = Selector::parse("time").unwrap();
    let raw = container
        .select(&time_selector)
        .next()
        .map(|time| {
            time.value()
                .attr("datetime")
                .map(str::to_string)
                .unwrap_or_else(|| time.text().collect::<Vec<_>>().join(" "))
        })
        .unwrap_or_else(|| container.text().collect::<Vec<_>>().join(" "));
    normalize_text(&raw)
}

/// Extract the main body text from a detail page.
///
/// Prioritized predicates: paragraphs under `<article>`, then under
/// `<main>`, then any paragraph; as a last resort the visible page text
/// with script/style/navigation blocks skipped. Unusable input yields the
/// empty string.
pub fn detail_content(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_text in ["article p", "main p", "p"] {
        let selector = Selector::parse(selector_text).unwrap();
        let joined = document
            .select(&selector)
            .map(|p| p.text().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" ");
        let text = normalize_text(&joined);
        if !text.is_empty() {
            return text;
        }
    }

    normalize_text(&visible_text(document.root_element()))
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let boilerplate = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .map(|el| {
                    matches!(
                        el.name(),
                        "script" | "style" | "noscript" | "nav" | "header" | "footer"
                    )
                })
                .unwrap_or(false);
            if !boilerplate {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    out
}
