//! Alternative-title extraction from rendered disambiguation pages.
//!
//! A disambiguation page is a bulleted list of "X may refer to" links. The
//! alternatives are the first article link of each list item, in document
//! order, skipping table-of-contents entries and links into non-article
//! namespaces.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// List items in the rendered page body.
static LI_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("li selector"));

/// Internal wiki links inside a list item.
static WIKI_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/wiki/"]"#).expect("wiki link selector"));

/// Namespace prefixes that never name an article.
const NON_ARTICLE_NAMESPACES: &[&str] = &[
    "Category:",
    "File:",
    "Help:",
    "Portal:",
    "Special:",
    "Talk:",
    "Template:",
    "Wikipedia:",
];

/// Extract candidate article titles from disambiguation page HTML.
pub(crate) fn extract_options(html: &str) -> Vec<String> {
    let doc = Html::parse_fragment(html);
    let mut options: Vec<String> = Vec::new();

    for li in doc.select(&LI_SEL) {
        let classes = li.value().attr("class").unwrap_or("");
        if classes.contains("toc") {
            continue;
        }

        let Some(link) = li.select(&WIKI_LINK_SEL).next() else {
            continue;
        };

        let title = link
            .value()
            .attr("title")
            .map(str::to_string)
            .unwrap_or_else(|| link.text().collect::<String>())
            .trim()
            .to_string();

        if title.is_empty()
            || NON_ARTICLE_NAMESPACES.iter().any(|ns| title.starts_with(ns))
            || options.contains(&title)
        {
            continue;
        }

        options.push(title);
    }

    options
}
