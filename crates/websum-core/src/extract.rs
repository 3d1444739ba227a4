//! HTML to readable text: readability isolation, then markdown conversion.
//!
//! Extraction never fails. Each stage that can't cope with its input hands
//! the previous representation on to a cruder fallback:
//! readability → whole document → htmd markdown → bare text nodes.
//!
//! Readability and htmd both recurse over the DOM, so documents nested deeper
//! than [`MAX_NESTING_DEPTH`] skip straight to the text-node walk.

use crate::fetch::FetchedPage;
use dom_smoothie::{Config, Readability};
use scraper::Html;

/// Deepest element nesting handed to readability and htmd.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Readable text from exactly one source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText {
    pub source: String,
    pub body: String,
}

impl CleanedText {
    /// Provenance line, body, then a blank-line separator, so several of
    /// these can be concatenated and still be told apart.
    pub fn render(&self) -> String {
        format!("Source: {}\n{}\n\n", self.source, self.body)
    }
}

/// Clean one fetched page.
pub fn extract(page: &FetchedPage) -> CleanedText {
    CleanedText {
        source: page.url.clone(),
        body: html_to_text(&page.html, Some(&page.url)),
    }
}

/// Convert arbitrary (possibly malformed) HTML into markdown-like text.
///
/// `url` is used to resolve relative links when it parses as a URL.
pub fn html_to_text(html: &str, url: Option<&str>) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let document = Html::parse_document(html);
    if exceeds_depth(&document, MAX_NESTING_DEPTH) {
        tracing::debug!(
            limit = MAX_NESTING_DEPTH,
            "document nested too deeply, keeping text nodes only"
        );
        return text_nodes(&document);
    }
    let fragment = main_content(html, url).unwrap_or_else(|| html.to_string());
    to_markdown(&fragment)
}

/// Run readability over the document; None when it can't find an article.
fn main_content(html: &str, url: Option<&str>) -> Option<String> {
    let url = url.filter(|u| url::Url::parse(u).is_ok());
    let cfg = Config {
        max_elements_to_parse: 9000,
        ..Default::default()
    };

    let mut readability = match Readability::new(html, url, Some(cfg)) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "readability setup failed, using whole document");
            return None;
        }
    };
    match readability.parse() {
        Ok(article) => {
            let content = article.content.to_string();
            if content.trim().is_empty() {
                None
            } else {
                Some(content)
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "readability found no article, using whole document");
            None
        }
    }
}

fn to_markdown(html: &str) -> String {
    match htmd::convert(html) {
        Ok(md) => md.trim().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "markdown conversion failed, falling back to text nodes");
            plain_text(html)
        }
    }
}

/// Iterative walk; stops as soon as some node sits deeper than `limit`.
fn exceeds_depth(document: &Html, limit: usize) -> bool {
    let mut stack = vec![(document.tree.root(), 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > limit {
            return true;
        }
        stack.extend(node.children().map(|child| (child, depth + 1)));
    }
    false
}

/// Last-resort text: every text node, whitespace-normalized.
fn plain_text(html: &str) -> String {
    text_nodes(&Html::parse_document(html))
}

fn text_nodes(document: &Html) -> String {
    let text: Vec<&str> = document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect();
    text.join(" ")
}
