//! Page retrieval with per-URL failure isolation.
//!
//! Every URL is fetched with one blocking GET. Failures are reported to the
//! observer and skipped; callers only ever see the pages that arrived.

use crate::http::{self, HttpError};
use crate::observer::Observer;
use thiserror::Error;

/// Raw HTML retrieved from one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

/// A single URL could not be retrieved. Never fatal to a run.
#[derive(Debug, Error)]
#[error("Error fetching or processing URL {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: HttpError,
}

/// GET one page. Non-2xx responses and transport failures become `FetchError`.
pub fn fetch_page(url: &str) -> Result<FetchedPage, FetchError> {
    let response = http::get(url).map_err(|source| FetchError {
        url: url.to_string(),
        source,
    })?;
    Ok(FetchedPage {
        url: url.to_string(),
        html: response.text(),
    })
}

/// Fetch each URL in order, keeping only successes.
///
/// Emits exactly one progress tick per URL attempted and one observer error
/// per failed URL.
pub fn fetch_all<S: AsRef<str>>(urls: &[S], observer: &mut dyn Observer) -> Vec<FetchedPage> {
    let total = urls.len();
    urls.iter()
        .enumerate()
        .filter_map(|(i, url)| {
            let url = url.as_ref();
            let outcome = fetch_page(url);
            observer.progress(i + 1, total);
            match outcome {
                Ok(page) => {
                    tracing::info!(url, bytes = page.html.len(), "fetched page");
                    Some(page)
                }
                Err(err) => {
                    tracing::warn!(url, error = %err.source, "fetch failed, skipping");
                    observer.error(&err.to_string());
                    None
                }
            }
        })
        .collect()
}
