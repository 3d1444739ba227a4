//! Blocking HTTP over libcurl, shared by the page fetcher and the chat client.
//!
//! No timeouts are configured; libcurl defaults apply.

use thiserror::Error;

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Curl reported an error (DNS, connection refused, timeout, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
}

/// Status and body of a 2xx response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub code: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Plain GET following redirects.
pub fn get(url: &str) -> Result<HttpResponse, HttpError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    perform(easy)
}

/// POST a JSON document; the response body is returned undecoded.
pub fn post_json(url: &str, json: &[u8]) -> Result<HttpResponse, HttpError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(json)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    list.append("Accept: application/json")?;
    // No 100-continue round trip for large prompts.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    perform(easy)
}

fn perform(mut easy: curl::easy::Easy) -> Result<HttpResponse, HttpError> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(HttpError::Status(code));
    }
    let response = HttpResponse { code, body };
    if let Ok(elapsed) = easy.total_time() {
        tracing::debug!(
            code = response.code,
            bytes = response.body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "http exchange done"
        );
    }
    Ok(response)
}
