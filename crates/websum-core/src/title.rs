//! Title generation and filename sanitizing.

use crate::chat::{ChatError, OllamaClient};
use crate::config::WebsumConfig;
use crate::observer::Observer;
use crate::template;

/// Title used whenever the model can't provide a usable one.
pub const UNTITLED: &str = "Untitled";

/// Characters rejected in filenames on common filesystems.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Delete every reserved character (no replacement) and trim surrounding whitespace.
///
/// Trimming happens last so a quoted title like `" Foo "` can't leave padding behind.
pub fn sanitize_title(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect();
    kept.trim().to_string()
}

pub fn build_prompt(cfg: &WebsumConfig, content: &str) -> String {
    template::render(&cfg.title_prompt, &[("content", content)])
}

/// Ask the model for a title and sanitize it.
///
/// A reply that sanitizes to nothing becomes [`UNTITLED`].
pub fn generate_title(
    cfg: &WebsumConfig,
    client: &OllamaClient,
    content: &str,
) -> Result<String, ChatError> {
    let prompt = build_prompt(cfg, content);
    let raw = client.complete(&cfg.title_system_prompt, &prompt, cfg.title.into())?;
    let title = sanitize_title(&raw);
    if title.is_empty() {
        tracing::warn!(raw = %raw, "model title empty after sanitizing");
        return Ok(UNTITLED.to_string());
    }
    Ok(title)
}

/// Like [`generate_title`], but never fails: errors are reported to the
/// observer and the sentinel title is used so the answer can still be saved.
pub fn title_or_untitled(
    cfg: &WebsumConfig,
    client: &OllamaClient,
    content: &str,
    observer: &mut dyn Observer,
) -> String {
    match generate_title(cfg, client, content) {
        Ok(title) => title,
        Err(e) => {
            tracing::warn!(error = %e, "title generation failed, using sentinel");
            observer.error(&format!(
                "Error calling Ollama API for title generation: {}",
                e
            ));
            UNTITLED.to_string()
        }
    }
}
