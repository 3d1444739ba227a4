//! Answer synthesis: query + cleaned page texts → one chat completion.

use crate::chat::{ChatError, OllamaClient};
use crate::config::WebsumConfig;
use crate::extract::CleanedText;
use crate::template;

/// Fill `user_prompt` with the query and every rendered text, joined by a space.
///
/// An empty `texts` slice is valid; `{texts}` becomes the empty string.
pub fn build_prompt(cfg: &WebsumConfig, query: &str, texts: &[CleanedText]) -> String {
    let joined = texts
        .iter()
        .map(CleanedText::render)
        .collect::<Vec<_>>()
        .join(" ");
    template::render(&cfg.user_prompt, &[("query", query), ("texts", joined.as_str())])
}

/// Ask the model to answer `query` from `texts`.
///
/// A failure here is fatal to the run: nothing has been produced that could be saved.
pub fn synthesize(
    cfg: &WebsumConfig,
    client: &OllamaClient,
    query: &str,
    texts: &[CleanedText],
) -> Result<String, ChatError> {
    let prompt = build_prompt(cfg, query, texts);
    tracing::info!(
        sources = texts.len(),
        prompt_bytes = prompt.len(),
        "synthesizing answer"
    );
    client.complete(&cfg.system_prompt, &prompt, cfg.answer.into())
}
