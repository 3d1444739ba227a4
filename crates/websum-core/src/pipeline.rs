//! One query, end to end.
//!
//! Stages run strictly in order:
//! `ResolveUrls → Fetch → Extract → Synthesize → GenerateTitle → Persist → Done`.
//! Only a failed synthesis leaves the line early, into `Aborted`. Fetch
//! failures shrink the text set (possibly to nothing), a failed title becomes
//! `Untitled`, and a failed save still ends in `Done` without an artifact.

use crate::chat::{ChatError, OllamaClient};
use crate::config::WebsumConfig;
use crate::extract::{self, CleanedText};
use crate::fetch;
use crate::observer::Observer;
use crate::storage::{self, SavedArtifact};
use crate::synthesize;
use crate::title;
use std::fmt;

/// Position of a run in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveUrls,
    Fetch,
    Extract,
    Synthesize,
    GenerateTitle,
    Persist,
    Done,
    Aborted,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }

    /// The stage that follows on success; terminal stages stay put.
    pub fn next(self) -> Stage {
        match self {
            Stage::ResolveUrls => Stage::Fetch,
            Stage::Fetch => Stage::Extract,
            Stage::Extract => Stage::Synthesize,
            Stage::Synthesize => Stage::GenerateTitle,
            Stage::GenerateTitle => Stage::Persist,
            Stage::Persist => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Aborted => Stage::Aborted,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ResolveUrls => "resolve-urls",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Synthesize => "synthesize",
            Stage::GenerateTitle => "generate-title",
            Stage::Persist => "persist",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The model answered. `artifact` is None when saving failed.
    Done {
        answer: String,
        artifact: Option<SavedArtifact>,
    },
    /// No answer was obtained; nothing was written.
    Aborted { error: ChatError },
}

impl RunOutcome {
    pub fn stage(&self) -> Stage {
        match self {
            RunOutcome::Done { .. } => Stage::Done,
            RunOutcome::Aborted { .. } => Stage::Aborted,
        }
    }

    pub fn artifact(&self) -> Option<&SavedArtifact> {
        match self {
            RunOutcome::Done { artifact, .. } => artifact.as_ref(),
            RunOutcome::Aborted { .. } => None,
        }
    }
}

/// The pages to read for `query`. There is no search: it's always the
/// configured `search_url`, whatever the query says.
pub fn resolve_urls(cfg: &WebsumConfig, query: &str) -> Vec<String> {
    if let Err(e) = url::Url::parse(&cfg.search_url) {
        tracing::warn!(url = %cfg.search_url, error = %e, "search_url does not parse as a URL");
    }
    tracing::debug!(query, url = %cfg.search_url, "resolved source url");
    vec![cfg.search_url.clone()]
}

struct Run<'a> {
    cfg: &'a WebsumConfig,
    client: OllamaClient,
    observer: &'a mut dyn Observer,
    stage: Stage,
}

impl<'a> Run<'a> {
    fn advance(&mut self) {
        let next = self.stage.next();
        tracing::debug!(from = %self.stage, to = %next, "pipeline transition");
        self.stage = next;
    }

    fn abort(&mut self) {
        tracing::debug!(from = %self.stage, to = %Stage::Aborted, "pipeline transition");
        self.stage = Stage::Aborted;
    }

    fn execute(mut self, query: &str) -> RunOutcome {
        self.observer.step(&format!("Received query: {}", query));

        self.observer
            .step(&format!("Fetching news from: {}", self.cfg.search_url));
        let urls = resolve_urls(self.cfg, query);
        tracing::info!("Retrieved URLs: {:?}", urls);
        self.advance();

        let pages = fetch::fetch_all(&urls, self.observer);
        self.advance();

        let texts: Vec<CleanedText> = pages
            .iter()
            .map(|page| {
                self.observer.step("Converting HTML to readable text");
                let text = extract::extract(page);
                tracing::info!("Successfully processed content from {}", page.url);
                text
            })
            .collect();
        tracing::info!("Processed {} text(s) from URLs", texts.len());
        self.advance();

        self.observer.step("Generating answer");
        let answer = match synthesize::synthesize(self.cfg, &self.client, query, &texts) {
            Ok(answer) => answer,
            Err(error) => {
                tracing::error!(error = %error, "synthesis failed");
                self.observer
                    .error(&format!("Error calling Ollama API: {}", error));
                self.abort();
                return RunOutcome::Aborted { error };
            }
        };
        self.observer.result(&answer);
        self.advance();

        self.observer.step("Generating title for the content");
        let title = title::title_or_untitled(self.cfg, &self.client, &answer, self.observer);
        self.observer.result(&format!("Generated title: {}", title));
        self.advance();

        let artifact = match storage::save_artifact(self.cfg, &title, &answer) {
            Ok(saved) => {
                self.observer
                    .result(&format!("Content saved to: {}", saved.path.display()));
                Some(saved)
            }
            Err(e) => {
                tracing::error!(error = %e, "could not save artifact");
                self.observer.error(&e.to_string());
                None
            }
        };
        self.advance();

        RunOutcome::Done { answer, artifact }
    }
}

/// Run the whole pipeline for `query`, reporting to `observer`.
///
/// Never panics on network or disk trouble; everything is reported and folded
/// into the returned outcome.
pub fn run(cfg: &WebsumConfig, query: &str, observer: &mut dyn Observer) -> RunOutcome {
    let run = Run {
        cfg,
        client: OllamaClient::from_config(cfg),
        observer,
        stage: Stage::ResolveUrls,
    };
    let outcome = run.execute(query);
    tracing::info!(stage = %outcome.stage(), "run finished");
    outcome
}
