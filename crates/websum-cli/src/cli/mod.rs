//! CLI for websum: `websum <query words...>`.

mod console;

use anyhow::Result;
use clap::Parser;
use websum_core::config;
use websum_core::observer::Observer;
use websum_core::pipeline;

pub use console::ConsoleObserver;

/// Answer a question from a web page using a local Ollama model.
#[derive(Debug, Parser)]
#[command(name = "websum", version)]
#[command(about = "Fetch a page, summarize it with Ollama, save the answer", long_about = None)]
pub struct Cli {
    /// The question; all words are joined with single spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "QUERY")]
    pub query: Vec<String>,
}

impl Cli {
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }

    /// Parse arguments, load config, run the pipeline once.
    ///
    /// Only a config problem is an `Err`; pipeline failures are reported on
    /// the console and the process still exits normally.
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::info!("Configuration loaded");
        tracing::debug!("loaded config: {:?}", cfg);

        let query = cli.query_string();
        let mut console = ConsoleObserver::new();
        let outcome = pipeline::run(&cfg, &query, &mut console);
        tracing::debug!(stage = %outcome.stage(), "pipeline outcome");
        console.step("Query answering process completed");
        Ok(())
    }
}
