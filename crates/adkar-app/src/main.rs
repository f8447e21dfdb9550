//! ADKAR assistant binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Install tracing (stderr, so logs don't interleave with the chat)
//! 3. Build the reply resolver (keyword catalog or remote inference)
//! 4. Build the feedback sink (HTTP endpoint, JSON file, or log)
//! 5. Run the terminal front end on stdin/stdout

mod cli;
mod repl;

use std::sync::Arc;

use clap::Parser;

use adkar_chat::{
    ConversationController, ConversationStore, FeedbackRecorder, FeedbackSink, HttpFeedbackSink,
    JsonFileSink, KeywordResolver, LogSink, RemoteResolver, ReplyCatalog, ReplyResolver,
};
use adkar_core::config::{AdkarConfig, ChatBackend};

use crate::cli::CliArgs;
use crate::repl::Session;

fn build_resolver(config: &AdkarConfig) -> Result<Arc<dyn ReplyResolver>, adkar_chat::ChatError> {
    match config.chat.backend {
        ChatBackend::Keyword => {
            let catalog = match config.chat.catalog_path() {
                Some(path) => ReplyCatalog::load(path)?,
                None => ReplyCatalog::builtin(),
            };
            tracing::info!(rules = catalog.len(), "Keyword resolver ready");
            Ok(Arc::new(KeywordResolver::new(catalog)))
        }
        ChatBackend::Remote => {
            let resolver = RemoteResolver::from_config(&config.inference)?;
            tracing::info!(endpoint = %resolver.endpoint(), "Remote resolver ready");
            Ok(Arc::new(resolver))
        }
    }
}

fn build_sink(config: &AdkarConfig) -> Result<Arc<dyn FeedbackSink>, adkar_chat::ChatError> {
    if let Some(endpoint) = config.feedback.endpoint() {
        tracing::info!(endpoint, "Feedback goes to HTTP endpoint");
        let sink = HttpFeedbackSink::new(endpoint, config.feedback.timeout())?;
        return Ok(Arc::new(sink));
    }
    if let Some(path) = config.feedback.log_path() {
        tracing::info!(path = %path.display(), "Feedback goes to JSON file");
        return Ok(Arc::new(JsonFileSink::new(path)));
    }
    tracing::info!("No feedback sink configured; feedback is logged only");
    Ok(Arc::new(LogSink))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing is installed so the log level can come
    // from the file; load problems are reported once tracing is up.
    let config_file = args.resolve_config_path();
    let loaded = AdkarConfig::load(&config_file);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AdkarConfig::default(),
    };
    args.apply(&mut config);

    // Tracing.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting ADKAR assistant v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) if e.is_not_found() => tracing::info!(
            path = %config_file.display(),
            "No config file. Using defaults."
        ),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config. Using defaults."
        ),
    }

    // Chat core.
    let resolver = build_resolver(&config)?;
    let controller = ConversationController::new(Arc::new(ConversationStore::new()), resolver);
    let recorder = FeedbackRecorder::new(build_sink(&config)?);
    tracing::info!(
        backend = controller.resolver_name(),
        sink = recorder.sink_name(),
        "Conversation ready"
    );

    // Front end.
    let session = Session::new(controller, recorder);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(stdin, tokio::io::stdout()).await?;

    tracing::info!(
        messages = session.controller().state().len(),
        "Session ended"
    );
    Ok(())
}
