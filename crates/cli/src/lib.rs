//! # RAG Chat CLI
//!
//! Chat over uploaded PDF, TXT and DOCX files. Each chat keeps its own
//! in-memory index; answers come from an OpenAI-compatible completion API
//! restricted to the retrieved passages.

pub mod answer;
pub mod completion;
pub mod filenames;
pub mod persistence;
pub mod session;
pub mod titles;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use completion::{models_from_env, ChatCompletionsClient};
use persistence::JsonPersistence;
use ragchat_engine::{ChatKey, RetrievalConfig, RetrievalEngine};
use ragchat_text_chunker::Chunker;
use ragchat_vector_store::{Embedder, EmbeddingModel};
use serde_json::json;
use session::{Flow, Session};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Ask questions about your documents, one chat at a time", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Override embedding model id
    #[arg(long, global = true)]
    embed_model: Option<String>,

    /// Model directory (overrides RAGCHAT_MODEL_DIR)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// TOML file with retrieval settings (relevance_threshold, default_k)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for chats, messages and uploaded files
    #[arg(long, global = true, default_value = ".ragchat")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files into a chat and print the passages relevant to a query
    Retrieve(QueryArgs),

    /// Like retrieve, then answer the query with the completion API
    Ask(AskArgs),

    /// Interactive multi-chat session
    Session,
}

#[derive(Args)]
struct QueryArgs {
    /// Chat id or name
    #[arg(long)]
    chat: String,

    /// Files to ingest before querying (PDF, TXT, DOCX)
    #[arg(long = "file", num_args = 1..)]
    files: Vec<PathBuf>,

    /// Question to retrieve passages for
    #[arg(long)]
    query: String,

    /// Maximum number of passages (defaults to the configured default_k)
    #[arg(long)]
    k: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct AskArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Comma-separated completion models, tried in order
    #[arg(long)]
    models: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Fast,
    Stub,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Stub => "stub",
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(model) = &cli.embed_model {
        env::set_var("RAGCHAT_EMBEDDING_MODEL", model);
    }
    if let Some(dir) = &cli.model_dir {
        env::set_var("RAGCHAT_MODEL_DIR", dir);
    }
    if let Some(mode) = cli.embed_mode {
        env::set_var("RAGCHAT_EMBEDDING_MODE", mode.as_str());
    }

    // JSON commands keep stdout clean for parsing.
    if matches!(cli.command, Commands::Retrieve(_) | Commands::Ask(_)) {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // ORT logs every session detail at info.
    if !cli.verbose {
        builder.filter_module("ort", log::LevelFilter::Off);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = RetrievalConfig::load(cli.config.as_deref())
        .context("Failed to load retrieval config")?;
    let engine = build_engine(config).await?;

    match cli.command {
        Commands::Retrieve(args) => run_retrieve(&engine, args).await?,
        Commands::Ask(args) => run_ask(&engine, args).await?,
        Commands::Session => run_session(engine, &cli.data_dir).await?,
    }

    Ok(())
}

async fn build_engine(config: RetrievalConfig) -> Result<Arc<RetrievalEngine>> {
    let model = tokio::task::spawn_blocking(EmbeddingModel::new)
        .await
        .context("embedding model task panicked")?
        .context("Failed to load embedding model")?;
    log::debug!(
        "Embedding model {} ({} mode, dimension {})",
        model.model_id(),
        if model.is_stub() { "stub" } else { "fast" },
        model.dimension()
    );
    Ok(Arc::new(RetrievalEngine::new(
        Arc::new(model),
        Chunker::default(),
        config,
    )))
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

async fn run_retrieve(engine: &Arc<RetrievalEngine>, args: QueryArgs) -> Result<()> {
    let key: ChatKey = args.chat.parse()?;
    let k = args.k.unwrap_or(engine.config().default_k);
    let report = answer::ingest_blocking(engine, &key, args.files).await?;
    let results = answer::retrieve_blocking(engine, &key, &args.query, k).await?;

    print_json(
        &json!({
            "chat": key,
            "report": report,
            "results": results,
        }),
        args.pretty,
    )
}

async fn run_ask(engine: &Arc<RetrievalEngine>, args: AskArgs) -> Result<()> {
    let query = args.query;
    let key: ChatKey = query.chat.parse()?;
    let k = query.k.unwrap_or(engine.config().default_k);
    let models = args.models.as_deref().map_or_else(models_from_env, |raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
            .collect()
    });

    let client = ChatCompletionsClient::from_env()?;
    let report = answer::ingest_blocking(engine, &key, query.files).await?;
    let answer =
        answer::answer_question(engine, &client, &models, &key, &query.query, k).await?;

    print_json(
        &json!({
            "chat": key,
            "report": report,
            "answer": answer.text,
            "model_called": answer.model_called,
            "passages": answer.passages,
        }),
        query.pretty,
    )
}

async fn run_session(engine: Arc<RetrievalEngine>, data_dir: &Path) -> Result<()> {
    let persistence = JsonPersistence::open(data_dir)
        .with_context(|| format!("Failed to open data dir {}", data_dir.display()))?;
    let client = ChatCompletionsClient::from_env()?;
    let mut session = Session::new(
        engine,
        Arc::new(persistence),
        Arc::new(client),
        models_from_env(),
        std::io::stdout(),
    );
    session.print_help()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if session.handle_line(&line).await? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
