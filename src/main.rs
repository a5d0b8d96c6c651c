use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use handover::{
    AnthropicClient, AnthropicConfig, CapturedMessage, DocumentationAssembler, FsSessionStore,
    FsTranscriptStore, HttpTranscriptService, InterviewSession, NoTranscriptService, ReportConfig,
    SessionId, SessionStore, Summarizer, SummarizerConfig, TextReportRenderer, TranscriptResolver,
    TranscriptService, save_captured_transcript,
};

#[derive(Parser)]
#[command(name = "handover")]
#[command(author, version, about = "Exit-interview knowledge transfer documentation", long_about = None)]
struct Cli {
    /// Directory holding sessions, transcripts, records and reports
    #[arg(long, global = true, default_value = "interviews")]
    data_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new interview session and print its id
    Start {
        /// Name of the departing employee
        #[arg(long)]
        name: String,

        /// Position the employee held
        #[arg(long)]
        position: String,
    },

    /// Store captured conversation messages as a session transcript
    SaveTranscript {
        #[arg(short, long)]
        session: String,

        /// JSON array of {"role", "content"} messages
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate the documentation record and report for a session
    Generate {
        #[arg(short, long)]
        session: String,

        /// Seconds to wait for the language model before falling back
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Lines per report page
        #[arg(long, default_value = "60")]
        lines_per_page: usize,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Cache transcripts for stored records that have none
    Backfill {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

#[derive(Args)]
struct ServiceArgs {
    /// Base URL of an external transcript service
    #[arg(long)]
    transcript_service_url: Option<String>,

    /// Seconds to wait for the transcript service before skipping it
    #[arg(long, default_value = "10")]
    transcript_service_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Start { name, position } => start_session(&cli.data_dir, name, position).await,
        Commands::SaveTranscript { session, input } => {
            save_transcript(&cli.data_dir, &session, &input).await
        }
        Commands::Generate {
            session,
            timeout_secs,
            lines_per_page,
            service,
        } => {
            generate(
                &cli.data_dir,
                &session,
                Duration::from_secs(timeout_secs),
                lines_per_page,
                &service,
            )
            .await
        }
        Commands::Backfill { service } => backfill(&cli.data_dir, &service).await,
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn transcript_service(args: &ServiceArgs) -> Result<Arc<dyn TranscriptService>> {
    let service: Arc<dyn TranscriptService> = match &args.transcript_service_url {
        Some(url) => Arc::new(HttpTranscriptService::new(
            url.as_str(),
            Duration::from_secs(args.transcript_service_timeout_secs),
        )?),
        None => Arc::new(NoTranscriptService),
    };
    Ok(service)
}

async fn start_session(data_dir: &Path, name: String, position: String) -> Result<()> {
    let sessions = FsSessionStore::new(data_dir);
    let session = InterviewSession::start(name, position);
    sessions.write_session(&session).await?;

    info!(
        "Started interview session {} for {}",
        session.session_id, session.candidate_name
    );
    println!("{}", session.session_id);
    Ok(())
}

async fn save_transcript(data_dir: &Path, session: &str, input: &Path) -> Result<()> {
    let session_id = SessionId::parse(session)?;
    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read file: {:?}", input))?;
    let messages: Vec<CapturedMessage> =
        serde_json::from_str(&content).context("Failed to parse captured messages")?;

    let store = FsTranscriptStore::new(data_dir);
    let text = save_captured_transcript(&store, &session_id, &messages).await?;

    info!(
        "Saved transcript for session {} ({} messages, {} chars) to {:?}",
        session_id,
        messages.len(),
        text.len(),
        store.transcript_path(&session_id)
    );
    Ok(())
}

async fn generate(
    data_dir: &Path,
    session: &str,
    timeout: Duration,
    lines_per_page: usize,
    service: &ServiceArgs,
) -> Result<()> {
    let session_id = SessionId::parse(session)?;
    let sessions = Arc::new(FsSessionStore::new(data_dir));
    let store = Arc::new(FsTranscriptStore::new(data_dir));

    let summarizer_config = SummarizerConfig { timeout };
    let summarizer = match AnthropicConfig::from_env() {
        Ok(config) => Summarizer::new(Arc::new(AnthropicClient::new(config)), summarizer_config),
        Err(e) => {
            warn!("{:#}; summaries will use fallback text", e);
            Summarizer::unconfigured(summarizer_config)
        }
    };

    let renderer = Arc::new(TextReportRenderer::new(
        data_dir,
        ReportConfig {
            lines_per_page,
            ..Default::default()
        },
    ));

    let assembler = DocumentationAssembler::new(
        sessions.clone(),
        store.clone(),
        transcript_service(service)?,
        summarizer,
        renderer,
    );

    let docs = assembler
        .generate(&session_id)
        .await
        .context("Failed to generate documentation")?;

    if let Some(live) = sessions.read_session(&session_id).await? {
        sessions.write_session(&live.completed()).await?;
    }

    info!(
        "Transcript source: {:?}, summary source: {:?}",
        docs.transcript_source, docs.summary_source
    );
    info!("Record written to {:?}", store.record_path(&session_id));
    info!("Report written to {:?}", docs.report_path);
    println!(
        "{} responses documented for {}",
        docs.record.summary.total_responses, docs.record.candidate_name
    );
    Ok(())
}

async fn backfill(data_dir: &Path, service: &ServiceArgs) -> Result<()> {
    let store = Arc::new(FsTranscriptStore::new(data_dir));
    let resolver = TranscriptResolver::new(store, transcript_service(service)?);

    let report = resolver.backfill_transcripts().await?;

    println!(
        "Processed {} sessions, generated {} transcripts",
        report.processed, report.generated
    );
    for (session_id, error) in &report.errors {
        println!("  {}: {}", session_id, error);
    }
    Ok(())
}
