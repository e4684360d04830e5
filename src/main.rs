use std::io::{BufWriter, Write, stderr, stdout};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use expense_sync::config::AppConfig;
use expense_sync::events::{EventNotifier, LogNotifier, WebhookNotifier};
use expense_sync::extract::GeminiExtractor;
use expense_sync::mail::{GmailMailSource, GoogleCredentials};
use expense_sync::store::{FileTableClient, TableLedgerStore};
use expense_sync::sync::{SyncEngine, SyncOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: expense-sync [user_id] [log_level:optional]");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let user_id = &args[1];
    let log_level = args.get(2)
        .map(|s| parse_log_level(s)).unwrap_or(LevelFilter::ERROR);

    setup_logging(log_level);

    let config = AppConfig::from_env()?;
    let http = reqwest::Client::new();

    let credentials = load_credentials(&config).await?;
    let mail = Arc::new(
        GmailMailSource::connect(http.clone(), credentials, config.gmail_label_id.clone(), config.gmail_max_results).await?
    );
    let extractor = Arc::new(GeminiExtractor::new(
        http.clone(),
        config.gemini_api_key.clone(),
        Some(config.gemini_model.clone())
    ));

    let notifier: Arc<dyn EventNotifier> = match &config.event_topic_url {
        Some(topic_url) => Arc::new(WebhookNotifier::new(http.clone(), topic_url.clone())),
        None => Arc::new(LogNotifier)
    };

    let client = Arc::new(FileTableClient::open(&config.ledger_file).await?);
    let store = Arc::new(TableLedgerStore::new(client, notifier));
    let engine = SyncEngine::new(store, mail, extractor)
        .with_call_timeout(config.call_timeout);

    let timer = Instant::now();
    let outcome = engine.sync(user_id).await?;
    let duration = timer.elapsed();

    info!("Completed sync pass in: {duration:?}");

    write_outcome_to_stdout(&outcome)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Results go to stdout, so logging has to stay on stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

async fn load_credentials(config: &AppConfig) -> Result<GoogleCredentials> {
    let bytes = tokio::fs::read(&config.credentials_file)
        .await
        .with_context(|| format!("failed to read credentials file {}", config.credentials_file.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse credentials file {}", config.credentials_file.display()))
}

fn write_outcome_to_stdout(outcome: &SyncOutcome) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    match outcome {
        SyncOutcome::MailUnavailable => {
            serde_json::to_writer(&mut output, &json!({ "message": "No emails found or an error occurred." }))?;
        }
        SyncOutcome::NothingNew => {
            serde_json::to_writer(&mut output, &json!({ "message": "No new transactions to add." }))?;
        }
        SyncOutcome::Created(records) => {
            serde_json::to_writer_pretty(&mut output, records)?;
        }
    }

    writeln!(output)?;
    output.flush()?;

    Ok(())
}
