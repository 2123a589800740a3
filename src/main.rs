use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};

use triage_hub::backends::{
    create_reasoning_backend, CalendarClient, NotifierClient, ReasoningBackend, ReasoningConfig,
    ReasoningProvider, Timeslot, TrackerClient,
};
use triage_hub::config::HubConfig;
use triage_hub::error::BackendError;
use triage_hub::pipeline::{Pipeline, PipelineDeps, RawEvent};

/// Tracker stand-in for local runs: reports itself unconfigured so sync
/// attempts surface as recorded failures instead of silent success.
struct UnconfiguredTracker;

#[async_trait]
impl TrackerClient for UnconfiguredTracker {
    async fn create_or_update(
        &self,
        _properties: serde_json::Value,
    ) -> Result<String, BackendError> {
        Err(BackendError::NotConfigured {
            provider: "tracker".into(),
        })
    }
}

/// Proposes a few business-hour slots starting tomorrow.
struct NextDayCalendar;

impl CalendarClient for NextDayCalendar {
    fn propose_times(&self) -> Vec<Timeslot> {
        let base = Utc::now() + Duration::days(1);
        (0..3)
            .map(|i| {
                let start = base + Duration::hours(i);
                Timeslot {
                    start,
                    end: start + Duration::minutes(30),
                }
            })
            .collect()
    }
}

/// Logs persisted records instead of storing them.
struct LogNotifier;

#[async_trait]
impl NotifierClient for LogNotifier {
    async fn persist(&self, record: serde_json::Value) {
        tracing::info!(record = %record, "Notifier persist");
    }
}

/// Build a reasoning backend from an env key, if set.
fn backend_from_env(
    key_var: &str,
    provider: ReasoningProvider,
    model_var: &str,
    default_model: &str,
) -> Option<Arc<dyn ReasoningBackend>> {
    let api_key = std::env::var(key_var).ok()?;
    let model = std::env::var(model_var).unwrap_or_else(|_| default_model.to_string());
    let config = ReasoningConfig {
        provider,
        api_key: secrecy::SecretString::from(api_key),
        model,
    };
    match create_reasoning_backend(&config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            eprintln!("Warning: could not create {key_var} backend: {e}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let primary = backend_from_env(
        "ANTHROPIC_API_KEY",
        ReasoningProvider::Anthropic,
        "TRIAGE_HUB_MODEL",
        "claude-sonnet-4-20250514",
    );
    let secondary = backend_from_env(
        "OPENAI_API_KEY",
        ReasoningProvider::OpenAi,
        "TRIAGE_HUB_FALLBACK_MODEL",
        "gpt-4o",
    );

    eprintln!("🔀 Triage Hub v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Primary backend: {}",
        primary.as_ref().map(|b| b.name()).unwrap_or("none")
    );
    eprintln!(
        "   Secondary backend: {}",
        secondary.as_ref().map(|b| b.name()).unwrap_or("none")
    );
    eprintln!("   Heuristic fallback: always on");
    eprintln!("   Reading events from stdin, one JSON object per line:");
    eprintln!("   {{\"source\": \"email\", \"payload\": {{\"subject\": \"...\"}}}}\n");

    let pipeline = Pipeline::new(
        HubConfig::default(),
        PipelineDeps {
            primary,
            secondary,
            tracker: Arc::new(UnconfiguredTracker),
            calendar: Arc::new(NextDayCalendar),
            notifier: Arc::new(LogNotifier),
        },
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let raw: RawEvent = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Skipping unparseable line: {e}");
                continue;
            }
        };

        match pipeline.run(raw).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(e) => {
                eprintln!("Event rejected: {e}");
            }
        }
    }

    let pending = pipeline.ranked_tasks(10).await;
    if !pending.is_empty() {
        eprintln!("\nTop pending tasks:");
        for task in pending {
            eprintln!("  [u{}] {} ({})", task.urgency, task.title, task.id);
        }
    }

    Ok(())
}
