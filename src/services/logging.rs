//! Logging setup and an in-memory buffer of recent log events.
//!
//! [init_tracing] installs the process-wide subscriber (env filter + fmt output).
//! [RecentLogs] keeps the last few events at or above a level so a host can
//! surface indexer failures without scraping stdout.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// How many events [RecentLogs] keeps
    pub recent_capacity: usize,
    /// Least severe level kept by [RecentLogs]
    pub recent_min_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "kat_indexer=debug".to_string(),
            json: false,
            recent_capacity: 200,
            recent_min_level: Level::WARN,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns the recent-events buffer wired into it.
pub fn init_tracing(config: &LoggingConfig) -> Result<RecentLogs> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));
    let recent = RecentLogs::new(config.recent_capacity);

    tracing_subscriber::registry()
        .with(filter)
        .with(config.json.then(|| fmt::layer().json()))
        .with((!config.json).then(|| fmt::layer()))
        .with(recent.layer(config.recent_min_level))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(recent)
}

/// A captured log event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    pub fields: Map<String, JsonValue>,
}

/// Bounded buffer of recent log events, shared between the layer and readers
#[derive(Debug, Clone)]
pub struct RecentLogs {
    events: Arc<Mutex<VecDeque<LogEvent>>>,
    capacity: usize,
}

impl RecentLogs {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Layer that records events at `min_level` or more severe into this buffer
    pub fn layer(&self, min_level: Level) -> RecentLogsLayer {
        RecentLogsLayer {
            logs: self.clone(),
            min_level,
        }
    }

    /// Standalone subscriber feeding only this buffer, for scoped capture
    pub fn subscriber(&self, min_level: Level) -> impl Subscriber + Send + Sync + 'static {
        Registry::default().with(self.layer(min_level))
    }

    fn push(&self, event: LogEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// All buffered events, oldest first
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Buffered events with exactly this level
    pub fn at_level(&self, level: Level) -> Vec<LogEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level.as_str())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Tracing layer backing [RecentLogs]
#[derive(Debug, Clone)]
pub struct RecentLogsLayer {
    logs: RecentLogs,
    min_level: Level,
}

impl<S> Layer<S> for RecentLogsLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.logs.push(LogEvent {
            timestamp: Utc::now(),
            level: metadata.level().as_str().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, JsonValue>,
    message: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.fields
                .insert(field.name().to_string(), JsonValue::String(value_str));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                JsonValue::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Bool(value));
    }
}
