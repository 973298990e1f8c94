//! Unified JSON logging with custom format.
//!
//! Log format:
//! ```json
//! {"ts":"2024-12-28T15:04:05.123Z","level":"info","type":"app","msg":"pool started","ctx":{"service":"workpool"},"data":{"pool":"jobs"}}
//! ```

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{env_opt, env_or, ConfigError};

/// Filter used when neither LOG_LEVEL nor RUST_LOG is set.
const DEFAULT_FILTER: &str = "workpool=info";

/// Subscriber settings read from the environment.
#[derive(Clone, Debug)]
pub struct LogSettings {
    /// `EnvFilter` directive string.
    pub filter: String,
    /// Reported as `ctx.service` on every line.
    pub service_name: String,
}

impl LogSettings {
    /// Read `LOG_LEVEL`, `RUST_LOG` and `SERVICE_NAME`.
    ///
    /// `LOG_LEVEL` (a bare level, applied to this crate) wins over
    /// `RUST_LOG` (full directive syntax).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: resolve_filter(env_opt("LOG_LEVEL"), env_opt("RUST_LOG"))?,
            service_name: env_or("SERVICE_NAME", "workpool"),
        })
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            service_name: "workpool".to_string(),
        }
    }
}

fn resolve_filter(
    log_level: Option<String>,
    rust_log: Option<String>,
) -> Result<String, ConfigError> {
    match (log_level, rust_log) {
        (Some(level), _) => {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    Ok(format!("workpool={}", level))
                }
                _ => Err(ConfigError::UnknownLogLevel(level)),
            }
        }
        (None, Some(directives)) => Ok(directives),
        (None, None) => Ok(DEFAULT_FILTER.to_string()),
    }
}

/// Install the global JSON subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&settings.filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(JsonFormatter::new(&settings.service_name)),
        )
        .try_init()?;

    Ok(())
}

/// Custom JSON formatter for tracing.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, level: &Level, visitor: FieldVisitor, ts: &str) -> serde_json::Value {
        let level_str = match *level {
            Level::TRACE | Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };

        // Panics and failed work are logged at error level
        let log_type = if *level == Level::ERROR { "error" } else { "app" };

        serde_json::json!({
            "ts": ts,
            "level": level_str,
            "type": log_type,
            "msg": visitor.message.unwrap_or_default(),
            "ctx": { "service": &self.service_name },
            "data": visitor.fields,
        })
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let ts = iso8601(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default());
        let entry = self.entry(event.metadata().level(), visitor, &ts);

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&entry).unwrap_or_default()
        )
    }
}

/// Field visitor for collecting tracing fields.
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: HashMap::new(),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value).trim_matches('"').to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }
}

/// Format a time since UNIX_EPOCH as "2024-01-15T10:30:00.123Z".
fn iso8601(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let millis = since_epoch.subsec_millis();

    let day_secs = secs % 86400;
    let hours = day_secs / 3600;
    let minutes = (day_secs % 3600) / 60;
    let seconds = day_secs % 60;

    let mut remaining = secs / 86400;
    let mut year = 1970u64;
    loop {
        let year_days = if is_leap_year(year) { 366 } else { 365 };
        if remaining < year_days {
            break;
        }
        remaining -= year_days;
        year += 1;
    }

    let month_days: [u64; 12] = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1;
    for days_in_month in month_days {
        if remaining < days_in_month {
            break;
        }
        remaining -= days_in_month;
        month += 1;
    }

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        remaining + 1,
        hours,
        minutes,
        seconds,
        millis
    )
}

#[inline]
const fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}
