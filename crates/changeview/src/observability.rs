//! Structured logging.
//!
//! Rendered changelogs go to stdout, so logs never do. Every event is written
//! as one JSON object per line to a daily rolling file, or to stderr when no
//! log file can be opened.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Number, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "CHANGEVIEW_LOG_PATH";
const ENV_LOG_DIR: &str = "CHANGEVIEW_LOG_DIR";
const SYSTEM_LOG_DIR: &str = "/var/log";
const LOG_EXTENSION: &str = "jsonl";

/// Where logs should go, before environment overrides.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Service name; names the log file and the platform data directory.
    pub service: String,
    /// Log directory from the configuration file.
    pub log_dir: Option<Utf8PathBuf>,
}

impl LogConfig {
    /// Logging for this binary, with an optional configured directory.
    pub fn new(log_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

/// Keeps the background log writer alive. Drop it last.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Only fails if a global subscriber is already installed. An unusable log
/// location falls back to stderr with a warning.
pub fn init_logging(cfg: &LogConfig, env_filter: EnvFilter) -> Result<LogGuard> {
    let (writer, worker) = match LogTarget::from_env(&cfg.service, cfg.log_dir.as_deref())
        .map(|target| target.writer())
    {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("Warning: {err:#}. Logging to stderr instead.");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonLinesLayer { writer })
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::debug!(service = %cfg.service, "logging initialized");
    Ok(LogGuard { _worker: worker })
}

/// Pick the log filter.
///
/// `--quiet` beats `-v`, which beats `RUST_LOG`, which beats the configured level.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        }
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    }
}

// ============================================================================
// Log target
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: Utf8PathBuf,
    file_name: String,
}

impl LogTarget {
    fn from_env(service: &str, config_dir: Option<&Utf8Path>) -> Result<Self> {
        let path = std::env::var(ENV_LOG_PATH).ok().map(Utf8PathBuf::from);
        let dir = std::env::var(ENV_LOG_DIR).ok().map(Utf8PathBuf::from);
        Self::resolve(service, path, dir, config_dir.map(Utf8Path::to_path_buf))
    }

    /// Explicit file, then env directory, then configured directory, then the
    /// first writable platform candidate.
    fn resolve(
        service: &str,
        path: Option<Utf8PathBuf>,
        dir: Option<Utf8PathBuf>,
        config_dir: Option<Utf8PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = path {
            return Self::at_path(&path);
        }
        if let Some(dir) = dir.or(config_dir) {
            return Self::in_dir(dir, service);
        }

        let candidates = platform_log_dirs(service);
        for dir in candidates {
            if let Ok(target) = Self::in_dir(dir, service) {
                return Ok(target);
            }
        }
        bail!("no writable log directory found")
    }

    fn in_dir(dir: Utf8PathBuf, service: &str) -> Result<Self> {
        let target = Self {
            dir,
            file_name: format!("{service}.{LOG_EXTENSION}"),
        };
        target.probe()?;
        Ok(target)
    }

    fn at_path(path: &Utf8Path) -> Result<Self> {
        let Some(file_name) = path.file_name() else {
            bail!("{ENV_LOG_PATH} must name a file, got {path}");
        };
        let dir = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let target = Self {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        };
        target.probe()?;
        Ok(target)
    }

    #[cfg(test)]
    fn path(&self) -> Utf8PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Create the directory and make sure the file opens for appending.
    fn probe(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create log directory {}", self.dir))?;
        let path = self.dir.join(&self.file_name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {path}"))?;
        Ok(())
    }

    fn writer(&self) -> (NonBlocking, WorkerGuard) {
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&self.dir, &self.file_name))
    }
}

fn platform_log_dirs(service: &str) -> Vec<Utf8PathBuf> {
    let mut dirs = Vec::new();
    if cfg!(unix) {
        dirs.push(Utf8PathBuf::from(SYSTEM_LOG_DIR));
    }
    if let Some(project) = directories::ProjectDirs::from("", "", service)
        && let Ok(data) = Utf8PathBuf::try_from(project.data_local_dir().join("logs"))
    {
        dirs.push(data);
    }
    if let Ok(cwd) = std::env::current_dir()
        && let Ok(cwd) = Utf8PathBuf::try_from(cwd)
    {
        dirs.push(cwd);
    }
    dirs
}

// ============================================================================
// JSON lines layer
// ============================================================================

struct JsonLinesLayer<W> {
    writer: W,
}

/// Fields recorded on a span, stored in its extensions.
struct SpanFields(Map<String, Value>);

impl<S, W> Layer<S> for JsonLinesLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(SpanFields(fields.0));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = FieldMap::default();
        values.record(&mut fields);
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(existing) => existing.0.extend(fields.0),
            None => extensions.insert(SpanFields(fields.0)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let meta = event.metadata();
        let mut line = Map::new();
        line.insert("timestamp".into(), Value::String(rfc3339_now()));
        line.insert("level".into(), Value::String(meta.level().as_str().to_lowercase()));
        line.insert("target".into(), Value::String(meta.target().to_string()));

        for span in ctx.event_scope(event).into_iter().flat_map(|scope| scope.from_root()) {
            if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                line.extend(fields.clone());
            }
        }

        let mut fields = FieldMap::default();
        event.record(&mut fields);
        line.extend(fields.0);

        let mut writer = self.writer.make_writer();
        if serde_json::to_writer(&mut writer, &Value::Object(line)).is_ok() {
            let _ = writer.write_all(b"\n");
        }
    }
}

#[derive(Default)]
struct FieldMap(Map<String, Value>);

impl FieldMap {
    fn put(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldMap {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(number) = Number::from_f64(value) {
            self.put(field, Value::Number(number));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
fn rfc3339_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = elapsed.as_secs();
    let (year, month, day) = civil_date(secs / 86_400);
    let time = secs % 86_400;

    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        time / 3600,
        time % 3600 / 60,
        time % 60,
        elapsed.subsec_millis()
    )
}

/// Proleptic Gregorian date of a day count since 1970-01-01.
const fn civil_date(days: u64) -> (u64, u64, u64) {
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 { month_index + 3 } else { month_index - 9 };
    let year = year_of_era + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(std::env::temp_dir())
            .unwrap()
            .join(name)
    }

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(env_filter(true, 2, "info").to_string(), "error");
    }

    #[test]
    fn verbose_levels() {
        assert_eq!(env_filter(false, 1, "info").to_string(), "debug");
        assert_eq!(env_filter(false, 3, "info").to_string(), "trace");
    }

    #[test]
    fn explicit_path_wins() {
        let dir = temp_dir("changeview-log-path");
        let file = dir.join("custom.jsonl");
        let target = LogTarget::resolve(
            "demo",
            Some(file.clone()),
            Some(temp_dir("changeview-ignored")),
            None,
        )
        .unwrap();
        assert_eq!(target.path(), file);
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let env_dir = temp_dir("changeview-log-env-dir");
        let target = LogTarget::resolve(
            "demo",
            None,
            Some(env_dir.clone()),
            Some(temp_dir("changeview-log-config-dir")),
        )
        .unwrap();
        assert_eq!(target.dir, env_dir);
        assert_eq!(target.file_name, "demo.jsonl");
    }

    #[test]
    fn config_dir_used_without_overrides() {
        let dir = temp_dir("changeview-log-config-only");
        let target = LogTarget::resolve("demo", None, None, Some(dir.clone())).unwrap();
        assert_eq!(target.path(), dir.join("demo.jsonl"));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(LogTarget::at_path(Utf8Path::new("/")).is_err());
    }

    #[test]
    fn timestamp_shape() {
        let ts = rfc3339_now();
        assert_eq!(ts.len(), 24, "{ts}");
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }

    #[test]
    fn civil_date_known_days() {
        assert_eq!(civil_date(0), (1970, 1, 1));
        assert_eq!(civil_date(11_016), (2000, 2, 29));
        assert_eq!(civil_date(20_089), (2025, 1, 1));
    }
}
