//! Minimal stderr logger for navigation sessions.
//!
//! Lines look like `[  0.412s  WARN navkit_fiducial::refine] message`. The
//! elapsed time is measured from installation, which is usually the start
//! of the session, so operators can correlate log lines with the workflow.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted by [`init_with_level`] to override the level.
pub const LOG_LEVEL_ENV: &str = "NAVKIT_LOG";

struct SessionLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<SessionLogger> = OnceLock::new();

fn resolve_level(default: LevelFilter, env_value: Option<&str>) -> LevelFilter {
    env_value
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(default)
}

/// Install the session logger.
///
/// `NAVKIT_LOG` (e.g. `debug`) takes precedence over `level` when it parses.
/// Calling this more than once is a no-op after the first successful
/// installation.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let env_value = std::env::var(LOG_LEVEL_ENV).ok();
    let level = resolve_level(level, env_value.as_deref());
    let logger = LOGGER.get_or_init(|| SessionLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Span close events are emitted so the instrumented resolver and frame
/// operations report their durations.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
