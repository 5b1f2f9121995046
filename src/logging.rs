//! Logging setup and the elapsed-time guard used by lifecycle handlers.
//!
//! Logs go to **stderr** so that stdout stays free for whatever host runs
//! the provider.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter, e.g. `info` or `tencentcloud_wedata_provider=debug`.
//!   Request bodies are only logged at `trace`, since data source
//!   connection properties carry passwords.
//!
//! ```bash
//! RUST_LOG=tencentcloud_wedata_provider=debug ./my-host
//! ```

use std::time::Instant;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber with `RUST_LOG`, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with a custom level used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` when a subscriber was already installed.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

/// Logs how long a lifecycle handler took when dropped.
///
/// ```
/// use tencentcloud_wedata_provider::logging::LogElapsed;
///
/// let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_workflow.read");
/// // handler body; the duration is logged at debug level on return
/// ```
#[derive(Debug)]
pub struct LogElapsed {
    name: String,
    started: Instant,
}

impl LogElapsed {
    /// Start timing `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
        }
    }

    /// Name being timed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Milliseconds since the guard was created.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

impl Drop for LogElapsed {
    fn drop(&mut self) {
        debug!(name = %self.name, elapsed_ms = self.elapsed_ms() as u64, "Elapsed");
    }
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialisation itself is not exercised here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("tencentcloud_wedata_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,tencentcloud_wedata_provider::client=trace").is_ok());
    }

    #[test]
    fn test_log_elapsed_tracks_name() {
        let guard = LogElapsed::new("resource.tencentcloud_wedata_task.create");
        assert_eq!(guard.name(), "resource.tencentcloud_wedata_task.create");
        assert!(guard.elapsed_ms() < 60_000);
    }
}
