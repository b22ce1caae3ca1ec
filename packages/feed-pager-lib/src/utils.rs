use crate::config::PagerConfig;
use anyhow::{anyhow, Context};
use std::{env, future::Future, str::FromStr};
use tokio::time::{sleep, Duration};
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Strip the `$` or `${ }` wrapping from an environment variable reference.
///
/// Returns `None` for `${FOO` and other unterminated references.
pub fn trim_opt_env_key(key: &str) -> Option<&str> {
    match key.strip_prefix("${") {
        Some(braced) => braced.strip_suffix('}'),
        None => key.strip_prefix('$'),
    }
}

/// Determine whether a given key is a well-formed environment variable reference.
pub fn is_opt_env_var(k: &str) -> bool {
    trim_opt_env_key(k).is_some_and(|name| !name.is_empty())
}

/// Retry an async operation with exponential backoff.
///
/// `op` is invoked once, then up to `retries` more times while it fails with an
/// error `should_retry` accepts, doubling the delay between attempts. Any other
/// error, or the last one, is returned as is.
pub async fn attempt_with_backoff<F, Fut, T, E, R>(
    retries: usize,
    initial_delay_ms: u64,
    mut op: F,
    should_retry: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut remaining_retries = retries;
    let mut delay = initial_delay_ms;
    loop {
        match op().await {
            Ok(t) => break Ok(t),
            Err(e) => {
                if remaining_retries > 0 && should_retry(&e) {
                    warn!("Attempt failed: {e}. Retrying in {delay}ms...");
                    remaining_retries -= 1;
                    sleep(Duration::from_millis(delay)).await;
                    delay = delay.saturating_mul(2);
                } else {
                    break Err(e);
                }
            }
        }
    }
}

/// Initialize the logging context for a pager host.
///
/// `RUST_LOG` takes precedence over the configured log level. Output is
/// human-readable unless `HUMAN_LOGGING=false`, in which case JSON lines are emitted.
pub fn init_logging(config: &PagerConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());
    let directives = if config.verbose {
        format!("{level},feed_pager=debug")
    } else {
        level
    };

    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter `{directives}`"))?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(s) => bool::from_str(&s).with_context(|| {
            format!("Expected `true` or `false` to be provided for `{HUMAN_LOGGING}`")
        })?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let res = if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
    };

    res.map_err(|e| anyhow!(e).context("Failed to initialize logging"))
}
