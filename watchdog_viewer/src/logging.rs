//! Logging and tracing initialization.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Returns whether the subscriber was installed; a second call leaves the first one
/// in place and warns on stderr.
pub fn init_logging(level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install log subscriber: {err}");
        return false;
    }
    true
}
