use crate::cli::LogFormat;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for the given verbosity; `RUST_LOG` takes precedence
fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber
///
/// JSON lines go to stdout so the calling build can parse them; text goes
/// to stderr. A second call is a no-op.
pub fn init_logging(format: LogFormat, debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let result = match format {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(std::io::stdout)
                .with_target(false);
            tracing_subscriber::registry().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false);
            tracing_subscriber::registry().with(filter).with(stderr_layer).try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Logging was already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogFormat::Text, false);
        init_logging(LogFormat::Json, true);
    }
}
