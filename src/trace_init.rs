use std::io;
use std::path::{Path, PathBuf};
#[cfg(feature = "trace")]
use std::sync::Once;

/// File written inside the trace directory.
pub const TRACE_FILE: &str = "kanatype-trace.jsonl";

/// Environment variable holding an `EnvFilter` directive.
pub const FILTER_ENV: &str = "KANATYPE_LOG";

const DEFAULT_FILTER: &str = "kanatype_engine=debug";

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// Filter directive to use: the environment's if set and non-blank,
/// otherwise engine debug output only.
pub fn filter_directive(env: Option<&str>) -> &str {
    match env.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive,
        _ => DEFAULT_FILTER,
    }
}

/// Install a JSON subscriber writing session and prediction events to
/// `log_dir/kanatype-trace.jsonl`, creating the directory if needed.
///
/// Returns the trace file path, or `None` when built without the `trace`
/// feature. Only the first call installs a subscriber.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) -> io::Result<Option<PathBuf>> {
    std::fs::create_dir_all(log_dir)?;
    INIT.call_once(|| {
        let file_appender = tracing_appender::rolling::never(log_dir, TRACE_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard); // flush on every write until exit

        let env = std::env::var(FILTER_ENV).ok();
        let filter = tracing_subscriber::EnvFilter::try_new(filter_directive(env.as_deref()))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::fmt()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .with_env_filter(filter)
            .init();
    });
    Ok(Some(log_dir.join(TRACE_FILE)))
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) -> io::Result<Option<PathBuf>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_defaults() {
        assert_eq!(filter_directive(None), "kanatype_engine=debug");
        assert_eq!(filter_directive(Some("")), "kanatype_engine=debug");
        assert_eq!(filter_directive(Some("  ")), "kanatype_engine=debug");
    }

    #[test]
    fn test_filter_directive_from_env() {
        assert_eq!(
            filter_directive(Some(" kanatype_engine::session=trace ")),
            "kanatype_engine::session=trace"
        );
    }

    #[cfg(not(feature = "trace"))]
    #[test]
    fn test_init_without_feature_writes_nothing() {
        let dir = std::env::temp_dir().join("kanatype-trace-disabled");
        assert_eq!(init_tracing(&dir).unwrap(), None);
    }
}
