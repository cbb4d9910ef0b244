//! Tracing setup shared by the binary and the workspace crates.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Targets emitted by the crates of this workspace.
pub const TARGET_PREFIXES: &[&str] = &[
    "hybrid_rag",
    "ai_llm_service",
    "rag_store",
    "web_search",
    "contextor",
    "api",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_own_target(target: &str) -> bool {
    TARGET_PREFIXES.iter().any(|p| target.starts_with(p))
}

/// Formatting layer that renders ONLY events emitted by this workspace.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line`
/// - Span close events (duration of instrumented calls)
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_ours = filter::filter_fn(|meta| is_own_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_ours)
}

/// Level directive for one crate target, e.g. `rag_store=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// `EnvFilter` from `RUST_LOG` (or `default`), with `level` applied to every
/// workspace crate.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    TARGET_PREFIXES
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(base, EnvFilter::add_directive)
}

/// Installs the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(default: &str, level: Level) {
    let _ = tracing_subscriber::registry()
        .with(env_filter_with_level(default, level))
        .with(layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_render_per_crate() {
        let d = level_directive("rag_store", Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "rag_store=debug");
    }

    #[test]
    fn own_targets_are_recognized() {
        assert!(is_own_target("rag_store::vector_index"));
        assert!(is_own_target("contextor"));
        assert!(!is_own_target("hyper::client"));
    }
}
