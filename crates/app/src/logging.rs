//! Tracing subscriber setup for the binary.

use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Parse a level name (`trace` .. `error`, `off`), falling back to `warn`.
///
/// Returns the level and whether the input was accepted.
pub fn level_filter(level: &str) -> (LevelFilter, bool) {
    match level.trim().parse::<LevelFilter>() {
        Ok(filter) => (filter, true),
        Err(_) => (LevelFilter::WARN, false),
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) {
    let (default_level, accepted) = level_filter(level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stderr());

    // Called once from `main`, before anything logs.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(is_terminal),
        )
        .init();

    if !accepted {
        tracing::warn!(level, "unknown log level, using warn");
    }
}
