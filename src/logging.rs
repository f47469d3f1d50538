// 📜 Logging - tracing subscriber setup for both binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const VERBOSE_FILTER: &str = "equine_eligibility=debug,eligibility_server=debug,tower_http=debug";

/// Pick the filter directive: `--verbose` wins, then `RUST_LOG`, then config.
pub fn resolve_filter(verbose: bool, configured: &str) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    match std::env::var("RUST_LOG") {
        Ok(env) if !env.trim().is_empty() => env,
        _ => configured.to_string(),
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// clean for JSON and CSV. Calling twice is harmless.
pub fn init(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(env_filter(filter))
        .try_init();
}

/// Unparseable directives fall back to `info`.
fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_verbose_overrides_config() {
        assert_eq!(resolve_filter(true, "warn"), VERBOSE_FILTER);
    }

    #[test]
    fn test_env_filter_levels() {
        assert_eq!(env_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter("warn").max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_invalid_filter_falls_back_to_info() {
        assert_eq!(
            env_filter("not a [valid filter").max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
