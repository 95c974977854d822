use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Logs go to stderr; stdout is reserved for the JSON quote lines.
pub fn init_logging(verbose: bool) {
    let (app_filter, env_filter) = filters(verbose, EnvFilter::try_from_default_env().ok());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(app_filter)
        .with(env_filter)
        .init();
}

/// `RUST_LOG`, when set, is the only filter applied.
fn filters(verbose: bool, from_env: Option<EnvFilter>) -> (Option<Targets>, EnvFilter) {
    if let Some(env_filter) = from_env {
        return (None, env_filter);
    }

    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "warn")
    };
    let app_filter = Targets::new()
        .with_target("ptax", level_filter)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::new(format!("{level},ptax={level_filter}"));
    (Some(app_filter), env_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_rust_log_replaces_crate_targets() {
        let (app_filter, env_filter) = filters(false, Some(EnvFilter::new("ptax=debug")));

        assert!(app_filter.is_none());
        assert_eq!(env_filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_default_caps_crate_at_info() {
        let (app_filter, _) = filters(false, None);
        let app_filter = app_filter.expect("crate targets are set without RUST_LOG");

        assert!(app_filter.would_enable("ptax", &Level::INFO));
        assert!(!app_filter.would_enable("ptax", &Level::DEBUG));
        assert!(!app_filter.would_enable("reqwest", &Level::INFO));
    }

    #[test]
    fn test_verbose_enables_crate_debug() {
        let (app_filter, _) = filters(true, None);
        let app_filter = app_filter.expect("crate targets are set without RUST_LOG");

        assert!(app_filter.would_enable("ptax::fetcher", &Level::DEBUG));
    }
}
