//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedder's call. `init_tracing` is the stock setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global `fmt` subscriber.
///
/// Precedence: `RUST_LOG` > `config.level`. Returns false if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()
    };

    match result {
        Ok(()) => {
            tracing::debug!("Tracing initialized (level: {})", config.level);
            true
        }
        Err(e) => {
            tracing::debug!("Tracing already initialized: {}", e);
            false
        }
    }
}

/// Filter from `RUST_LOG`, falling back to the configured level.
///
/// An unparseable configured level falls back to `info`.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_second_init_is_noop() {
        let config = LoggingConfig::default().with_level("warn");
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    #[serial]
    fn test_filter_falls_back_to_config_level() {
        let saved = std::env::var("RUST_LOG").ok();
        std::env::remove_var("RUST_LOG");

        let filter = build_filter(&LoggingConfig::default().with_level("quickfilter=debug"));
        assert!(filter.to_string().contains("quickfilter=debug"));

        if let Some(value) = saved {
            std::env::set_var("RUST_LOG", value);
        }
    }
}
