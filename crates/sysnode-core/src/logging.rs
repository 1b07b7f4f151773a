//! Log output setup
//!
//! Library code only emits `tracing` events. Hosts that want them printed
//! call [`init`] once at start-up.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Returns `false`
/// if a global subscriber was already installed, which leaves it in place.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default().with_ansi(false);
        let _ = init(&config);
        assert!(!init(&config));
    }
}
