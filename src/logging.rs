//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "CODELENS_LOG";

/// Filter directive for a `-v` count, falling back to the configured level.
pub fn level_for(verbosity: u8, config_level: &str) -> String {
    match verbosity {
        0 => config_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn filter(verbosity: u8, config_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity, config_level)))
}

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init(verbosity: u8, config_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity, config_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0, "warn"), "warn");
        assert_eq!(level_for(1, "warn"), "debug");
        assert_eq!(level_for(3, "info"), "trace");
    }

    #[test]
    fn test_init_twice() {
        init(0, "info");
        init(2, "info");
    }
}
