use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a full filter directive, e.g. `zkrelay_schema=trace`.
pub const LOG_FILTER_ENV: &str = "ZKRELAY_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Build the filter: `ZKRELAY_LOG` wins over `--log-level` when it parses.
fn build_filter(level: LogLevel, env_directive: Option<&str>) -> EnvFilter {
    env_directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_directive()))
}

/// Install the stderr subscriber. Stdout carries reports only.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env_directive = std::env::var(LOG_FILTER_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level, env_directive.as_deref()))
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_directive_is_used_without_env() {
        let filter = build_filter(LogLevel::Warn, None);
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn env_directive_overrides_level() {
        let filter = build_filter(LogLevel::Info, Some("zkrelay_schema=trace"));
        assert_eq!(filter.to_string(), "zkrelay_schema=trace");
    }

    #[test]
    fn unparsable_env_directive_falls_back() {
        let filter = build_filter(LogLevel::Error, Some("zkrelay=loud"));
        assert_eq!(filter.to_string(), "error");
    }
}
