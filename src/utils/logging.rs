//! Tracing subscriber setup

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable read for a log filter directive
pub const LOG_ENV_VAR: &str = "MANACONV_LOG";

/// Default filter for a given `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "manaconv=info,warn",
        _ => "manaconv=debug,info",
    }
}

/// Install the global subscriber.
///
/// `MANACONV_LOG` wins over the verbosity flag. Logs go to stderr unless a
/// log file is given; the interactive preview passes one so log lines do
/// not draw over the screen.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // A subscriber may already exist when running inside tests
    if let Err(err) = installed {
        tracing::debug!("tracing subscriber already installed: {}", err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(default_directive(0), "warn");
        assert!(default_directive(1).contains("info"));
        assert!(default_directive(3).contains("debug"));
    }
}
