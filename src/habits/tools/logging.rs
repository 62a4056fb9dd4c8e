use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::habits::tools::error::{Result, SyncError};

/// Filter used when neither `RUST_LOG` nor a level is provided.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a stderr fmt subscriber for the whole process.
///
/// `RUST_LOG` takes precedence over `level`. Progress output is written to
/// stdout separately, so logs never interleave with it.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_FILTER)))
        .map_err(|error| SyncError::Logging(error.to_string()))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|error| SyncError::Logging(error.to_string()))
}
