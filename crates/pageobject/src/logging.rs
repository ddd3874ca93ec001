//! Log output for test runs.
//!
//! The library only emits `tracing` events. Test binaries that want to see
//! them call [`init_tracing`] once, typically from a shared fixture.

use tracing_subscriber::EnvFilter;

use crate::result::{PageError, PageResult};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "pageobject=info";

/// Install a fmt subscriber writing to the test writer.
///
/// `RUST_LOG` takes priority over `default_filter`. Calling this more than
/// once is harmless: later calls leave the installed subscriber in place.
pub fn init_tracing(default_filter: &str) -> PageResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| PageError::config(format!("invalid log filter '{default_filter}': {e}")))?,
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_err()
    {
        tracing::trace!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(DEFAULT_FILTER).unwrap();
        init_tracing("pageobject=debug").unwrap();
        tracing::debug!(target: "pageobject", "still logging");
    }
}
