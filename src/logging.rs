//! Logging setup for test binaries.
//!
//! Traversal detail is emitted as `tracing` events (`trace` for skipped and
//! aliased fields, `debug` for allocations, `warn` for re-entrant borrows);
//! user-facing events go through `log`. The subscriber installed here
//! captures both and writes through the test harness so output stays with the
//! test that produced it.

use once_cell::sync::OnceCell;
use tracing::Level;

/// Environment variable holding the maximum level (`trace`, `debug`, ...).
pub const LOG_LEVEL_ENV_VAR: &str = "FIXTURE_GRAPH_LOG";

static INIT: OnceCell<()> = OnceCell::new();

/// Install a test-writer subscriber once per process. Later calls, and calls
/// made after another subscriber was installed, are no-ops.
pub fn init_test_logging() {
    INIT.get_or_init(|| {
        let level = std::env::var(LOG_LEVEL_ENV_VAR)
            .ok()
            .and_then(|value| value.parse::<Level>().ok())
            .unwrap_or(Level::INFO);

        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(level)
            .try_init();
    });
}
