use business::domain::logger::Logger;
use tracing::{debug, error, info, warn};

/// Forwards business-layer log lines to `tracing` under a single target,
/// so `RUST_LOG=egg_scanner=debug` selects them.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "egg_scanner", "{}", message);
    }
    fn warn(&self, message: &str) {
        warn!(target: "egg_scanner", "{}", message);
    }
    fn error(&self, message: &str) {
        error!(target: "egg_scanner", "{}", message);
    }
    fn debug(&self, message: &str) {
        debug!(target: "egg_scanner", "{}", message);
    }
}
