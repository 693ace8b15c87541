use std::time::Duration;

use log::trace;
use tokio::{task::JoinHandle, time};

/// Period between heartbeat ticks.
const TICK_PERIOD: Duration = Duration::from_secs(100);

/// A no-op heartbeat that keeps the process visibly busy while the
/// sequential pass awaits the library.
///
/// Owned by the top-level run context and cancelled explicitly on both
/// exit paths (normal completion and termination signal) rather than
/// living as ambient global state.
pub struct KeepAlive {
    handle: JoinHandle<()>,
}

impl KeepAlive {
    pub fn start() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut tick = time::interval(period);
            // the first tick of a fresh interval completes immediately
            tick.tick().await;
            loop {
                tick.tick().await;
                trace!("keep-alive tick");
            }
        });
        Self { handle }
    }

    /// Stops the heartbeat. Idempotent.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}
