use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// One-shot stop broadcast shared by every task in a run.
///
/// Firing is idempotent and safe from any task; once fired, every current and
/// future waiter observes the stopped state without further coordination.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Latches the signal. May be called concurrently with itself.
    pub fn fire(&self) {
        self.token.cancel();
    }

    /// Non-blocking, side-effect-free check.
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired; immediately if it already has.
    pub async fn fired(&self) {
        self.token.cancelled().await;
    }

    /// Fires the signal after `after` elapses. Races harmlessly against a
    /// manual fire; the timer task exits as soon as either side wins.
    pub fn arm_deadline(&self, after: Duration) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => {
                    info!("run duration reached, stopping workers");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        });
    }
}
