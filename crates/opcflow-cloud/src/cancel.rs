//! Cancellation signal for in-progress lifecycle operations

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stand-in deadline for durations that would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `from + duration`, saturating to a far-future instant instead of
/// overflowing.
pub(crate) fn deadline_after(from: Instant, duration: Duration) -> Instant {
    from.checked_add(duration)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// Sender side; cancel every [`Cancellation`] cloned from its pair.
#[derive(Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Receiver side, checked at every suspension point.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

/// Returned by a wait that was interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Cancellation {
    /// A linked handle/cancellation pair.
    pub fn pair() -> (CancelHandle, Cancellation) {
        let token = CancellationToken::new();
        (
            CancelHandle {
                token: token.clone(),
            },
            Cancellation { token },
        )
    }

    /// A cancellation that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.sleep_until(deadline_after(Instant::now(), duration))
            .await
    }

    pub async fn sleep_until(&self, deadline: Instant) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep_until(deadline) => Ok(()),
        }
    }
}

/// Follow a token owned by the embedding application.
impl From<CancellationToken> for Cancellation {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
