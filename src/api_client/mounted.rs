use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Liveness of a view and the requests it starts.
///
/// [`Mounted::unmount`] cancels every request still running under
/// [`Mounted::guard`]; their futures are dropped without producing a result.
#[derive(Clone, Debug, Default)]
pub struct Mounted(CancellationToken);

impl Mounted {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    pub fn is_mounted(&self) -> bool {
        !self.0.is_cancelled()
    }

    pub fn unmount(&self) {
        self.0.cancel();
    }

    /// Runs `future` until it completes or the view unmounts, whichever is first.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.0.cancelled() => None,
            output = future => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn results_after_unmount_are_dropped() {
        let mounted = Mounted::new();
        assert_eq!(mounted.guard(async { 1 }).await, Some(1));

        let view = mounted.clone();
        mounted.unmount();
        assert!(!view.is_mounted());
        assert_eq!(view.guard(async { 2 }).await, None);
    }

    #[tokio::test]
    async fn pending_request_is_abandoned_on_unmount() {
        let mounted = Mounted::new();
        let finished = Arc::new(AtomicBool::new(false));

        let view = mounted.clone();
        let flag = finished.clone();
        let request = tokio::spawn(async move {
            view.guard(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                flag.store(true, Ordering::SeqCst);
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        mounted.unmount();

        let outcome = tokio::time::timeout(Duration::from_secs(1), request)
            .await
            .expect("guard returns promptly after unmount")
            .unwrap();
        assert_eq!(outcome, None);
        assert!(!finished.load(Ordering::SeqCst));
    }
}
