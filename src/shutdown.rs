use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcasts process teardown to long-running event handlers.
///
/// ```no_run
/// use cnc_intake::shutdown::ShutdownCoordinator;
///
/// # async fn example() {
/// let coordinator = ShutdownCoordinator::new();
/// let mut shutdown_rx = coordinator.subscribe();
///
/// tokio::spawn(async move {
///     let _ = shutdown_rx.recv().await;
///     // stop handling events
/// });
///
/// coordinator.shutdown();
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(10);
        Self {
            shutdown_tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receiver that yields once shutdown is initiated
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every subscriber. Repeated calls are harmless.
    pub fn shutdown(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let _ = self.shutdown_tx.send(());
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn has_subscribers(&self) -> bool {
        self.shutdown_tx.receiver_count() > 0
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_shutdown_signal() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        let task = tokio::spawn(async move {
            rx.recv().await.ok();
            "shutdown received"
        });

        coordinator.shutdown();

        let result = timeout(Duration::from_millis(100), task).await;
        assert_eq!(result.unwrap().unwrap(), "shutdown received");
        assert!(coordinator.is_shutdown());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx1 = coordinator.subscribe();
        let mut rx2 = coordinator.subscribe();

        assert!(coordinator.has_subscribers());

        coordinator.shutdown();

        assert!(timeout(Duration::from_millis(100), rx1.recv()).await.is_ok());
        assert!(timeout(Duration::from_millis(100), rx2.recv()).await.is_ok());
    }

    #[test]
    fn test_repeated_shutdown_sends_once() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        coordinator.clone().shutdown();
        coordinator.shutdown();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
