//! One-way "stop now" flag shared between tasks.
//!
//! Backed by a `watch` channel so that both polling loops
//! (`is_triggered()`) and async waits (`triggered().await`) can observe it.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Flips the flag. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is set (immediately if it already is).
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_untriggered() {
        assert!(!Shutdown::new().is_triggered());
    }

    #[test]
    fn test_trigger_is_visible_to_clones() {
        let a = Shutdown::new();
        let b = a.clone();
        a.trigger();
        a.trigger();
        assert!(b.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_after_trigger() {
        let signal = Shutdown::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.triggered().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_when_already_set() {
        let signal = Shutdown::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("already triggered");
    }
}
