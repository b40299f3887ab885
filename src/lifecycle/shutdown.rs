//! Shutdown coordination for background listeners.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Broadcasts a single stop signal to every listener task and waits for
/// them to drain.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            tasks: Vec::new(),
        }
    }

    /// Receiver for a task about to be spawned.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Track a spawned listener so `drain` can wait for it.
    pub fn track(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.push((name, handle));
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signal every listener and wait up to `grace` for each to exit.
    pub async fn drain(self, grace: Duration) {
        let _ = self.tx.send(());
        for (name, mut handle) in self.tasks {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => tracing::debug!(task = name, "Listener stopped"),
                Ok(Err(e)) => tracing::warn!(task = name, error = %e, "Listener ended abnormally"),
                Err(_) => {
                    tracing::warn!(task = name, "Listener did not stop in time, aborting");
                    handle.abort();
                }
            }
        }
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

    #[tokio::test]
    async fn test_drain_stops_listeners() {
        let mut shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.track(
            "waiter",
            tokio::spawn(async move {
                let _ = rx.recv().await;
            }),
        );
        assert_eq!(shutdown.task_count(), 1);
        shutdown.drain(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_drain_aborts_stuck_task() {
        let mut shutdown = Shutdown::new();
        shutdown.track("stuck", tokio::spawn(std::future::pending::<()>()));
        shutdown.drain(Duration::from_millis(10)).await;
    }
}
