//! Provider notification pump.

use tokio::sync::broadcast::{self, error::RecvError};

use crate::provider::types::ProviderEvent;

/// Feed provider notifications to `on_event` until shutdown or until the
/// provider drops its sender.
pub async fn pump_events<F>(
    listener: &'static str,
    mut events: broadcast::Receiver<ProviderEvent>,
    mut shutdown: broadcast::Receiver<()>,
    mut on_event: F,
) where
    F: FnMut(ProviderEvent),
{
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!(listener, "Event listener received shutdown signal, exiting loop");
                break;
            }
            received = events.recv() => match received {
                Ok(event) => on_event(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(listener, skipped, "Event listener lagged, notifications dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::info!(listener, "Provider event stream closed");
                    break;
                }
            }
        }
    }
}
