//! EIP-1193 bridge provider.
//!
//! Talks to a wallet bridge that exposes the injected provider's `request`
//! method as JSON-RPC over HTTP, and optionally forwards its notifications
//! over a WebSocket as `{"event": "chainChanged", "data": "0x..."}` frames.
//!
//! # Responsibilities
//! - Frame JSON-RPC requests and unwrap EIP-1193 error objects
//! - Normalise `net_version` answers to integers
//! - Convert `chainChanged` hex payloads to raw bytes before publishing
//! - Keep the notification stream open for the life of the session,
//!   reconnecting with backoff when the bridge drops it

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;
use uuid::Uuid;

use crate::chain::codec::{hex_to_bytes, parse_chain_id};
use crate::network::AddChainParameters;
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::provider::types::{ProviderError, ProviderEvent, WalletProvider};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, ProviderError> {
        if let Some(error) = self.error {
            return Err(ProviderError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
enum BridgeEvent {
    ChainChanged(String),
    AccountsChanged(Vec<Address>),
}

/// Parse one WebSocket frame from the bridge.
pub fn parse_bridge_event(text: &str) -> Option<ProviderEvent> {
    match serde_json::from_str::<BridgeEvent>(text) {
        Ok(BridgeEvent::ChainChanged(hex)) => match hex_to_bytes(&hex) {
            Ok(bytes) => Some(ProviderEvent::ChainChanged(Bytes::from(bytes))),
            Err(e) => {
                tracing::warn!(payload = %hex, error = %e, "Ignoring malformed chainChanged payload");
                None
            }
        },
        Ok(BridgeEvent::AccountsChanged(accounts)) => Some(ProviderEvent::AccountsChanged(accounts)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unrecognised bridge frame");
            None
        }
    }
}

/// Interpret a `net_version` / `eth_chainId` result.
pub fn parse_network_id(value: &Value) -> Result<u64, ProviderError> {
    match value {
        Value::String(text) => parse_chain_id(text).map_err(|e| ProviderError::Decode(e.to_string())),
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| ProviderError::Decode(format!("network id {} is not a u64", number))),
        other => Err(ProviderError::Decode(format!("unexpected network id {}", other))),
    }
}

/// Provider backed by an HTTP wallet bridge.
#[derive(Clone)]
pub struct BridgeProvider {
    client: reqwest::Client,
    rpc_url: Url,
    events_url: Option<Url>,
    events: broadcast::Sender<ProviderEvent>,
    stream_state: Arc<watch::Sender<EventStreamState>>,
    reconnect: Backoff,
}

/// Reconnect delays for the notification stream.
pub const EVENT_STREAM_BACKOFF: Backoff =
    Backoff::new(Duration::from_millis(250), Duration::from_secs(30));

impl BridgeProvider {
    pub fn new(rpc_url: Url, events_url: Option<Url>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {}", e)))?;
        let (events, _) = broadcast::channel(64);
        let (stream_state, _) = watch::channel(EventStreamState::Idle);
        let stream_state = Arc::new(stream_state);

        tracing::info!(
            rpc_url = %rpc_url,
            events = events_url.is_some(),
            "Wallet bridge configured"
        );

        Ok(Self {
            client,
            rpc_url,
            events_url,
            events,
            stream_state,
            reconnect: EVENT_STREAM_BACKOFF,
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };
        tracing::debug!(method, id = %request.id, "Bridge request");

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("bridge returned HTTP {}", status)));
        }

        let payload: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        payload.into_result()
    }

    /// Current state of the notification stream.
    pub fn event_stream_state(&self) -> watch::Receiver<EventStreamState> {
        self.stream_state.subscribe()
    }

    /// Open the notification stream and forward it to subscribers until
    /// `shutdown` fires.
    ///
    /// Returns `Ok(None)` when no events URL is configured. Fails if the
    /// first connection cannot be made; later drops are reconnected with
    /// backoff.
    pub async fn start_event_listener(
        &self,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<Option<JoinHandle<()>>, ProviderError> {
        let Some(url) = self.events_url.clone() else {
            return Ok(None);
        };

        let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to open bridge event stream");
                self.stream_state.send_replace(EventStreamState::Stopped);
                return Err(ProviderError::Transport(format!(
                    "event stream {}: {}",
                    url, e
                )));
            }
        };
        tracing::info!(url = %url, "Bridge event stream connected");
        self.stream_state.send_replace(EventStreamState::Connected);

        let events = self.events.clone();
        let state = Arc::clone(&self.stream_state);
        Ok(Some(tokio::spawn(run_event_stream(
            url,
            stream,
            events,
            state,
            shutdown,
            self.reconnect,
        ))))
    }

    #[cfg(test)]
    fn with_reconnect(mut self, reconnect: Backoff) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Lifecycle of the bridge notification stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventStreamState {
    /// Not started, or no events URL configured.
    Idle,
    Connected,
    /// Lost; waiting before reconnect `attempt`.
    Reconnecting { attempt: u32 },
    /// Shut down, or the first connection failed.
    Stopped,
}

type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum StreamEnd {
    Shutdown,
    Lost(String),
}

async fn run_event_stream(
    url: Url,
    mut stream: EventStream,
    events: broadcast::Sender<ProviderEvent>,
    state: Arc<watch::Sender<EventStreamState>>,
    mut shutdown: broadcast::Receiver<()>,
    reconnect: Backoff,
) {
    'session: loop {
        let reason = match forward_frames(&mut stream, &events, &mut shutdown).await {
            StreamEnd::Shutdown => break 'session,
            StreamEnd::Lost(reason) => reason,
        };
        tracing::warn!(url = %url, reason = %reason, "Bridge event stream lost");

        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            state.send_replace(EventStreamState::Reconnecting { attempt });
            metrics::record_event_stream_reconnect();

            let delay = reconnect.delay(attempt);
            tokio::select! {
                _ = shutdown.recv() => break 'session,
                _ = tokio::time::sleep(delay) => {}
            }

            match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((reopened, _)) => {
                    tracing::info!(url = %url, attempt, "Bridge event stream reconnected");
                    state.send_replace(EventStreamState::Connected);
                    stream = reopened;
                    continue 'session;
                }
                Err(e) => {
                    tracing::warn!(url = %url, attempt, error = %e, "Bridge event stream reconnect failed");
                }
            }
        }
    }

    tracing::info!("Bridge event stream received shutdown signal");
    state.send_replace(EventStreamState::Stopped);
}

async fn forward_frames(
    stream: &mut EventStream,
    events: &broadcast::Sender<ProviderEvent>,
    shutdown: &mut broadcast::Receiver<()>,
) -> StreamEnd {
    loop {
        tokio::select! {
            _ = shutdown.recv() => return StreamEnd::Shutdown,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = parse_bridge_event(text.as_str()) {
                        let _ = events.send(event);
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return StreamEnd::Lost("closed by bridge".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return StreamEnd::Lost(e.to_string()),
            }
        }
    }
}

impl std::fmt::Debug for BridgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeProvider")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("events_url", &self.events_url.as_ref().map(Url::as_str))
            .finish()
    }
}

#[async_trait]
impl WalletProvider for BridgeProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let result = self.call("eth_requestAccounts", json!([])).await?;
        serde_json::from_value(result).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn network_id(&self) -> Result<u64, ProviderError> {
        let result = self.call("net_version", json!([])).await?;
        parse_network_id(&result)
    }

    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderError> {
        self.call("wallet_addEthereumChain", json!([params])).await?;
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError> {
        let result = self.call("eth_sendTransaction", json!([request])).await?;
        serde_json::from_value(result).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use tokio::net::TcpListener;

    fn bridge_for(addr: std::net::SocketAddr) -> BridgeProvider {
        BridgeProvider::new(
            format!("http://{}", addr).parse().unwrap(),
            Some(format!("ws://{}", addr).parse().unwrap()),
        )
        .unwrap()
        .with_reconnect(Backoff::new(Duration::from_millis(10), Duration::from_millis(50)))
    }

    #[tokio::test]
    async fn test_no_events_url_starts_nothing() {
        let bridge = BridgeProvider::new("http://127.0.0.1:1".parse().unwrap(), None).unwrap();
        let (_tx, rx) = broadcast::channel(1);
        assert!(bridge.start_event_listener(rx).await.unwrap().is_none());
        assert_eq!(*bridge.event_stream_state().borrow(), EventStreamState::Idle);
    }

    #[tokio::test]
    async fn test_unreachable_event_stream_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let bridge = bridge_for(addr);
        let (_tx, rx) = broadcast::channel(1);
        let err = bridge.start_event_listener(rx).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert_eq!(*bridge.event_stream_state().borrow(), EventStreamState::Stopped);
    }

    #[tokio::test]
    async fn test_event_stream_reconnects_after_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (hold_tx, hold_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            // First session: closed by the bridge right away.
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.close(None).await.unwrap();
            drop(ws);

            // Second session: deliver one notification, then stay open.
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Text(
                r#"{"event":"chainChanged","data":"0x2a15c3083"}"#.into(),
            ))
            .await
            .unwrap();
            let _ = hold_rx.await;
        });

        let bridge = bridge_for(addr);
        let mut events = bridge.subscribe();
        let mut states = bridge.event_stream_state();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = bridge.start_event_listener(shutdown_rx).await.unwrap().unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ProviderEvent::ChainChanged(Bytes::from(vec![0x02, 0xa1, 0x5c, 0x30, 0x83]))
        );
        assert_eq!(*states.borrow_and_update(), EventStreamState::Connected);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*states.borrow(), EventStreamState::Stopped);
        let _ = hold_tx.send(());
    }

    #[test]
    fn test_chain_changed_frame_becomes_bytes() {
        let event = parse_bridge_event(r#"{"event":"chainChanged","data":"0x2a15c3083"}"#);
        assert_eq!(
            event,
            Some(ProviderEvent::ChainChanged(Bytes::from(vec![0x02, 0xa1, 0x5c, 0x30, 0x83])))
        );
    }

    #[test]
    fn test_accounts_changed_frame() {
        let event = parse_bridge_event(
            r#"{"event":"accountsChanged","data":["0x00000000000000000000000000000000000000aa"]}"#,
        );
        let expected: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        assert_eq!(event, Some(ProviderEvent::AccountsChanged(vec![expected])));
    }

    #[test]
    fn test_unknown_or_malformed_frames_are_dropped() {
        assert!(parse_bridge_event(r#"{"event":"message","data":{}}"#).is_none());
        assert!(parse_bridge_event(r#"{"event":"chainChanged","data":"0xzz"}"#).is_none());
        assert!(parse_bridge_event("not json").is_none());
    }

    #[test]
    fn test_network_id_forms() {
        assert_eq!(parse_network_id(&json!("11297108099")), Ok(11_297_108_099));
        assert_eq!(parse_network_id(&json!("0x2a15c3083")), Ok(11_297_108_099));
        assert_eq!(parse_network_id(&json!(4)), Ok(4));
        assert!(parse_network_id(&json!(null)).is_err());
    }

    #[test]
    fn test_rpc_error_object_is_surfaced() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": { "code": 4001, "message": "User rejected the request." }
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[test]
    fn test_null_result_is_success() {
        let response: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": "1", "result": null })).unwrap();
        assert_eq!(response.into_result(), Ok(Value::Null));
    }
}
