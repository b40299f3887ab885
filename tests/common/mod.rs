//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use palm_minter::network::registry::{describe_supported_chain, PALM_TESTNET};
use palm_minter::provider::{InjectedProvider, MockProvider};
use palm_minter::{AppConfig, Dapp};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Contract address used by every test dapp.
#[allow(dead_code)]
pub const CONTRACT: &str = "0xA0931d84d4e242C55C308C9D558588A6a7b84743";

/// Parse a hex address literal.
pub fn address(hex: &str) -> Address {
    hex.parse().unwrap()
}

/// A dapp whose environment starts empty, plus the slot to inject into.
#[allow(dead_code)]
pub fn empty_dapp() -> (Dapp, Arc<InjectedProvider>) {
    let slot = Arc::new(InjectedProvider::empty());
    let dapp = Dapp::new(
        Arc::clone(&slot),
        address(CONTRACT),
        describe_supported_chain(PALM_TESTNET).unwrap(),
    );
    (dapp, slot)
}

/// A dapp wired to `mock`.
#[allow(dead_code)]
pub fn dapp_with(mock: Arc<MockProvider>) -> Dapp {
    let (dapp, slot) = empty_dapp();
    slot.inject(mock);
    dapp
}

/// Poll `check` until it holds or a second passes.
#[allow(dead_code)]
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Start a JSON-RPC backend on an ephemeral port.
///
/// `respond` maps each posted request body to an HTTP status and a JSON
/// response body. Every request body is recorded in the returned log.
#[allow(dead_code)]
pub async fn start_rpc_backend<F>(respond: F) -> (SocketAddr, Arc<Mutex<Vec<Value>>>)
where
    F: Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = Arc::clone(&log);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let respond = Arc::clone(&respond);
            let recorded = Arc::clone(&recorded);
            tokio::spawn(async move {
                let Some(body) = read_request_body(&mut socket).await else {
                    return;
                };
                let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                let (status, reply) = respond(&request);
                recorded.lock().unwrap().push(request);

                let status_text = match status {
                    200 => "200 OK",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let reply = reply.to_string();
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    reply.len(),
                    reply
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, log)
}

#[allow(dead_code)]
async fn read_request_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(buf[header_end..header_end + length].to_vec())
}

/// JSON-RPC success envelope echoing the request id.
#[allow(dead_code)]
pub fn rpc_result(request: &Value, result: Value) -> (u16, Value) {
    (
        200,
        json!({ "jsonrpc": "2.0", "id": request["id"].clone(), "result": result }),
    )
}

/// JSON-RPC error envelope echoing the request id.
#[allow(dead_code)]
pub fn rpc_error(request: &Value, code: i64, message: &str) -> (u16, Value) {
    (
        200,
        json!({
            "jsonrpc": "2.0",
            "id": request["id"].clone(),
            "error": { "code": code, "message": message }
        }),
    )
}

/// A dapp talking to the bridge at `addr` over HTTP.
#[allow(dead_code)]
pub fn bridge_dapp(addr: SocketAddr) -> Dapp {
    let mut config = AppConfig::default();
    config.provider.bridge_url = Some(format!("http://{}", addr));
    Dapp::from_config(&config).unwrap()
}
