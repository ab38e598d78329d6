//! Shared utilities for integration testing against a mock Tezos node.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const ADDRESS: &str = "tz1UNer1ijeE9ndjzSszRduR3CzX49hoBUB3";
pub const BRANCH: &str = "BLbfxzLVe4Wu25Wmz3MoDWp8c6HmEwKxfR3MC86FHiK12zNp4WK";
pub const CHAIN_ID: &str = "NetXdQprcVkpaWU";
pub const OP_HASH: &str = "onvsLP3JFZia2mzZKWaFuFkWg2L5p3BDUhzh5Kr6CiDDN3rtQ1D";
pub const TEST_PRIVATE_KEY: &str =
    "0x2d40f077000de9a28592c0370a95af40cd56b6fb15c9b986bba5e0b17a8c77ec";

/// A request as seen by the mock node.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

/// Handle to a running mock node.
#[derive(Clone)]
pub struct MockNode {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn request_to(&self, path: &str) -> Option<MockRequest> {
        self.requests().into_iter().find(|r| r.path == path)
    }
}

/// Start a programmable mock node on an ephemeral port.
///
/// `f` maps each request to a status code and a JSON body.
pub async fn start_programmable_node<F, Fut>(f: F) -> MockNode
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, f, recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode { addr, requests }
}

async fn handle_connection<F, Fut>(
    mut socket: TcpStream,
    f: Arc<F>,
    recorded: Arc<Mutex<Vec<MockRequest>>>,
) where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    recorded.lock().unwrap().push(request.clone());

    let (status, body) = f(request).await;
    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        _ => "200 OK",
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.trim_start_matches('/').to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let body = &buffer[header_end..];
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(body).ok()
    };

    Some(MockRequest { method, path, body })
}

/// Header returned by mainnet at level 3625334.
#[allow(dead_code)]
pub fn header_json() -> String {
    serde_json::json!({
        "protocol": "PtMumbai2TmsJHNGRkD8v8YDbtao7BLUC3wjASn1inAKLFCjaH1",
        "chain_id": CHAIN_ID,
        "hash": "BM9ZS9x59tNxAiZh86NKQNHcFs7WBqNpWuwKszg2mL2pYq3uP83",
        "level": 3625334,
    })
    .to_string()
}

/// One applied simulation result per submitted operation.
#[allow(dead_code)]
pub fn applied_results(body: &Option<Value>, consumed_milligas: &str) -> String {
    let count = body
        .as_ref()
        .and_then(|b| b["operation"]["contents"].as_array())
        .map(Vec::len)
        .unwrap_or(0);

    let contents: Vec<Value> = (0..count)
        .map(|_| {
            serde_json::json!({
                "metadata": {
                    "operation_result": {
                        "status": "applied",
                        "consumed_milligas": consumed_milligas,
                    }
                }
            })
        })
        .collect();
    serde_json::json!({ "contents": contents }).to_string()
}
