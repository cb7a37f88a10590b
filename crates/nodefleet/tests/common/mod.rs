//! In-process stand-in for the Compute Engine REST API
//!
//! Serves one request per connection and records every call as
//! `METHOD /path?query`.

use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Default)]
pub struct Behavior {
    /// Instances whose insert is refused with a quota error
    pub reject_insert: HashSet<String>,
    /// Instances that are already gone when deleted
    pub missing: HashSet<String>,
}

#[derive(Default)]
struct State {
    calls: Vec<String>,
    created: Vec<String>,
}

pub struct FakeCompute {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl FakeCompute {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));
        let behavior = Arc::new(behavior);

        let shared = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = shared.clone();
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &behavior, &state).await;
                });
            }
        });

        Self { base_url, state }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    behavior: &Behavior,
    state: &Mutex<State>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut authorized = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "content-length" => content_length = value.parse().unwrap_or(0),
            "authorization" => authorized = value == format!("Bearer {}", TOKEN),
            _ => {}
        }
    }
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = &buf[header_end..];

    let (status, payload) = if authorized {
        let mut state = state.lock().unwrap();
        state.calls.push(format!("{} {}", method, target));
        route(&method, &target, body, behavior, &mut state)
    } else {
        (401, api_error(401, "Request is missing required authentication credential"))
    };

    let payload = payload.to_string();
    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn route(
    method: &str,
    target: &str,
    body: &[u8],
    behavior: &Behavior,
    state: &mut State,
) -> (u16, Value) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("GET", ["projects", project, "global", "images", "family", family]) => (
            200,
            json!({
                "name": format!("{}-v20181004", family),
                "selfLink": format!("https://www.googleapis.com/compute/v1/projects/{}/global/images/{}-v20181004", project, family),
            }),
        ),
        ("POST", ["projects", _, "zones", _, "instances"]) => {
            let request: Value = serde_json::from_slice(body).unwrap_or_default();
            let name = request["name"].as_str().unwrap_or_default().to_string();
            if behavior.reject_insert.contains(&name) {
                return (403, api_error(403, "Quota 'CPUS' exceeded. Limit: 8.0 in region us-east1."));
            }
            state.created.push(name.clone());
            (200, json!({"name": format!("op-insert-{}", name), "status": "PENDING"}))
        }
        ("GET", ["projects", _, "zones", _, "operations", operation]) => {
            (200, json!({"name": operation, "status": "DONE"}))
        }
        ("GET", ["projects", _, "zones", _, "instances"]) => {
            let name = query
                .strip_prefix("filter=name%3D")
                .or_else(|| query.strip_prefix("filter=name="))
                .unwrap_or_default();
            let items: Vec<Value> = state
                .created
                .iter()
                .position(|created| created == name)
                .map(|index| {
                    json!({
                        "name": name,
                        "status": "RUNNING",
                        "networkInterfaces": [{
                            "networkIP": format!("10.0.0.{}", index + 2),
                            "accessConfigs": [{"name": "External NAT", "natIP": format!("1.1.1.{}", index + 1)}],
                        }],
                    })
                })
                .into_iter()
                .collect();
            (200, json!({"items": items}))
        }
        ("DELETE", ["projects", project, "zones", zone, "instances", name]) => {
            if behavior.missing.contains(*name) {
                let message = format!(
                    "The resource 'projects/{}/zones/{}/instances/{}' was not found",
                    project, zone, name
                );
                return (404, api_error(404, &message));
            }
            (200, json!({"name": format!("op-delete-{}", name), "status": "PENDING"}))
        }
        _ => (404, api_error(404, "unknown route")),
    }
}

fn api_error(code: u16, message: &str) -> Value {
    json!({"error": {"code": code, "message": message}})
}
