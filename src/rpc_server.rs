//! Leto RPC Server: JSON-RPC over stdin/stdout for host integration.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"state.scrape", "params":{"url":"...","method":"largest-article"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"ready",...} once at startup, {"event":"state_changed"} after
//!           any call that changed the reading state or config.

use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use leto::app::App;
use leto::platform;
use leto::rpc_handler::handle_method;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

async fn send(stdout: &mut Stdout, message: &Value) -> io::Result<()> {
    stdout.write_all(message.to_string().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let data_dir = platform::get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("leto.db");

    let mut app = App::new(db_path.to_str().unwrap_or("leto.db"), None)?;
    app.startup()?;
    info!(db = %db_path.display(), "RPC server ready");

    let mut stdout = io::stdout();
    send(&mut stdout, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).await?;
    app.orchestrator.site().take_state_changed();

    // Max 200 RPC requests per second.
    let mut rate_limiter = RateLimiter::new(200);

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() { continue; }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                send(&mut stdout, &json!({"id":null,"error":format!("parse error: {}",e)})).await?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            send(&mut stdout, &json!({"id": id, "error": "rate limit exceeded"})).await?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&mut app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                warn!(method, error = %err, "RPC call failed");
                json!({"id": id, "error": err})
            }
        };
        send(&mut stdout, &response).await?;

        if app.orchestrator.site().take_state_changed() {
            send(&mut stdout, &json!({"event":"state_changed"})).await?;
        }
    }

    if let Err(e) = app.shutdown() {
        error!(error = %e, "Failed to store progress on shutdown");
    }
    Ok(())
}
