//! anistream RPC Server: JSON-RPC over stdin/stdout for a front-end shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"catalog.search", "params":{"query":"bunny"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries responses only.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use anistream::app::App;
use anistream::logging;
use anistream::rpc_handler::handle_method;
use anistream::services::config_engine::ConfigEngine;

use serde_json::{json, Value};

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
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn send(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn serve(app: &Mutex<App>, rt: &tokio::runtime::Runtime) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    send(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let mut rate_limiter = RateLimiter::new(200);

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                send(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            send(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(app, rt, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::debug!(method, error = %err, "rpc call failed");
                json!({"id": id, "error": err})
            }
        };
        send(&mut out, &response)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init(&logging::default_filter());

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    let app = match App::open(ConfigEngine::new(None), None) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise anistream");
            return ExitCode::FAILURE;
        }
    };

    match serve(&app, &rt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "rpc server stopped");
            ExitCode::FAILURE
        }
    }
}
