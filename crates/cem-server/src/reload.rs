//! The `/__livereload` WebSocket endpoint, built on
//! `fastwebsockets::upgrade` + `FragmentCollector`.

use std::sync::Arc;
use std::time::Duration;

use fastwebsockets::{FragmentCollector, Frame, OpCode};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::upgrade::Upgraded;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::sync::broadcast;

/// Per-client send buffer depth; a slow client's oldest queued message
/// is dropped rather than stalling the watcher/broadcaster.
pub const CLIENT_BUFFER: usize = 16;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Reload { path: String },
    Ping,
}

/// Broadcasts reload notifications to every connected client and signals
/// shutdown. Cloning is cheap; every part of the server that needs to
/// announce a reload holds a clone.
#[derive(Clone)]
pub struct Broadcaster {
    reload_tx: broadcast::Sender<ReloadMessage>,
    shutdown_tx: Arc<tokio::sync::Notify>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (reload_tx, _) = broadcast::channel(CLIENT_BUFFER);
        Self {
            reload_tx,
            shutdown_tx: Arc::new(tokio::sync::Notify::new()),
        }
    }

    pub fn notify_reload(&self, path: &str) {
        let _ = self.reload_tx.send(ReloadMessage::Reload { path: path.to_string() });
    }

    pub fn shutdown(&self) {
        self.shutdown_tx.notify_waiters();
    }

    fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.reload_tx.subscribe()
    }

    fn shutdown_signal(&self) -> Arc<tokio::sync::Notify> {
        self.shutdown_tx.clone()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub type HandlerOutput = Result<Response<UnsyncBoxBody<bytes::Bytes, std::convert::Infallible>>, anyhow::Error>;

/// Handles an incoming `/__livereload` request: completes the upgrade
/// handshake and spawns the connection's send/receive loop.
pub fn handle_upgrade(mut req: Request<Incoming>, broadcaster: Broadcaster) -> HandlerOutput {
    let (response, upgrade_fut) = fastwebsockets::upgrade::upgrade(&mut req)
        .map_err(|e| anyhow::anyhow!("websocket upgrade failed: {e}"))?;

    tokio::spawn(async move {
        match upgrade_fut.await {
            Ok(ws) => {
                if let Err(e) = serve_connection(ws, broadcaster).await {
                    tracing::warn!(error = %e, "livereload connection ended with an error");
                }
            }
            Err(e) => tracing::warn!(error = %e, "websocket upgrade future failed"),
        }
    });

    let (parts, _) = response.into_parts();
    Ok(Response::from_parts(parts, http_body_util::Empty::new().map_err(|never: std::convert::Infallible| match never {}).boxed_unsync()))
}

async fn serve_connection(ws: fastwebsockets::WebSocket<TokioIo<Upgraded>>, broadcaster: Broadcaster) -> anyhow::Result<()> {
    let mut ws = FragmentCollector::new(ws);
    let mut reload_rx = broadcaster.subscribe();
    let shutdown = broadcaster.shutdown_signal();
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.notified() => {
                let _ = ws.write_frame(Frame::close(1001, b"")).await;
                return Ok(());
            }

            frame = ws.read_frame() => {
                match frame {
                    Ok(frame) if frame.opcode == OpCode::Close => return Ok(()),
                    Ok(_) => {}
                    Err(e) => return Err(anyhow::anyhow!("read_frame failed: {e}")),
                }
            }

            message = reload_rx.recv() => {
                match message {
                    Ok(message) => send_json(&mut ws, &message).await?,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                }
            }

            _ = ping_interval.tick() => {
                send_json(&mut ws, &ReloadMessage::Ping).await?;
            }
        }
    }
}

async fn send_json(
    ws: &mut FragmentCollector<TokioIo<Upgraded>>,
    message: &ReloadMessage,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(message)?;
    ws.write_frame(Frame::text(body.into())).await.map_err(|e| anyhow::anyhow!("write_frame failed: {e}"))?;
    Ok(())
}

pub fn not_found() -> HandlerOutput {
    let body = http_body_util::Full::new(bytes::Bytes::from_static(b"not found"))
        .map_err(|never: std::convert::Infallible| match never {})
        .boxed_unsync();
    Ok(Response::builder().status(StatusCode::NOT_FOUND).body(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_message_serializes_with_tagged_type() {
        let message = ReloadMessage::Reload { path: "/src/a.js".to_string() };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"type":"reload","path":"/src/a.js"}"#);
    }

    #[test]
    fn ping_message_serializes_without_extra_fields() {
        let json = serde_json::to_string(&ReloadMessage::Ping).unwrap();
        assert_eq!(json, r#"{"type":"ping"}"#);
    }
}
