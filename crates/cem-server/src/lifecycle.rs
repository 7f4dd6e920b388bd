//! Dev Server Core: the process-wide lifecycle state
//! machine and its transitions, built on a plain `hyper` 1.x accept loop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::error::{Result, ServerError};
use crate::options::ServeOptions;
use crate::router;
use crate::state::ServerState;
use crate::status_line::StatusLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Initializing = 1,
    Running = 2,
    ShuttingDown = 3,
    Closed = 4,
}

/// Bounded wait for in-flight connections to drain during shutdown
/// before the server forces a close and reports a warning.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Server {
    phase: AtomicU8,
    state: Arc<ServerState>,
    status: StatusLine,
}

/// `NewServerWithConfig`: validates the target and builds the request
/// pipeline's shared state (the Idle→Initializing transition happens on
/// construction; binding the port happens in [`Server::start`]).
pub fn new_server_with_config(
    options: ServeOptions,
    coordinator: cem_generate::Coordinator,
    generate_options: cem_generate::GenerateOptions,
    manifest: cem_model::Package,
    manifest_path: String,
) -> Server {
    let state = Arc::new(ServerState::new(options, coordinator, generate_options, manifest, manifest_path));
    Server {
        phase: AtomicU8::new(Phase::Initializing as u8),
        state,
        status: StatusLine::new(),
    }
}

impl Server {
    pub fn phase(&self) -> Phase {
        match self.phase.load(Ordering::SeqCst) {
            0 => Phase::Idle,
            1 => Phase::Initializing,
            2 => Phase::Running,
            3 => Phase::ShuttingDown,
            _ => Phase::Closed,
        }
    }

    /// Initializing→Running: binds the port, installs signal handlers,
    /// spawns the watcher and the regeneration debouncer, then serves
    /// connections until a shutdown signal arrives; then
    /// Running→ShuttingDown→Closed.
    pub async fn start(self) -> Result<()> {
        let listener = TcpListener::bind(self.state.options.addr)
            .await
            .map_err(|source| ServerError::Bind { addr: self.state.options.addr, source })?;
        self.phase.store(Phase::Running as u8, Ordering::SeqCst);
        self.status.start(&format!("serving on http://{}", self.state.options.addr));
        tracing::info!(addr = %self.state.options.addr, "dev server listening");

        let ignore = build_ignore_globset(&self.state.options.watch_ignore);
        let (_watcher, changes) = crate::watcher::watch(&self.state.root(), ignore)?;
        let regen_handle = crate::regenerate::spawn(self.state.clone(), changes);

        let shutdown = Arc::new(tokio::sync::Notify::new());
        let signal_handle = spawn_signal_listener(shutdown.clone());

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                accepted = listener.accept() => {
                    let Ok((stream, _)) = accepted else { continue };
                    let io = TokioIo::new(stream);
                    let state = self.state.clone();
                    connections.spawn(async move {
                        let service = hyper::service::service_fn(move |req| {
                            let state = state.clone();
                            async move { router::dispatch(req, state).await }
                        });
                        let conn = hyper::server::conn::http1::Builder::new().serve_connection(io, service).with_upgrades();
                        if let Err(e) = conn.await {
                            tracing::debug!(error = %e, "connection closed with an error");
                        }
                    });
                }
            }
        }

        // Running→ShuttingDown.
        self.phase.store(Phase::ShuttingDown as u8, Ordering::SeqCst);
        self.status.update("shutting down...");
        self.state.broadcaster.shutdown();
        regen_handle.abort();
        signal_handle.abort();

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!("shutdown grace period elapsed; forcing close");
            connections.abort_all();
        }

        // ShuttingDown→Closed.
        self.phase.store(Phase::Closed as u8, Ordering::SeqCst);
        self.status.stop();
        Ok(())
    }
}

fn build_ignore_globset(patterns: &[String]) -> globset::GlobSet {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = globset::Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| globset::GlobSetBuilder::new().build().unwrap())
}

/// Watches for SIGINT/SIGTERM (Unix) and the keyboard `q` quit, and
/// notifies `shutdown` the first time any of them fires.
fn spawn_signal_listener(shutdown: Arc<tokio::sync::Notify>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let mut lines = tokio::io::AsyncBufReadExt::lines(tokio::io::BufReader::new(stdin));

        #[cfg(unix)]
        {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("installing a SIGTERM handler never fails on unix");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
                _ = wait_for_quit(&mut lines) => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = wait_for_quit(&mut lines) => {}
            }
        }

        shutdown.notify_waiters();
    })
}

async fn wait_for_quit<R: tokio::io::AsyncBufRead + Unpin>(lines: &mut tokio::io::Lines<R>) {
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim() == "q" {
            return;
        }
    }
    std::future::pending::<()>().await;
}
