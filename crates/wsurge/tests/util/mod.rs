//! In-process WebSocket servers used as load-test targets, plus timing
//! shrunk so the suite never waits on production delays.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use wsurge_common::{RunConfig, TimingConfig};

pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        reconnect_delay_ms: 50,
        read_deadline_ms: 300,
        shutdown_grace_ms: 20,
        stats_interval_ms: 100,
        dial_timeout_ms: 1_000,
    }
}

pub fn run_config(addr: SocketAddr, connections: usize, rate: u32) -> RunConfig {
    RunConfig {
        url: format!("ws://{addr}"),
        connections,
        rate,
        duration_secs: 0,
        verbose: false,
        timing: fast_timing(),
    }
}

/// Accepts every connection and holds it open without sending data. The read
/// side keeps being polled so protocol-level pong replies go out.
pub async fn spawn_silent_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    (addr, accepted)
}

/// Sends `payload` once per accepted connection, then closes with a normal
/// status code and drains until the peer is gone.
pub async fn spawn_close_after_one_server(payload: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                if ws.send(Message::Text(payload.into())).await.is_err() {
                    return;
                }
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "".into(),
                };
                let _ = ws.close(Some(frame)).await;
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    (addr, accepted)
}

/// Reserves a loopback port with no listener behind it, so every dial to the
/// returned address is refused.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Polls `check` until it holds or `deadline` elapses. Panics on expiry so
/// the failing condition names itself in the test output.
pub async fn wait_until<F>(what: &str, deadline: Duration, mut check: F)
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while !check() {
        if start.elapsed() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
