//! Local WebSocket target for exercising wsurge end to end.
//!
//! Accepts every connection, pushes a small payload once a second, and lets
//! the protocol layer answer pings. Run it, then point the load generator at
//! `ws://127.0.0.1:9001`.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9001".to_string());
    let listener = TcpListener::bind(&addr).await?;
    println!("demo target listening on ws://{addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            let ws = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    eprintln!("handshake with {peer} failed: {e}");
                    return;
                }
            };
            let (mut write, mut read) = ws.split();
            let mut ticker = tokio::time::interval(Duration::from_secs(1));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if write.send(Message::Text("tick".into())).await.is_err() {
                            break;
                        }
                    }
                    msg = read.next() => match msg {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        });
    }
}
