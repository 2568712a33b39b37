use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use wsurge_common::RunConfig;

use super::counters::ActiveGuard;
use super::session::Session;

type DialedStream = MaybeTlsStream<TcpStream>;

/// Lifecycle phase of one connection slot, generic over the transport under
/// the WebSocket framing so the read loop can be driven over in-memory
/// streams as well as dialed sockets.
pub enum Phase<S> {
    Connecting,
    Connected(Conn<S>),
    Terminated,
}

/// A live connection owned exclusively by its worker. Dropping it releases
/// both the socket and the active-connection slot.
pub struct Conn<S> {
    stream: WebSocketStream<S>,
    _active: ActiveGuard,
}

impl<S> Conn<S> {
    pub fn new(stream: WebSocketStream<S>, active: ActiveGuard) -> Self {
        Self {
            stream,
            _active: active,
        }
    }
}

/// Checks that `url` parses and carries a WebSocket scheme. Runs before any
/// worker starts; a failure here is the only fatal configuration error.
pub fn validate_url(url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let uri: tokio_tungstenite::tungstenite::http::Uri = url
        .parse()
        .map_err(|e| format!("invalid WebSocket URL {url}: {e}"))?;
    match uri.scheme_str() {
        Some("ws") | Some("wss") => Ok(()),
        _ => Err(format!("invalid WebSocket URL {url}: scheme must be ws or wss").into()),
    }
}

/// Drives one connection slot from first dial to final teardown.
///
/// Never returns an error: dial and read failures are absorbed into the
/// counters and the retry loop, and the slot terminates only once the
/// shutdown signal fires.
pub async fn run_worker(session: Session, cfg: Arc<RunConfig>) {
    let mut phase: Phase<DialedStream> = Phase::Connecting;
    loop {
        phase = match phase {
            Phase::Connecting => connect(&session, &cfg).await,
            Phase::Connected(conn) => read_loop(conn, &session, &cfg).await,
            Phase::Terminated => return,
        };
    }
}

/// Dials the target until it succeeds or shutdown fires. Attempts are
/// unlimited with a fixed delay between them; sustaining load matters more
/// than measuring dial success precisely.
async fn connect(session: &Session, cfg: &RunConfig) -> Phase<DialedStream> {
    loop {
        if session.shutdown.is_fired() {
            debug!("skipping connect attempt, shutdown in progress");
            return Phase::Terminated;
        }

        match timeout(cfg.timing.dial_timeout(), connect_async(cfg.url.as_str())).await {
            Ok(Ok((stream, _response))) => {
                let guard = session.counters.connection_opened();
                return Phase::Connected(Conn {
                    stream,
                    _active: guard,
                });
            }
            Ok(Err(e)) => {
                session.counters.add_failure();
                debug!(error = %e, "connection attempt failed");
            }
            Err(_) => {
                session.counters.add_failure();
                debug!("connection attempt timed out");
            }
        }

        sleep(cfg.timing.reconnect_delay()).await;
    }
}

/// Steady-state read loop. Each iteration checks the shutdown signal, then
/// waits up to the read deadline for one message. Silence is not an error:
/// a deadline expiry triggers a heartbeat ping, and only a failed ping
/// counts against the failure total.
pub async fn read_loop<S>(mut conn: Conn<S>, session: &Session, cfg: &RunConfig) -> Phase<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        if session.shutdown.is_fired() {
            close_gracefully(&mut conn.stream, cfg).await;
            return Phase::Terminated;
        }

        match timeout(cfg.timing.read_deadline(), conn.stream.next()).await {
            Ok(Some(Ok(msg))) => match msg {
                Message::Text(text) => {
                    session.counters.add_bytes(text.len());
                    debug!(payload = %text, "received text message");
                }
                Message::Binary(payload) => {
                    session.counters.add_bytes(payload.len());
                }
                Message::Close(frame) => {
                    if is_expected_close_frame(frame.as_ref()) {
                        debug!("connection closed by peer");
                    } else {
                        debug!(?frame, "connection closed with unexpected status");
                    }
                    return Phase::Connecting;
                }
                Message::Pong(_) => {
                    debug!("received pong");
                }
                // the protocol layer answers pings; raw frames never surface
                Message::Ping(_) | Message::Frame(_) => {}
            },
            Ok(Some(Err(e))) => {
                if is_expected_close_error(&e) {
                    debug!(error = %e, "connection closed");
                } else {
                    debug!(error = %e, "unhandled read error");
                }
                return Phase::Connecting;
            }
            Ok(None) => {
                debug!("stream ended");
                return Phase::Connecting;
            }
            Err(_) => {
                // no data within the deadline: probe liveness
                if let Err(e) = conn.stream.send(Message::Ping(Bytes::new())).await {
                    session.counters.add_failure();
                    debug!(error = %e, "heartbeat ping failed");
                    return Phase::Connecting;
                }
            }
        }
    }
}

/// Best-effort close handshake: send a normal-closure frame, then give the
/// peer a bounded grace period to acknowledge before tearing down.
async fn close_gracefully<S>(stream: &mut WebSocketStream<S>, cfg: &RunConfig)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!("shutdown received, closing connection");
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    };
    let _ = stream.send(Message::Close(Some(frame))).await;
    sleep(cfg.timing.shutdown_grace()).await;
}

/// A close frame counts as expected when the peer signalled a sanctioned
/// termination: normal closure, going away, or no status at all.
pub fn is_expected_close_frame(frame: Option<&CloseFrame>) -> bool {
    match frame {
        None => true,
        Some(f) => matches!(f.code, CloseCode::Normal | CloseCode::Away | CloseCode::Status),
    }
}

/// Read errors that represent an already-completed close handshake rather
/// than a transport fault.
pub fn is_expected_close_error(err: &WsError) -> bool {
    matches!(err, WsError::ConnectionClosed | WsError::AlreadyClosed)
}
