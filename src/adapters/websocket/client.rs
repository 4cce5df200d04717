//! Per-connection read and write loops.
//!
//! Each upgraded socket is split in two. The reader decodes frames and hands
//! them to the [`EventRouter`]; the writer drains the client's outbound
//! queue and keeps the connection alive with pings.
//!
//! ```text
//!   socket ──▶ read_loop ──▶ EventRouter
//!   socket ◀── write_loop ◀── outbound queue ◀── Hub
//! ```
//!
//! Whichever loop ends first triggers the unregister, always after the
//! reader has stopped.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::domain::foundation::ClientId;
use crate::domain::realtime::{Event, Frame};

use super::hub::HubHandle;
use super::router::{ConnectionInfo, EventRouter};

/// Tunables shared by every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// How long the reader waits for a pong before giving up.
    pub pong_wait: Duration,
    /// Capacity of each client's outbound queue.
    pub queue_capacity: usize,
    /// Largest inbound message accepted by the transport.
    pub max_message_bytes: usize,
}

impl ConnectionSettings {
    /// Pings go out at 9/10 of the pong wait, so a healthy peer always
    /// answers before the read deadline.
    pub fn ping_interval(&self) -> Duration {
        self.pong_wait * 9 / 10
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            pong_wait: Duration::from_secs(10),
            queue_capacity: 4096,
            max_message_bytes: 4096,
        }
    }
}

/// Drive one upgraded socket until either side gives up.
pub async fn serve_connection(
    socket: WebSocket,
    conn: ConnectionInfo,
    hub: HubHandle,
    router: EventRouter,
    settings: ConnectionSettings,
) {
    let (sink, stream) = socket.split();
    drive_connection(sink, stream, conn, hub, router, settings).await;
}

/// Register the client, run both loops, and unregister once neither loop
/// can touch the client again.
///
/// The reader is always stopped before the unregister goes out, so a visit
/// it starts is live by the time the hub archives the client's visit.
pub async fn drive_connection<Si, St, E>(
    sink: Si,
    stream: St,
    conn: ConnectionInfo,
    hub: HubHandle,
    router: EventRouter,
    settings: ConnectionSettings,
) where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display,
    St: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let client_id = conn.client_id;
    let (outbound_tx, outbound_rx) = mpsc::channel(settings.queue_capacity);

    hub.register(client_id, outbound_tx);
    tracing::info!(client_id = %client_id, ip = %conn.ip, "Client connected");

    let mut write_task = tokio::spawn(write_loop(
        sink,
        client_id,
        outbound_rx,
        settings.ping_interval(),
    ));
    let mut read_task = tokio::spawn(read_loop(stream, conn, router, settings.pong_wait));

    tokio::select! {
        _ = &mut read_task => {
            hub.unregister(client_id);
            // The writer sends its close frame once the hub drops the queue.
            let _ = write_task.await;
        }
        _ = &mut write_task => {
            read_task.abort();
            let _ = read_task.await;
            hub.unregister(client_id);
        }
    }

    tracing::info!(client_id = %client_id, "Client disconnected");
}

/// Read frames until the peer goes away or misses its heartbeat.
///
/// The deadline moves forward only when a pong arrives. A frame that is not
/// valid JSON ends the connection; a frame the router rejects does not.
pub async fn read_loop<S, E>(
    mut stream: S,
    conn: ConnectionInfo,
    router: EventRouter,
    pong_wait: Duration,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let client_id = conn.client_id;
    let mut deadline = Instant::now() + pong_wait;

    loop {
        let message = match tokio::time::timeout_at(deadline, stream.next()).await {
            Err(_) => {
                tracing::debug!(client_id = %client_id, "Read deadline exceeded");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(client_id = %client_id, error = %e, "Receive error");
                break;
            }
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => {
                let frame = match Frame::decode(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(client_id = %client_id, error = %e, "Undecodable frame, closing connection");
                        break;
                    }
                };
                if let Err(e) = router.dispatch_frame(&conn, frame).await {
                    tracing::warn!(client_id = %client_id, error = %e, "Event rejected");
                }
            }
            Message::Binary(_) => {
                tracing::warn!(client_id = %client_id, "Received unsupported binary message");
            }
            Message::Pong(_) => {
                deadline = Instant::now() + pong_wait;
            }
            // Answered by the transport.
            Message::Ping(_) => {}
            Message::Close(_) => {
                tracing::debug!(client_id = %client_id, "Client sent close frame");
                break;
            }
        }
    }
}

/// Send queued events and periodic pings.
///
/// Returns after a send fails, or after the queue closes and a close frame
/// has been attempted.
pub async fn write_loop<S>(
    mut sink: S,
    client_id: ClientId,
    mut outbound: mpsc::Receiver<Event>,
    ping_interval: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);

    loop {
        tokio::select! {
            next = outbound.recv() => {
                let Some(event) = next else {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };
                let text = match event.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(client_id = %client_id, error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::debug!(client_id = %client_id, error = %e, "Send error, closing connection");
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    tracing::debug!(client_id = %client_id, error = %e, "Ping failed, closing connection");
                    break;
                }
            }
        }
    }
}
