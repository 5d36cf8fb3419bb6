//! TCP ingestion gateway.
//!
//! Accepts one event per connection, forwards it synchronously to the
//! [`EventStore`], replies with a single line and closes the connection.
//! Nothing is buffered or retried: delivery is at-most-once.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::protocol::{MAX_LINE_LEN, ProtocolError, Reply, parse_request};
use crate::application::services::EventStore;
use crate::domain::entities::format_timestamp;
use crate::domain::ingest_event::IngestEvent;
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

/// Reasons a single gateway connection fails to record its event.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("timed out waiting for request")]
    Timeout,

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Accepts gateway connections until the task is aborted.
///
/// Each connection is handled on its own task.
pub async fn run_gateway<R>(listener: TcpListener, store: Arc<EventStore<R>>, read_timeout: Duration)
where
    R: RecordRepository + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let store = store.clone();
                tokio::spawn(async move {
                    handle_connection(stream, &peer.to_string(), &*store, read_timeout).await;
                });
            }
            Err(e) => {
                warn!("Failed to accept gateway connection: {}", e);
            }
        }
    }
}

/// Serves one gateway connection: read a request, apply it, reply, close.
///
/// The request line is read in full, under `read_timeout`, before the store
/// lock is taken, so a stalled sender never holds up other writers.
pub async fn handle_connection<S, R>(
    mut stream: S,
    peer: &str,
    store: &EventStore<R>,
    read_timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
    R: RecordRepository,
{
    debug!(peer, "Gateway connection opened");

    let reply = match process_request(&mut stream, store, read_timeout).await {
        Ok(id) => Reply::Accepted(id),
        Err(e) => {
            match &e {
                GatewayError::Store(_) => error!(peer, "Failed to record event: {}", e),
                _ => warn!(peer, "Rejected gateway request: {}", e),
            }
            Reply::Rejected(e.to_string())
        }
    };

    let written = timeout(read_timeout, async {
        stream.write_all(reply.encode().as_bytes()).await?;
        stream.shutdown().await
    })
    .await;

    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(peer, "Failed to send gateway reply: {}", e),
        Err(_) => debug!(peer, "Timed out sending gateway reply"),
    }

    debug!(peer, "Gateway connection closed");
}

async fn process_request<S, R>(
    stream: &mut S,
    store: &EventStore<R>,
    read_timeout: Duration,
) -> Result<u64, GatewayError>
where
    S: AsyncRead + Unpin,
    R: RecordRepository,
{
    let line = read_request_line(stream, read_timeout).await?;
    let received_at = Local::now();

    let event = parse_request(&line)?;

    Ok(apply_event(store, event, received_at).await?)
}

async fn read_request_line<S>(stream: &mut S, read_timeout: Duration) -> Result<String, GatewayError>
where
    S: AsyncRead + Unpin,
{
    // Room for the longest line plus "\r\n"; anything past that is rejected.
    let limit = (MAX_LINE_LEN + 2) as u64;
    let mut reader = BufReader::new((&mut *stream).take(limit));
    let mut buf = Vec::with_capacity(256);

    timeout(read_timeout, reader.read_until(b'\n', &mut buf))
        .await
        .map_err(|_| GatewayError::Timeout)??;

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    if buf.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong.into());
    }

    String::from_utf8(buf).map_err(|_| ProtocolError::InvalidEncoding.into())
}

/// Forwards a parsed event to the store and returns the affected record id.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot persist the event.
pub async fn apply_event<R: RecordRepository>(
    store: &EventStore<R>,
    event: IngestEvent,
    received_at: DateTime<Local>,
) -> Result<u64, StoreError> {
    match event {
        IngestEvent::Registration {
            destination_url,
            short_code,
        } => {
            let parent = store
                .record_registration(&destination_url, &short_code)
                .await?;
            info!(
                id = parent.id,
                registrations = parent.registration_count,
                code = %short_code,
                "Registration recorded for {}",
                destination_url
            );
            Ok(parent.id)
        }
        IngestEvent::Click {
            destination_url,
            short_code,
            source_ip,
        } => {
            let click = store
                .record_click(
                    &destination_url,
                    &source_ip.to_string(),
                    &format_timestamp(received_at),
                )
                .await?;
            info!(
                id = click.id,
                parent_id = click.parent_id,
                code = %short_code,
                ip = %source_ip,
                "Click recorded for {}",
                destination_url
            );
            Ok(click.id)
        }
    }
}
