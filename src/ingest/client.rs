//! Client side of the gateway protocol, used by the redirect front end.

use std::net::IpAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::protocol::{Reply, encode_request};
use crate::domain::ingest_event::IngestEvent;

/// Largest reply the client is willing to read.
const MAX_REPLY_LEN: u64 = 1024;

/// Errors returned when notifying the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("gateway connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("gateway did not answer within {0:?}")]
    Timeout(Duration),

    #[error("gateway rejected event: {0}")]
    Rejected(String),

    #[error("malformed gateway reply '{0}'")]
    MalformedReply(String),
}

/// Sends registration and click notifications to the ingestion gateway.
///
/// Opens a fresh connection per event. Callers should send the registration
/// for a short code before the code becomes resolvable, so no click can
/// arrive ahead of its parent.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    addr: String,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Sets the deadline for a whole exchange (connect, send, reply).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Notifies the gateway that `short_code` now points at `destination_url`.
    ///
    /// Returns the id of the destination's parent record.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn notify_registration(
        &self,
        destination_url: &str,
        short_code: &str,
    ) -> Result<u64, ClientError> {
        self.send(&IngestEvent::registration(destination_url, short_code))
            .await
    }

    /// Notifies the gateway that `short_code` was resolved by `source_ip`.
    ///
    /// Returns the id of the stored click record.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn notify_click(
        &self,
        destination_url: &str,
        short_code: &str,
        source_ip: IpAddr,
    ) -> Result<u64, ClientError> {
        self.send(&IngestEvent::click(destination_url, short_code, source_ip))
            .await
    }

    async fn send(&self, event: &IngestEvent) -> Result<u64, ClientError> {
        let exchange = async {
            let mut stream = TcpStream::connect(&self.addr).await?;
            stream.write_all(encode_request(event).as_bytes()).await?;
            stream.shutdown().await?;

            let mut reply = String::new();
            stream.take(MAX_REPLY_LEN).read_to_string(&mut reply).await?;
            Ok::<_, std::io::Error>(reply)
        };

        let reply = timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        match Reply::parse(&reply) {
            Some(Reply::Accepted(id)) => Ok(id),
            Some(Reply::Rejected(reason)) => Err(ClientError::Rejected(reason)),
            None => Err(ClientError::MalformedReply(reply.trim_end().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn fake_gateway(reply: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = String::new();
            stream.read_to_string(&mut request).await.unwrap();
            stream.write_all(reply.as_bytes()).await.unwrap();
            request
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn test_registration_sends_one_line() {
        let (addr, gateway) = fake_gateway("OK 4\n").await;

        let id = GatewayClient::new(addr)
            .notify_registration("http://a.com", "abc123")
            .await
            .unwrap();

        assert_eq!(id, 4);
        assert_eq!(gateway.await.unwrap(), "registration http://a.com abc123\n");
    }

    #[tokio::test]
    async fn test_rejection_is_surfaced() {
        let (addr, _gateway) = fake_gateway("ERR invalid source IP 'x'\n").await;

        let result = GatewayClient::new(addr)
            .notify_click("http://a.com", "abc123", "1.2.3.4".parse().unwrap())
            .await;

        assert!(matches!(result, Err(ClientError::Rejected(reason)) if reason.contains("invalid source IP")));
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let (addr, _gateway) = fake_gateway("WHAT\n").await;

        let result = GatewayClient::new(addr)
            .notify_registration("http://a.com", "abc123")
            .await;

        assert!(matches!(result, Err(ClientError::MalformedReply(reply)) if reply == "WHAT"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = GatewayClient::new(addr)
            .notify_registration("http://a.com", "abc123")
            .await;

        assert!(matches!(result, Err(ClientError::Io(_))));
    }

    #[tokio::test]
    async fn test_silent_gateway_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let _gateway = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let result = GatewayClient::new(addr)
            .with_timeout(Duration::from_millis(100))
            .notify_registration("http://a.com", "abc123")
            .await;

        assert!(matches!(result, Err(ClientError::Timeout(t)) if t == Duration::from_millis(100)));
    }
}
