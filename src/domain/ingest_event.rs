//! Inbound event model emitted by the redirect front end.

use std::net::IpAddr;

/// Wire name of [`IngestEvent::Registration`].
pub const REGISTRATION: &str = "registration";
/// Wire name of [`IngestEvent::Click`].
pub const CLICK: &str = "click";

/// A notification received by the ingestion gateway.
///
/// The front end sends a `Registration` after storing a new short code and
/// a `Click` after resolving one. Click timestamps are not part of the event;
/// the gateway stamps them at receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    Registration {
        destination_url: String,
        short_code: String,
    },
    Click {
        destination_url: String,
        short_code: String,
        source_ip: IpAddr,
    },
}

impl IngestEvent {
    pub fn registration(destination_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self::Registration {
            destination_url: destination_url.into(),
            short_code: short_code.into(),
        }
    }

    pub fn click(
        destination_url: impl Into<String>,
        short_code: impl Into<String>,
        source_ip: IpAddr,
    ) -> Self {
        Self::Click {
            destination_url: destination_url.into(),
            short_code: short_code.into(),
            source_ip,
        }
    }

    /// Discriminator used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registration { .. } => REGISTRATION,
            Self::Click { .. } => CLICK,
        }
    }

    pub fn destination_url(&self) -> &str {
        match self {
            Self::Registration {
                destination_url, ..
            }
            | Self::Click {
                destination_url, ..
            } => destination_url,
        }
    }

    pub fn short_code(&self) -> &str {
        match self {
            Self::Registration { short_code, .. } | Self::Click { short_code, .. } => short_code,
        }
    }
}
