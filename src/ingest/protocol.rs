//! Line protocol spoken between the redirect front end and the gateway.
//!
//! Request, one per connection:
//!
//! ```text
//! registration <destination_url> <short_code>
//! click <destination_url> <short_code> <source_ip>
//! ```
//!
//! Reply, one line, after which the gateway closes the connection:
//!
//! ```text
//! OK <record_id>
//! ERR <reason>
//! ```
//!
//! Fields are separated by ASCII whitespace; a trailing `\r\n` or `\n` is
//! optional.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::ingest_event::{CLICK, IngestEvent, REGISTRATION};

/// Longest accepted request line, terminator excluded.
pub const MAX_LINE_LEN: usize = 8 * 1024;

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid short code regex"));

/// Reasons a request line is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty request")]
    Empty,

    #[error("request line exceeds {MAX_LINE_LEN} bytes")]
    LineTooLong,

    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    #[error("unknown event kind '{0}'")]
    UnknownKind(String),

    #[error("'{kind}' expects {expected} fields, got {actual}")]
    FieldCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid destination URL '{0}'")]
    InvalidUrl(String),

    #[error("invalid short code '{0}'")]
    InvalidShortCode(String),

    #[error("invalid source IP '{0}'")]
    InvalidIp(String),
}

/// Parses one request line into an event.
///
/// # Errors
///
/// Returns a [`ProtocolError`] describing the first problem found.
pub fn parse_request(line: &str) -> Result<IngestEvent, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong);
    }

    let mut fields = line.split_ascii_whitespace();
    let kind = fields.next().ok_or(ProtocolError::Empty)?;
    let args: Vec<&str> = fields.collect();

    match kind {
        REGISTRATION => {
            let [url, code] = expect_fields::<2>(REGISTRATION, &args)?;
            Ok(IngestEvent::registration(
                validate_url(url)?,
                validate_short_code(code)?,
            ))
        }
        CLICK => {
            let [url, code, ip] = expect_fields::<3>(CLICK, &args)?;
            Ok(IngestEvent::click(
                validate_url(url)?,
                validate_short_code(code)?,
                ip.parse::<IpAddr>()
                    .map_err(|_| ProtocolError::InvalidIp(ip.to_string()))?,
            ))
        }
        other => Err(ProtocolError::UnknownKind(other.to_string())),
    }
}

/// Encodes an event as a request line, terminator included.
pub fn encode_request(event: &IngestEvent) -> String {
    let mut line = format!(
        "{} {} {}",
        event.kind(),
        event.destination_url(),
        event.short_code()
    );
    if let IngestEvent::Click { source_ip, .. } = event {
        line.push(' ');
        line.push_str(&source_ip.to_string());
    }
    line.push('\n');
    line
}

/// Gateway reply to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Event stored; carries the id of the affected record.
    Accepted(u64),
    /// Event rejected or not stored.
    Rejected(String),
}

impl Reply {
    /// Encodes the reply as a line, terminator included.
    pub fn encode(&self) -> String {
        match self {
            Reply::Accepted(id) => format!("OK {}\n", id),
            Reply::Rejected(reason) => format!("ERR {}\n", reason.replace(['\r', '\n'], " ")),
        }
    }

    /// Parses a reply line. Returns `None` if the line is not a valid reply.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(id) = line.strip_prefix("OK ") {
            return id.trim().parse().ok().map(Reply::Accepted);
        }
        line.strip_prefix("ERR")
            .map(|reason| Reply::Rejected(reason.trim().to_string()))
    }
}

fn expect_fields<'a, const N: usize>(
    kind: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], ProtocolError> {
    <[&str; N]>::try_from(args).map_err(|_| ProtocolError::FieldCount {
        kind,
        expected: N,
        actual: args.len(),
    })
}

fn validate_url(raw: &str) -> Result<&str, ProtocolError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(raw),
        _ => Err(ProtocolError::InvalidUrl(raw.to_string())),
    }
}

fn validate_short_code(code: &str) -> Result<&str, ProtocolError> {
    if SHORT_CODE_REGEX.is_match(code) {
        Ok(code)
    } else {
        Err(ProtocolError::InvalidShortCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration() {
        let event = parse_request("registration http://a.com abc123\n").unwrap();

        assert_eq!(event, IngestEvent::registration("http://a.com", "abc123"));
    }

    #[test]
    fn test_parse_click_with_crlf() {
        let event = parse_request("click https://a.com/x?y=1 abc123 1.2.3.4\r\n").unwrap();

        assert_eq!(
            event,
            IngestEvent::click("https://a.com/x?y=1", "abc123", "1.2.3.4".parse().unwrap())
        );
    }

    #[test]
    fn test_parse_click_ipv6() {
        let event = parse_request("click http://a.com abc ::1").unwrap();

        assert!(matches!(event, IngestEvent::Click { source_ip, .. } if source_ip.is_ipv6()));
    }

    #[test]
    fn test_url_is_kept_verbatim() {
        let event = parse_request("registration HTTP://A.com:80/Path abc").unwrap();

        assert_eq!(event.destination_url(), "HTTP://A.com:80/Path");
    }

    #[test]
    fn test_rejects_empty_line() {
        assert_eq!(parse_request("   \n"), Err(ProtocolError::Empty));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert_eq!(
            parse_request("delete http://a.com abc"),
            Err(ProtocolError::UnknownKind("delete".to_string()))
        );
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert_eq!(
            parse_request("click http://a.com abc"),
            Err(ProtocolError::FieldCount {
                kind: "click",
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            parse_request("registration http://a.com abc extra"),
            Err(ProtocolError::FieldCount { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_fields() {
        assert!(matches!(
            parse_request("registration not-a-url abc"),
            Err(ProtocolError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_request("registration ftp://a.com abc"),
            Err(ProtocolError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_request("registration http://a.com ab/c"),
            Err(ProtocolError::InvalidShortCode(_))
        ));
        assert!(matches!(
            parse_request("click http://a.com abc 999.1.1.1"),
            Err(ProtocolError::InvalidIp(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_line() {
        let line = format!("registration http://a.com/{} abc", "x".repeat(MAX_LINE_LEN));

        assert_eq!(parse_request(&line), Err(ProtocolError::LineTooLong));
    }

    #[test]
    fn test_encoded_request_parses_back() {
        let event = IngestEvent::click("http://a.com", "abc123", "5.6.7.8".parse().unwrap());

        assert_eq!(parse_request(&encode_request(&event)).unwrap(), event);
    }

    #[test]
    fn test_reply_lines() {
        assert_eq!(Reply::Accepted(7).encode(), "OK 7\n");
        assert_eq!(
            Reply::Rejected("bad\nthing".to_string()).encode(),
            "ERR bad thing\n"
        );
        assert_eq!(Reply::parse("OK 7\n"), Some(Reply::Accepted(7)));
        assert_eq!(
            Reply::parse("ERR unknown event kind 'x'\n"),
            Some(Reply::Rejected("unknown event kind 'x'".to_string()))
        );
        assert_eq!(Reply::parse("HELLO"), None);
    }
}
