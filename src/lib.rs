//! # WireFrame
//!
//! A **strict, incremental HTTP/1.1 request parser** implemented as a
//! state machine, designed for use both as a Rust library and as a CLI
//! tool.
//!
//! WireFrame processes HTTP requests incrementally, in arbitrarily-sized
//! chunks, making it suitable for both synchronous and asynchronous
//! contexts. The parser follows **RFC 9112** message syntax and **RFC
//! 9110** semantics, and supports chunked transfer-coding.
//!
//! Unlike a byte-by-byte `feed`/`finish` parser, [`Parser::parse`] takes
//! the *entire* buffer accumulated for the in-progress message on every
//! call. This is what lets the parser stay zero-copy: every [`Header`]
//! and the request-line are [`span::Span`]s into that one buffer rather
//! than owned, copied strings.
//!
//! ## Quick start — one-shot parsing
//!
//! ```rust
//! use wireframe::parse_request;
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = parse_request(raw).expect("valid request");
//! assert_eq!(request.method, "GET");
//! assert_eq!(request.target, "/hello");
//! ```
//!
//! ## Quick start — incremental parsing
//!
//! ```rust
//! use wireframe::{Parser, ParseStatus};
//!
//! let mut parser = Parser::new();
//! let mut buf = Vec::new();
//!
//! buf.extend_from_slice(b"GET / HTTP/1.1\r\n");
//! assert_eq!(parser.parse(&buf).unwrap(), ParseStatus::Incomplete);
//!
//! buf.extend_from_slice(b"Host: example.com\r\n\r\n");
//! let status = parser.parse(&buf).unwrap();
//! assert!(matches!(status, ParseStatus::Complete(_)));
//! assert_eq!(parser.request().target.resolve(&buf), b"/");
//! ```

mod body;
mod chunked;
mod classify;
mod config;
mod error;
mod finalize;
mod headers;
mod output;
mod parser;
mod requestline;
mod simd;
mod span;
mod types;

use std::fmt;

pub use config::ParserConfig;
pub use error::{error_message, error_name, ErrorKind, Failure, PResult, ParseError};
pub use output::{format_debug, format_headers_only, format_json};
pub use parser::{BodyChunk, ParseStatus, Parser, State};
pub use span::Span;
pub use types::{
    find_header, find_trailer, header_name_eq, BodyType, Header, HeaderFlags, KnownHeader,
    OwnedHeader, OwnedRequest, Request, RequestFlags, TargetForm, Version,
};

/// Error surface for the one-shot [`parse_request`]/[`parse_request_with_config`]
/// wrappers.
///
/// The streaming [`Parser`] never needs a notion of "the buffer I was
/// given just wasn't a whole message" — callers feed it more data and
/// call again. The one-shot wrappers have no such recourse, so that
/// condition gets its own variant here rather than being folded into
/// [`ParseError`]'s fixed seven-category taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotError {
    /// The request was malformed; see the wrapped [`ParseError`].
    Parse(ParseError),
    /// `data` did not contain a complete request.
    Incomplete,
}

impl fmt::Display for OneShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OneShotError::Parse(e) => write!(f, "{e}"),
            OneShotError::Incomplete => write!(f, "input does not contain a complete request"),
        }
    }
}

impl std::error::Error for OneShotError {}

impl From<ParseError> for OneShotError {
    fn from(e: ParseError) -> Self {
        OneShotError::Parse(e)
    }
}

/// Parse a **complete** HTTP request from a byte slice in one call,
/// producing an owned, borrow-free [`OwnedRequest`].
///
/// This is a convenience wrapper around [`Parser`] for callers who don't
/// want to manage buffer lifetimes or drive the state machine
/// themselves. For incremental/streaming use, create a `Parser` directly.
///
/// # Errors
///
/// Returns [`OneShotError::Parse`] if `data` is malformed, or
/// [`OneShotError::Incomplete`] if `data` does not contain a complete
/// request.
pub fn parse_request(data: &[u8]) -> Result<OwnedRequest, OneShotError> {
    parse_request_with_config(data, ParserConfig::default())
}

/// Parse a **complete** HTTP request using custom [`ParserConfig`] limits.
///
/// # Errors
///
/// Returns [`OneShotError::Parse`] if `data` is malformed or exceeds the
/// configured limits, or [`OneShotError::Incomplete`] if `data` does not
/// contain a complete request.
pub fn parse_request_with_config(
    data: &[u8],
    config: ParserConfig,
) -> Result<OwnedRequest, OneShotError> {
    let mut parser = Parser::with_config(config);
    let mut body = Vec::new();
    loop {
        match parser.parse(data)? {
            ParseStatus::Complete(_) => {
                return Ok(OwnedRequest::from_request(parser.request(), data, body));
            }
            ParseStatus::BodyReady => {
                let chunk = parser.read_body(data)?;
                // `data` is the whole buffer handed to us, so a delivery
                // that neither made progress nor finished means the body
                // genuinely runs past the end of `data`.
                if chunk.data.is_empty() && !chunk.done {
                    return Err(OneShotError::Incomplete);
                }
                body.extend_from_slice(chunk.data);
            }
            ParseStatus::Incomplete => return Err(OneShotError::Incomplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_parses_simple_request() {
        let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "/hello");
        assert_eq!(req.header("host"), Some("example.com"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn one_shot_decodes_content_length_body() {
        let raw = b"POST /x HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn one_shot_decodes_chunked_body() {
        let raw = b"POST /x HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.body, b"Wikipedia");
    }

    #[test]
    fn one_shot_reports_incomplete() {
        let raw = b"GET / HTTP/1.1\r\nHost: h\r\n";
        let err = parse_request(raw).unwrap_err();
        assert_eq!(err, OneShotError::Incomplete);
    }

    #[test]
    fn one_shot_propagates_parse_errors() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let err = parse_request(raw).unwrap_err();
        assert_eq!(err, OneShotError::Parse(ParseError::MissingHost));
    }
}
