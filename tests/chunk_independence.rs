//! Property-style tests for the quantified laws in the parser's testable
//! properties: chunk independence, byte-for-byte determinism, and
//! round-trip framing consistency.

use wireframe::{BodyType, ParseStatus, Parser, ParserConfig, RequestFlags};

/// Drive a parse to completion, feeding `full` into an accumulating buffer
/// in pieces of `chunk_size` bytes (each `parse` call sees the whole
/// buffer accumulated so far, per the cumulative-buffer convention), and
/// draining any `BodyReady` yields via `read_body`. Returns (method,
/// target, body_type, consumed, body).
fn drive(full: &[u8], chunk_size: usize) -> (Vec<u8>, Vec<u8>, Option<BodyType>, usize, Vec<u8>) {
    let mut parser = Parser::new();
    let mut buf = Vec::new();
    let mut end = 0;
    let mut body = Vec::new();

    loop {
        match parser.parse(&buf).unwrap() {
            ParseStatus::Complete(consumed) => {
                return (
                    parser.request().method.resolve(&buf).to_vec(),
                    parser.request().target.resolve(&buf).to_vec(),
                    parser.request().body_type,
                    consumed,
                    body,
                );
            }
            ParseStatus::BodyReady => {
                let chunk = parser.read_body(&buf).unwrap();
                let made_progress = !chunk.data.is_empty();
                body.extend_from_slice(chunk.data);
                if made_progress || chunk.done {
                    continue;
                }
                // No bytes available to deliver and not yet done: need more input.
                if end == full.len() {
                    panic!("ran out of input without completing body delivery");
                }
                let next_end = (end + chunk_size).min(full.len());
                buf.extend_from_slice(&full[end..next_end]);
                end = next_end;
            }
            ParseStatus::Incomplete => {
                if end == full.len() {
                    panic!("ran out of input without completing");
                }
                let next_end = (end + chunk_size).min(full.len());
                buf.extend_from_slice(&full[end..next_end]);
                end = next_end;
            }
        }
    }
}

/// Parse `full` as if delivered whole and return (method, target,
/// body_type, consumed, body).
fn parse_whole(full: &[u8]) -> (Vec<u8>, Vec<u8>, Option<BodyType>, usize, Vec<u8>) {
    drive(full, full.len().max(1))
}

/// Parse `full` by feeding it in pieces of `chunk_size` bytes, draining
/// body yields along the way, and return the same tuple `parse_whole`
/// returns.
fn parse_in_chunks(
    full: &[u8],
    chunk_size: usize,
) -> (Vec<u8>, Vec<u8>, Option<BodyType>, usize, Vec<u8>) {
    drive(full, chunk_size)
}

const SAMPLES: &[&[u8]] = &[
    b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n",
    b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 11\r\n\r\nhello world",
    b"POST /up HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n",
    b"GET /q?a=1&b=2 HTTP/1.1\r\nHost: h\r\nAccept: */*\r\nX-One: 1\r\nX-Two: 2\r\n\r\n",
];

#[test]
fn chunk_independence_across_split_points() {
    for &sample in SAMPLES {
        let whole = parse_whole(sample);
        for chunk_size in 1..=sample.len() {
            let chunked = parse_in_chunks(sample, chunk_size);
            assert_eq!(
                whole, chunked,
                "mismatch for sample {sample:?} at chunk_size {chunk_size}"
            );
        }
    }
}

#[test]
fn byte_for_byte_determinism_on_errors() {
    let bad = b"GET /ok HTTP/1.1\r\nHost: h\r\nX-Bad\x01: v\r\n\r\n";

    let mut whole_parser = Parser::new();
    let whole_err = whole_parser.parse(bad).unwrap_err();
    let whole_offset = whole_parser.last_error().unwrap().offset;

    for chunk_size in 1..=bad.len() {
        let mut parser = Parser::new();
        let mut buf = Vec::new();
        let mut end = 0;
        let result = loop {
            let next_end = (end + chunk_size).min(bad.len());
            buf.extend_from_slice(&bad[end..next_end]);
            end = next_end;
            match parser.parse(&buf) {
                Ok(ParseStatus::Incomplete) => {
                    if end == bad.len() {
                        panic!("never errored despite consuming all input");
                    }
                    continue;
                }
                Ok(ParseStatus::Complete(_)) => panic!("expected an error, got Complete"),
                Ok(ParseStatus::BodyReady) => {
                    panic!("malformed header never reaches a body-reading state")
                }
                Err(e) => break e,
            }
        };
        assert_eq!(result, whole_err, "error mismatch at chunk_size {chunk_size}");
        assert_eq!(
            parser.last_error().unwrap().offset,
            whole_offset,
            "offset mismatch at chunk_size {chunk_size}"
        );
    }
}

#[test]
fn round_trip_framing_consistency() {
    let cases: &[(&[u8], BodyType)] = &[
        (b"GET / HTTP/1.1\r\nHost: h\r\n\r\n", BodyType::None),
        (
            b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\nabc",
            BodyType::ContentLength,
        ),
        (
            b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
            BodyType::Chunked,
        ),
    ];
    for &(raw, expected) in cases {
        let mut parser = Parser::new();
        loop {
            match parser.parse(raw).unwrap() {
                ParseStatus::Complete(_) => break,
                ParseStatus::BodyReady => {
                    parser.read_body(raw).unwrap();
                }
                ParseStatus::Incomplete => panic!("expected a complete parse of the whole buffer"),
            }
        }
        assert_eq!(parser.request().body_type, Some(expected));
    }
}

#[test]
fn empty_buffer_is_incomplete_and_consumes_nothing() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse(b"").unwrap(), ParseStatus::Incomplete);
    assert_eq!(parser.bytes_consumed(), 0);
}

#[test]
fn content_length_zero_completes_immediately() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 0\r\n\r\n";
    let mut parser = Parser::new();
    assert_eq!(parser.parse(raw).unwrap(), ParseStatus::Complete(raw.len()));
}

#[test]
fn chunked_body_with_only_final_chunk_is_empty_with_no_trailers() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n";
    let mut parser = Parser::new();
    assert_eq!(parser.parse(raw).unwrap(), ParseStatus::Complete(raw.len()));
    assert_eq!(parser.request().trailer_count(), 0);
}

#[test]
fn chunk_size_overflow_is_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\nffffffffffffffffff\r\n";
    let mut parser = Parser::new();
    assert!(parser.parse(raw).is_err());
}

#[test]
fn content_length_overflow_is_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 99999999999999999999\r\n\r\n";
    let mut parser = Parser::new();
    assert!(parser.parse(raw).is_err());
}

#[test]
fn keep_alive_flag_is_consistent_with_version_and_connection_header() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
    let mut parser = Parser::new();
    assert!(matches!(parser.parse(raw).unwrap(), ParseStatus::Complete(_)));
    assert!(parser.request().flags.contains(RequestFlags::KEEP_ALIVE));
}
