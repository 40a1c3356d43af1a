//! The incremental state-machine driver tying the component parsers
//! together (spec §5).
//!
//! Unlike a byte-by-byte `feed`-style parser, [`Parser::parse`] follows the
//! cumulative-buffer convention: each call is given the *entire* buffer
//! accumulated for the in-progress message, not just the newest chunk.
//! This is what lets every [`crate::span::Span`] the parser produces stay
//! a valid zero-copy view into that one buffer across as many `parse`
//! calls as the message needs, with no internal copying.

use crate::body::advance_identity;
use crate::chunked::{try_parse_chunk_size, try_parse_chunk_terminator};
use crate::config::ParserConfig;
use crate::error::{Failure, ParseError};
use crate::finalize::finalize;
use crate::headers::{try_parse_one as try_parse_header_line, HeaderEvent};
use crate::requestline::try_parse as try_parse_request_line;
use crate::types::{BodyType, Header, HeaderFlags, KnownHeader, Request};

/// Outcome of a [`Parser::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// A complete request (headers and, if present, body/trailers) has
    /// been parsed. The value is the offset into the buffer just passed
    /// to `parse` at which any pipelined next request begins.
    Complete(usize),
    /// The parser reached a body-reading state ([`State::Body`] or
    /// [`State::ChunkData`]). It will not consume any more body bytes
    /// until the caller switches to [`Parser::read_body`]; check
    /// [`Parser::get_state`] to tell the two body-reading states apart.
    BodyReady,
    /// More data is required before the parser can make further progress.
    Incomplete,
}

/// The parser's current position in the request grammar.
///
/// Exposed via [`Parser::get_state`] so a caller can tell the two
/// body-reading states apart after a [`ParseStatus::BodyReady`] yield, or
/// otherwise observe progress without re-deriving it from `ParseStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    RequestLine,
    Headers,
    /// Reading a Content-Length-framed body. Call [`Parser::read_body`].
    Body,
    ChunkSize,
    /// Reading one chunk's data. Call [`Parser::read_body`].
    ChunkData,
    ChunkTerminator,
    Trailers,
    Complete,
    Errored,
}

/// A zero-copy view into body bytes delivered by [`Parser::read_body`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyChunk<'a> {
    /// Body bytes delivered by this call. Empty if `buf` held no new
    /// body bytes beyond what a previous call already consumed.
    pub data: &'a [u8],
    /// `true` once this delivery exhausts the current body-reading
    /// state: the whole body for [`State::Body`], or just the current
    /// chunk's data for [`State::ChunkData`] (more chunks may follow).
    pub done: bool,
}

/// An incremental, zero-copy HTTP/1.1 request parser.
///
/// # Usage
///
/// ```rust
/// use wireframe::{Parser, ParseStatus};
///
/// let mut parser = Parser::new();
/// let buf = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
///
/// match parser.parse(buf).unwrap() {
///     ParseStatus::Complete(consumed) => {
///         let req = parser.request();
///         assert_eq!(req.method.resolve(buf), b"GET");
///         assert_eq!(consumed, buf.len());
///     }
///     ParseStatus::Incomplete => panic!("expected a complete request"),
///     ParseStatus::BodyReady => panic!("a bodiless request never yields BodyReady"),
/// }
/// ```
pub struct Parser {
    state: State,
    config: ParserConfig,
    request: Request,
    consumed: usize,
    headers_section_start: usize,
    body_start: usize,
    body_remaining: u64,
    body_total: u64,
    chunk_remaining: u64,
    error: Option<Failure>,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a new parser with custom limits and tolerances.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            state: State::RequestLine,
            config,
            request: Request::new(),
            consumed: 0,
            headers_section_start: 0,
            body_start: 0,
            body_remaining: 0,
            body_total: 0,
            chunk_remaining: 0,
            error: None,
        }
    }

    /// Reset the parser so it can be reused for another request (HTTP
    /// pipelining). Preserves the `Vec` capacity already allocated for
    /// headers/trailers.
    pub fn reset(&mut self) {
        self.state = State::RequestLine;
        self.request.reset();
        self.consumed = 0;
        self.headers_section_start = 0;
        self.body_start = 0;
        self.body_remaining = 0;
        self.body_total = 0;
        self.chunk_remaining = 0;
        self.error = None;
    }

    /// Drive the parser forward using `buf`, the full buffer accumulated
    /// for the current message so far.
    ///
    /// `buf` must start at the same byte this message's request-line
    /// started at on every call; callers must not discard or rewrite
    /// bytes this parser has not yet consumed past.
    pub fn parse(&mut self, buf: &[u8]) -> Result<ParseStatus, ParseError> {
        if self.state == State::Errored {
            return Err(ParseError::ParserAbandoned);
        }

        loop {
            match self.state {
                State::RequestLine => match try_parse_request_line(buf, self.consumed, &self.config) {
                    Ok(Some((rl, used))) => {
                        self.request.method = rl.method;
                        self.request.target = rl.target;
                        self.request.target_form = Some(rl.target_form);
                        self.request.version = rl.version;
                        self.consumed += used;
                        self.headers_section_start = self.consumed;
                        self.state = State::Headers;
                    }
                    Ok(None) => return Ok(ParseStatus::Incomplete),
                    Err(f) => return Err(self.enter_error(f)),
                },

                State::Headers => match self.advance_header_section(buf, false)? {
                    Some(()) => {
                        if let Err(f) = finalize(&mut self.request, buf, &self.config) {
                            return Err(self.enter_error(f));
                        }
                        self.body_start = self.consumed;
                        self.state = match self.request.body_type {
                            Some(BodyType::None) | None => State::Complete,
                            Some(BodyType::ContentLength) => {
                                self.body_total = self.request.content_length;
                                if let Some(limit) = self.config.max_body_size {
                                    if self.body_total > limit {
                                        return Err(self.enter_error(Failure::new(
                                            ParseError::BodyTooLarge,
                                            self.consumed,
                                        )));
                                    }
                                }
                                self.body_remaining = self.body_total;
                                if self.body_remaining == 0 {
                                    State::Complete
                                } else {
                                    State::Body
                                }
                            }
                            Some(BodyType::Chunked) => State::ChunkSize,
                        };
                    }
                    None => return Ok(ParseStatus::Incomplete),
                },

                // Body-reading states do not advance here: they yield so the
                // caller switches to `read_body` for a zero-copy body view.
                State::Body | State::ChunkData => return Ok(ParseStatus::BodyReady),

                State::ChunkSize => {
                    match try_parse_chunk_size(&buf[self.consumed..], self.consumed, &self.config) {
                        Ok(Some((size, used))) => {
                            self.consumed += used;
                            if let Some(limit) = self.config.max_body_size {
                                self.body_total = self.body_total.saturating_add(size);
                                if self.body_total > limit {
                                    return Err(self.enter_error(Failure::new(
                                        ParseError::BodyTooLarge,
                                        self.consumed,
                                    )));
                                }
                            }
                            if size == 0 {
                                self.state = State::Trailers;
                            } else {
                                self.chunk_remaining = size;
                                self.state = State::ChunkData;
                            }
                        }
                        Ok(None) => return Ok(ParseStatus::Incomplete),
                        Err(f) => return Err(self.enter_error(f)),
                    }
                }

                State::ChunkTerminator => {
                    match try_parse_chunk_terminator(&buf[self.consumed..], self.consumed, &self.config) {
                        Ok(Some(used)) => {
                            self.consumed += used;
                            self.state = State::ChunkSize;
                        }
                        Ok(None) => return Ok(ParseStatus::Incomplete),
                        Err(f) => return Err(self.enter_error(f)),
                    }
                }

                State::Trailers => match self.advance_header_section(buf, true)? {
                    Some(()) => self.state = State::Complete,
                    None => return Ok(ParseStatus::Incomplete),
                },

                State::Complete => return Ok(ParseStatus::Complete(self.consumed)),

                State::Errored => return Err(ParseError::ParserAbandoned),
            }
        }
    }

    /// Drive the header (or trailer) section forward as far as `buf`
    /// allows. Returns `Ok(Some(()))` once the terminating empty line has
    /// been consumed, `Ok(None)` if more data is needed.
    fn advance_header_section(
        &mut self,
        buf: &[u8],
        is_trailer: bool,
    ) -> Result<Option<()>, ParseError> {
        loop {
            let have_prior = if is_trailer {
                !self.request.trailers.is_empty()
            } else {
                !self.request.headers.is_empty()
            };
            let section_len = self.consumed - self.headers_section_start;
            if section_len > self.config.max_headers_size {
                return Err(self.enter_error(Failure::new(ParseError::HeadersTooLarge, self.consumed)));
            }
            match try_parse_header_line(&buf[self.consumed..], self.consumed, &self.config, have_prior) {
                Ok(Some((HeaderEvent::EndOfHeaders, used))) => {
                    self.consumed += used;
                    return Ok(Some(()));
                }
                Ok(Some((HeaderEvent::Continuation, used))) => {
                    self.consumed += used;
                }
                Ok(Some((HeaderEvent::Header(parsed), used))) => {
                    let count = if is_trailer {
                        self.request.trailers.len()
                    } else {
                        self.request.headers.len()
                    };
                    if count >= self.config.max_header_count {
                        return Err(self.enter_error(Failure::new(ParseError::TooManyHeaders, self.consumed)));
                    }
                    let name_id = KnownHeader::from_name(parsed.name.resolve(buf));
                    let header = Header {
                        name: parsed.name,
                        value: parsed.value,
                        name_id,
                        flags: if name_id == KnownHeader::Other {
                            HeaderFlags::default()
                        } else {
                            HeaderFlags::KNOWN_NAME
                        },
                    };
                    if is_trailer {
                        self.request.trailers.push(header);
                    } else {
                        let idx = self.request.headers.len();
                        self.request.headers.push(header);
                        self.request.note_known_header(name_id, idx);
                    }
                    self.consumed += used;
                }
                Ok(None) => return Ok(None),
                Err(f) => return Err(self.enter_error(f)),
            }
        }
    }

    fn enter_error(&mut self, failure: Failure) -> ParseError {
        let error = failure.error;
        self.error = Some(failure);
        self.state = State::Errored;
        error
    }

    /// Deliver body bytes as a zero-copy view into `buf`, advancing the
    /// parser past them.
    ///
    /// Valid only when [`Parser::get_state`] is [`State::Body`] or
    /// [`State::ChunkData`] — i.e. right after [`Parser::parse`] returns
    /// [`ParseStatus::BodyReady`]. Delivers whatever body bytes `buf`
    /// currently holds beyond what's already been consumed, up to the
    /// next boundary (the rest of the body for `Body`, or the rest of
    /// the current chunk for `ChunkData`); call it again with more data
    /// if `done` comes back `false`. Calling it in any other state
    /// abandons the parser with [`ParseError::Internal`], the same way a
    /// malformed request would.
    pub fn read_body<'a>(&mut self, buf: &'a [u8]) -> Result<BodyChunk<'a>, ParseError> {
        match self.state {
            State::Body => {
                let start = self.consumed;
                let progress = advance_identity(&buf[start..], self.body_remaining);
                self.consumed += progress.consumed;
                self.body_remaining -= progress.consumed as u64;
                if progress.complete {
                    self.state = State::Complete;
                }
                Ok(BodyChunk {
                    data: &buf[start..self.consumed],
                    done: progress.complete,
                })
            }
            State::ChunkData => {
                let start = self.consumed;
                let progress = advance_identity(&buf[start..], self.chunk_remaining);
                self.consumed += progress.consumed;
                self.chunk_remaining -= progress.consumed as u64;
                if progress.complete {
                    self.state = State::ChunkTerminator;
                }
                Ok(BodyChunk {
                    data: &buf[start..self.consumed],
                    done: progress.complete,
                })
            }
            State::Errored => Err(ParseError::ParserAbandoned),
            _ => Err(self.enter_error(Failure::new(ParseError::Internal, self.consumed))),
        }
    }

    /// The request as parsed so far. Spans are only meaningful when
    /// resolved against the same buffer most recently passed to
    /// [`Parser::parse`].
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The parser's current position in the request grammar.
    pub fn get_state(&self) -> State {
        self.state
    }

    /// The byte offset at which the stored error (if any) was detected.
    pub fn error_offset(&self) -> Option<usize> {
        self.error.map(|f| f.offset)
    }

    /// `true` once [`Parser::parse`] has returned
    /// [`ParseStatus::Complete`].
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Total number of bytes of the current message's buffer consumed so
    /// far, including the terminating CRLF of the body/trailers.
    pub fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    /// Offset into the buffer at which the body (or, for a bodiless
    /// request, the position right after the header section) begins.
    /// Only meaningful once the header section has been fully parsed.
    pub fn body_start(&self) -> usize {
        self.body_start
    }

    /// The error (and the offset it was detected at) that abandoned this
    /// parser, if any.
    pub fn last_error(&self) -> Option<Failure> {
        self.error
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
