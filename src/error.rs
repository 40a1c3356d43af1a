use std::fmt;

/// The seven broad categories a [`ParseError`] falls into (spec §7).
///
/// Categories group errors for documentation and for the HTTP status a
/// server would typically report; the parser itself never builds a
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request-line / CRLF framing violations.
    Framing,
    /// Header name/value syntax violations.
    HeaderSyntax,
    /// Header count/size limit violations.
    HeaderLimits,
    /// Host / Content-Length / Transfer-Encoding semantic violations.
    HeaderSemantics,
    /// Body or chunked-coding violations.
    BodyChunked,
    /// Connection-lifecycle misuse (e.g. driving a parser that must be
    /// abandoned after a protocol upgrade).
    Connection,
    /// Parser-internal invariant violation; never expected in practice.
    Internal,
}

/// Errors that can occur while driving the parser.
///
/// Every variant maps to exactly one [`ErrorKind`] (via [`ParseError::kind`])
/// and one intended client-visible HTTP status (via
/// [`ParseError::http_status`]), per the mapping table in spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    // ---- Framing ----
    RequestLineTooLong,
    InvalidMethod,
    InvalidTarget,
    InvalidVersion,

    // ---- Header syntax ----
    ObsFoldRejected,
    LeadingWhitespace,
    InvalidHeaderName,
    InvalidHeaderValue,

    // ---- Header limits ----
    HeaderLineTooLong,
    HeadersTooLarge,
    TooManyHeaders,

    // ---- Header semantics ----
    MissingHost,
    MultipleHost,
    InvalidHost,
    ContentLengthOverflow,
    MultipleContentLength,
    InvalidTransferEncoding,
    UnknownTransferCoding,
    TeNotChunkedFinal,
    TeClConflict,

    // ---- Body / chunked ----
    BodyTooLarge,
    InvalidChunkSize,
    ChunkSizeOverflow,
    ChunkExtTooLong,
    InvalidChunkExt,
    InvalidChunkData,

    // ---- Connection lifecycle ----
    ParserAbandoned,

    // ---- Internal ----
    Internal,
}

impl ParseError {
    /// The broad category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use ParseError::*;
        match self {
            RequestLineTooLong | InvalidMethod | InvalidTarget | InvalidVersion => {
                ErrorKind::Framing
            }
            ObsFoldRejected | LeadingWhitespace | InvalidHeaderName | InvalidHeaderValue => {
                ErrorKind::HeaderSyntax
            }
            HeaderLineTooLong | HeadersTooLarge | TooManyHeaders => ErrorKind::HeaderLimits,
            MissingHost | MultipleHost | InvalidHost | ContentLengthOverflow
            | MultipleContentLength | InvalidTransferEncoding | UnknownTransferCoding
            | TeNotChunkedFinal | TeClConflict => ErrorKind::HeaderSemantics,
            BodyTooLarge | InvalidChunkSize | ChunkSizeOverflow | ChunkExtTooLong
            | InvalidChunkExt | InvalidChunkData => ErrorKind::BodyChunked,
            ParserAbandoned => ErrorKind::Connection,
            Internal => ErrorKind::Internal,
        }
    }

    /// The enum-name string, stable across versions, suitable for metrics
    /// labels or log fields.
    pub fn name(&self) -> &'static str {
        use ParseError::*;
        match self {
            RequestLineTooLong => "REQUEST_LINE_TOO_LONG",
            InvalidMethod => "INVALID_METHOD",
            InvalidTarget => "INVALID_TARGET",
            InvalidVersion => "INVALID_VERSION",
            ObsFoldRejected => "OBS_FOLD_REJECTED",
            LeadingWhitespace => "LEADING_WHITESPACE",
            InvalidHeaderName => "INVALID_HEADER_NAME",
            InvalidHeaderValue => "INVALID_HEADER_VALUE",
            HeaderLineTooLong => "HEADER_LINE_TOO_LONG",
            HeadersTooLarge => "HEADERS_TOO_LARGE",
            TooManyHeaders => "TOO_MANY_HEADERS",
            MissingHost => "MISSING_HOST",
            MultipleHost => "MULTIPLE_HOST",
            InvalidHost => "INVALID_HOST",
            ContentLengthOverflow => "CONTENT_LENGTH_OVERFLOW",
            MultipleContentLength => "MULTIPLE_CONTENT_LENGTH",
            InvalidTransferEncoding => "INVALID_TRANSFER_ENCODING",
            UnknownTransferCoding => "UNKNOWN_TRANSFER_CODING",
            TeNotChunkedFinal => "TE_NOT_CHUNKED_FINAL",
            TeClConflict => "TE_CL_CONFLICT",
            BodyTooLarge => "BODY_TOO_LARGE",
            InvalidChunkSize => "INVALID_CHUNK_SIZE",
            ChunkSizeOverflow => "CHUNK_SIZE_OVERFLOW",
            ChunkExtTooLong => "CHUNK_EXT_TOO_LONG",
            InvalidChunkExt => "INVALID_CHUNK_EXT",
            InvalidChunkData => "INVALID_CHUNK_DATA",
            ParserAbandoned => "PARSER_ABANDONED",
            Internal => "INTERNAL",
        }
    }

    /// A human-readable description, suitable for logs or CLI output.
    pub fn message(&self) -> &'static str {
        use ParseError::*;
        match self {
            RequestLineTooLong => "request-line exceeds the configured maximum length",
            InvalidMethod => "request method is empty or contains a non-token byte",
            InvalidTarget => "request-target is malformed or incompatible with the method",
            InvalidVersion => "HTTP-version is not a well-formed HTTP/1.x version",
            ObsFoldRejected => "obsolete line folding in a header value was rejected",
            LeadingWhitespace => "header section began with whitespace before any header",
            InvalidHeaderName => "header field name is empty or contains a non-token byte",
            InvalidHeaderValue => "header field value contains a disallowed byte",
            HeaderLineTooLong => "a single header line exceeds the configured maximum length",
            HeadersTooLarge => "accumulated header section exceeds the configured maximum size",
            TooManyHeaders => "number of header fields exceeds the configured maximum",
            MissingHost => "HTTP/1.1 request is missing a required Host header",
            MultipleHost => "request contains more than one Host header",
            InvalidHost => "Host header value is malformed",
            ContentLengthOverflow => "Content-Length value overflows a 64-bit integer",
            MultipleContentLength => "multiple Content-Length headers disagree on a value",
            InvalidTransferEncoding => "Transfer-Encoding value is malformed",
            UnknownTransferCoding => "Transfer-Encoding names a coding this parser does not know",
            TeNotChunkedFinal => "final transfer-coding in Transfer-Encoding is not chunked",
            TeClConflict => "both Transfer-Encoding and Content-Length are present",
            BodyTooLarge => "request body exceeds the configured maximum size",
            InvalidChunkSize => "chunk-size line is malformed or missing its terminator",
            ChunkSizeOverflow => "chunk-size value overflows a 64-bit integer",
            ChunkExtTooLong => "chunk extensions exceed the configured maximum length",
            InvalidChunkExt => "chunk extension syntax is malformed",
            InvalidChunkData => "chunk data is not followed by CRLF",
            ParserAbandoned => "parser was driven after it should have been abandoned",
            Internal => "internal parser invariant violation",
        }
    }

    /// The HTTP status a server would typically report to the client for
    /// this error, per the mapping table in spec §6. The parser itself
    /// never constructs a response; this is documentation of intent.
    ///
    /// `UnknownTransferCoding` is the one header-semantics error that maps
    /// to 501 rather than 400.
    pub fn http_status(&self) -> u16 {
        if *self == ParseError::UnknownTransferCoding {
            return 501;
        }
        match self.kind() {
            ErrorKind::Framing | ErrorKind::HeaderSyntax | ErrorKind::HeaderSemantics => 400,
            ErrorKind::HeaderLimits => 431,
            ErrorKind::BodyChunked => match self {
                ParseError::BodyTooLarge => 413,
                _ => 400,
            },
            ErrorKind::Connection | ErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl std::error::Error for ParseError {}

/// Look up an error's enum-name string by value.
///
/// Exposed as a free function (mirroring the handle-based API this
/// crate's design is modeled after) alongside the inherent
/// [`ParseError::name`] method.
pub fn error_name(err: ParseError) -> &'static str {
    err.name()
}

/// Look up an error's human-readable message by value.
pub fn error_message(err: ParseError) -> &'static str {
    err.message()
}

/// An error paired with the byte offset (into the buffer most recently
/// passed to `parse`/`read_body`) at which it was detected.
///
/// Component parsers return `Result<T, Failure>`; the state machine
/// driver latches `Failure::error`/`Failure::offset` into the parser's
/// `ERROR` state verbatim (spec §7: "the same byte stream produces the
/// same error at the same offset regardless of how the stream was
/// chunked").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub error: ParseError,
    pub offset: usize,
}

impl Failure {
    pub fn new(error: ParseError, offset: usize) -> Self {
        Self { error, offset }
    }
}

/// Result type used throughout the component parsers.
pub type PResult<T> = Result<T, Failure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_stable_name_and_message() {
        let variants = [
            ParseError::RequestLineTooLong,
            ParseError::InvalidMethod,
            ParseError::InvalidTarget,
            ParseError::InvalidVersion,
            ParseError::ObsFoldRejected,
            ParseError::LeadingWhitespace,
            ParseError::InvalidHeaderName,
            ParseError::InvalidHeaderValue,
            ParseError::HeaderLineTooLong,
            ParseError::HeadersTooLarge,
            ParseError::TooManyHeaders,
            ParseError::MissingHost,
            ParseError::MultipleHost,
            ParseError::InvalidHost,
            ParseError::ContentLengthOverflow,
            ParseError::MultipleContentLength,
            ParseError::InvalidTransferEncoding,
            ParseError::UnknownTransferCoding,
            ParseError::TeNotChunkedFinal,
            ParseError::TeClConflict,
            ParseError::BodyTooLarge,
            ParseError::InvalidChunkSize,
            ParseError::ChunkSizeOverflow,
            ParseError::ChunkExtTooLong,
            ParseError::InvalidChunkExt,
            ParseError::InvalidChunkData,
            ParseError::ParserAbandoned,
            ParseError::Internal,
        ];
        for v in variants {
            assert!(!v.name().is_empty());
            assert!(!v.message().is_empty());
        }
    }

    #[test]
    fn http_status_mapping_matches_spec_table() {
        assert_eq!(ParseError::InvalidMethod.http_status(), 400);
        assert_eq!(ParseError::HeadersTooLarge.http_status(), 431);
        assert_eq!(ParseError::BodyTooLarge.http_status(), 413);
        assert_eq!(ParseError::UnknownTransferCoding.http_status(), 501);
    }
}
