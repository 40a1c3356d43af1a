//! Header-section line parsing: one field line (or fold/terminator) per
//! call, so the driver can interleave this with header-count/size limit
//! bookkeeping (spec §4.3).

use crate::classify::{is_ctl, is_field_content_byte, is_tchar};
use crate::config::ParserConfig;
use crate::error::{Failure, PResult, ParseError};
use crate::simd::find_line_ending;
use crate::span::Span;

/// A single parsed header field.
pub struct ParsedHeader {
    pub name: Span,
    pub value: Span,
}

/// The outcome of parsing one line of the header section.
pub enum HeaderEvent {
    /// A well-formed `name: value` field.
    Header(ParsedHeader),
    /// The empty line terminating the header section.
    EndOfHeaders,
    /// An obs-fold continuation line, dropped rather than merged into the
    /// previous header's value (only produced when
    /// `config.reject_obs_fold` is `false`).
    Continuation,
}

/// Parse the next header-section line starting at `data[0]`.
///
/// `have_prior_header` tells the scanner whether a line beginning with
/// SP/HTAB should be treated as obs-fold (there is a previous header to
/// fold onto) or as a bare [`ParseError::LeadingWhitespace`] violation.
/// Returns `Ok(None)` when `data` does not yet hold a complete line.
pub fn try_parse_one(
    data: &[u8],
    base: usize,
    config: &ParserConfig,
    have_prior_header: bool,
) -> PResult<Option<(HeaderEvent, usize)>> {
    let (line_len, term_len) = match find_line_ending(data, config.strict_crlf) {
        Some(hit) => hit,
        None => {
            if data.len() >= config.max_header_line_len {
                return Err(Failure::new(ParseError::HeaderLineTooLong, base + data.len()));
            }
            return Ok(None);
        }
    };
    if line_len >= config.max_header_line_len {
        return Err(Failure::new(ParseError::HeaderLineTooLong, base + line_len));
    }

    let line = &data[..line_len];
    let consumed = line_len + term_len;

    if line.is_empty() {
        return Ok(Some((HeaderEvent::EndOfHeaders, consumed)));
    }

    if line[0] == b' ' || line[0] == b'\t' {
        if !have_prior_header {
            return Err(Failure::new(ParseError::LeadingWhitespace, base));
        }
        if config.reject_obs_fold {
            return Err(Failure::new(ParseError::ObsFoldRejected, base));
        }
        return Ok(Some((HeaderEvent::Continuation, consumed)));
    }

    let mut idx = 0usize;
    while idx < line.len() && is_tchar(line[idx]) {
        idx += 1;
    }
    if idx == 0 {
        return Err(Failure::new(ParseError::InvalidHeaderName, base));
    }
    let name = Span::new(base, idx);

    if idx >= line.len() {
        return Err(Failure::new(ParseError::InvalidHeaderName, base + idx));
    }
    if line[idx] != b':' {
        // Whitespace (or any other byte) between the field name and the
        // colon is a request-smuggling-prone ambiguity RFC 9112 forbids
        // outright, not just trims.
        return Err(Failure::new(ParseError::InvalidHeaderName, base + idx));
    }
    idx += 1;

    while idx < line.len() && (line[idx] == b' ' || line[idx] == b'\t') {
        idx += 1;
    }
    let mut value_end = line.len();
    while value_end > idx && (line[value_end - 1] == b' ' || line[value_end - 1] == b'\t') {
        value_end -= 1;
    }
    let value_bytes = &line[idx..value_end];
    for (i, &b) in value_bytes.iter().enumerate() {
        if is_ctl(b) && b != b'\t' {
            return Err(Failure::new(ParseError::InvalidHeaderValue, base + idx + i));
        }
        if !is_field_content_byte(b, config.allow_obs_text) {
            return Err(Failure::new(ParseError::InvalidHeaderValue, base + idx + i));
        }
    }
    let value = Span::new(base + idx, value_bytes.len());

    Ok(Some((HeaderEvent::Header(ParsedHeader { name, value }), consumed)))
}
