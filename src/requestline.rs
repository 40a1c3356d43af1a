//! Request-line parsing: method, request-target, HTTP-version, and
//! request-target form classification/validation (spec §4.2).

use crate::classify::{hex_value, is_ctl, is_digit, is_tchar, is_uri_char};
use crate::config::ParserConfig;
use crate::error::{Failure, PResult, ParseError};
use crate::simd::find_line_ending;
use crate::span::Span;
use crate::types::{TargetForm, Version};

/// The parsed, not-yet-validated-against-headers request-line.
pub struct RequestLine {
    pub method: Span,
    pub target: Span,
    pub target_form: TargetForm,
    pub version: Version,
}

/// Attempt to parse a complete request-line from the front of `data`.
///
/// `base` is `data`'s offset within the logical message buffer, used to
/// turn in-line positions into absolute [`Span`]s. Returns `Ok(None)` when
/// `data` does not yet contain a full line and is short of the
/// `max_request_line_len` limit (spec: NEED_MORE_DATA).
pub fn try_parse(
    data: &[u8],
    base: usize,
    config: &ParserConfig,
) -> PResult<Option<(RequestLine, usize)>> {
    let (line_len, term_len) = match find_line_ending(data, config.strict_crlf) {
        Some(hit) => hit,
        None => {
            if data.len() >= config.max_request_line_len {
                return Err(Failure::new(ParseError::RequestLineTooLong, base + data.len()));
            }
            return Ok(None);
        }
    };
    if line_len >= config.max_request_line_len {
        return Err(Failure::new(ParseError::RequestLineTooLong, base + line_len));
    }

    let line = &data[..line_len];
    let mut idx = 0usize;

    // ---- Method ----
    while idx < line.len() && is_tchar(line[idx]) {
        idx += 1;
    }
    if idx == 0 {
        return Err(Failure::new(ParseError::InvalidMethod, base));
    }
    let method = Span::new(base, idx);
    if idx >= line.len() || !is_method_delimiter(line[idx], config) {
        return Err(Failure::new(ParseError::InvalidMethod, base + idx));
    }
    idx += 1;
    if config.tolerate_spaces {
        while idx < line.len() && is_method_delimiter(line[idx], config) {
            idx += 1;
        }
    }

    // ---- Request-target ----
    let target_start = idx;
    while idx < line.len() && line[idx] != b' ' {
        let b = line[idx];
        if is_ctl(b) {
            return Err(Failure::new(ParseError::InvalidTarget, base + idx));
        }
        idx += 1;
    }
    if idx == target_start {
        return Err(Failure::new(ParseError::InvalidTarget, base + idx));
    }
    let target_bytes = &line[target_start..idx];
    let target = Span::new(base + target_start, target_bytes.len());
    let target_form = classify_and_validate_target(target_bytes, base + target_start)?;

    if idx >= line.len() || line[idx] != b' ' {
        return Err(Failure::new(ParseError::InvalidTarget, base + idx));
    }
    idx += 1;
    if config.tolerate_spaces {
        while idx < line.len() && (line[idx] == b' ' || line[idx] == b'\t') {
            idx += 1;
        }
    }

    // ---- HTTP-version ----
    let version_bytes = &line[idx..];
    let version = parse_version(version_bytes, base + idx, config)?;

    Ok(Some((
        RequestLine {
            method,
            target,
            target_form,
            version,
        },
        line_len + term_len,
    )))
}

#[inline]
fn is_method_delimiter(b: u8, config: &ParserConfig) -> bool {
    b == b' ' || (config.tolerate_spaces && b == b'\t')
}

fn parse_version(bytes: &[u8], offset: usize, config: &ParserConfig) -> PResult<Version> {
    let mut end = bytes.len();
    if config.tolerate_spaces {
        while end > 0 && (bytes[end - 1] == b' ' || bytes[end - 1] == b'\t') {
            end -= 1;
        }
    }
    let core = &bytes[..end];
    if core.len() != 8
        || &core[0..5] != b"HTTP/"
        || !is_digit(core[5])
        || core[6] != b'.'
        || !is_digit(core[7])
    {
        return Err(Failure::new(ParseError::InvalidVersion, offset));
    }
    if !config.tolerate_spaces && end != bytes.len() {
        return Err(Failure::new(ParseError::InvalidVersion, offset + end));
    }
    let major = core[5] - b'0';
    let minor = core[7] - b'0';
    if major != 1 {
        return Err(Failure::new(ParseError::InvalidVersion, offset + 5));
    }
    Ok(Version { major, minor })
}

// ---------------------------------------------------------------------------
// Request-target form classification & validation
// ---------------------------------------------------------------------------

fn classify_and_validate_target(target: &[u8], offset: usize) -> PResult<TargetForm> {
    if target == b"*" {
        return Ok(TargetForm::Asterisk);
    }
    if target[0] == b'/' {
        validate_origin_form(target, offset)?;
        return Ok(TargetForm::Origin);
    }
    if looks_like_absolute_form(target) {
        validate_absolute_form(target, offset)?;
        return Ok(TargetForm::Absolute);
    }
    validate_authority_form(target, offset)?;
    Ok(TargetForm::Authority)
}

/// `scheme "://"` lookahead: `ALPHA *(ALPHA / DIGIT / "+" / "-" / ".")`
/// followed by `"://"`.
fn looks_like_absolute_form(target: &[u8]) -> bool {
    if target.is_empty() || !target[0].is_ascii_alphabetic() {
        return false;
    }
    let mut i = 1;
    while i < target.len()
        && (target[i].is_ascii_alphanumeric()
            || target[i] == b'+'
            || target[i] == b'-'
            || target[i] == b'.')
    {
        i += 1;
    }
    target[i..].starts_with(b"://")
}

/// origin-form: absolute-path `["?" query]`.
fn validate_origin_form(target: &[u8], offset: usize) -> PResult<()> {
    let query_start = target.iter().position(|&b| b == b'?');
    let (path, query) = match query_start {
        Some(q) => (&target[..q], Some(&target[q + 1..])),
        None => (target, None),
    };
    validate_path_bytes(path, offset)?;
    if let Some(q) = query {
        validate_query_bytes(q, offset + path.len() + 1)?;
    }
    Ok(())
}

fn validate_path_bytes(bytes: &[u8], offset: usize) -> PResult<()> {
    validate_uri_component(bytes, offset, false)
}

fn validate_query_bytes(bytes: &[u8], offset: usize) -> PResult<()> {
    validate_uri_component(bytes, offset, true)
}

/// Shared validator for path/query/authority byte runs: rejects `#`, CTL,
/// SP, and malformed percent-encoding; `in_query` additionally admits the
/// extra `/` and `?` the query component allows.
fn validate_uri_component(bytes: &[u8], offset: usize, in_query: bool) -> PResult<()> {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'#' || is_ctl(b) || b == b' ' {
            return Err(Failure::new(ParseError::InvalidTarget, offset + i));
        }
        if b == b'%' {
            let h1 = bytes.get(i + 1).copied();
            let h2 = bytes.get(i + 2).copied();
            match (h1.and_then(hex_value), h2.and_then(hex_value)) {
                (Some(_), Some(_)) => {
                    i += 3;
                    continue;
                }
                _ => return Err(Failure::new(ParseError::InvalidTarget, offset + i)),
            }
        }
        let allowed = is_uri_char(b) || (in_query && (b == b'/' || b == b'?'));
        if !allowed {
            return Err(Failure::new(ParseError::InvalidTarget, offset + i));
        }
        i += 1;
    }
    Ok(())
}

/// absolute-form: `scheme ":" "//" authority path-abempty ["?" query]`,
/// validated as a whole via [`validate_uri_component`] after checking for
/// a non-empty authority.
fn validate_absolute_form(target: &[u8], offset: usize) -> PResult<()> {
    let scheme_end = target.iter().position(|&b| b == b':').unwrap();
    let after_scheme = &target[scheme_end + 1..];
    if !after_scheme.starts_with(b"//") {
        return Err(Failure::new(ParseError::InvalidTarget, offset + scheme_end));
    }
    let authority_start = scheme_end + 3;
    let rest = &target[authority_start..];
    let authority_len = rest
        .iter()
        .position(|&b| b == b'/' || b == b'?' || b == b'#')
        .unwrap_or(rest.len());
    if authority_len == 0 {
        return Err(Failure::new(ParseError::InvalidTarget, offset + authority_start));
    }
    // Whole remainder after "scheme://" is validated uniformly: the
    // authority portion uses the same character set as a path, and
    // '?'/'#' splits are handled identically to origin-form.
    let query_start = rest.iter().position(|&b| b == b'?');
    let (path_part, query_part) = match query_start {
        Some(q) => (&rest[..q], Some(&rest[q + 1..])),
        None => (rest, None),
    };
    validate_path_bytes(path_part, offset + authority_start)?;
    if let Some(q) = query_part {
        validate_query_bytes(q, offset + authority_start + path_part.len() + 1)?;
    }
    Ok(())
}

/// authority-form: `host [":" port]`, used only for CONNECT requests.
fn validate_authority_form(target: &[u8], offset: usize) -> PResult<()> {
    if target.starts_with(b"[") {
        let close = target
            .iter()
            .position(|&b| b == b']')
            .ok_or(Failure::new(ParseError::InvalidTarget, offset))?;
        let inside = &target[1..close];
        if inside.is_empty()
            || !inside
                .iter()
                .all(|&b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
        {
            return Err(Failure::new(ParseError::InvalidTarget, offset + 1));
        }
        let rest = &target[close + 1..];
        validate_optional_port(rest, offset + close + 1)?;
        return Ok(());
    }

    let colon = target.iter().rposition(|&b| b == b':');
    let (host, port) = match colon {
        Some(c) => (&target[..c], Some(&target[c..])),
        None => (target, None),
    };
    if host.is_empty() {
        return Err(Failure::new(ParseError::InvalidTarget, offset));
    }
    for (i, &b) in host.iter().enumerate() {
        if is_ctl(b) || b == b' ' {
            return Err(Failure::new(ParseError::InvalidTarget, offset + i));
        }
    }
    if let Some(port) = port {
        validate_optional_port(port, offset + host.len())?;
    }
    Ok(())
}

/// Validates an optional `":" 1*DIGIT` suffix with the port value in
/// range `0..=65535`. An empty suffix is fine (no port given).
fn validate_optional_port(bytes: &[u8], offset: usize) -> PResult<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    if bytes[0] != b':' {
        return Err(Failure::new(ParseError::InvalidTarget, offset));
    }
    let digits = &bytes[1..];
    if digits.is_empty() || !digits.iter().all(|&b| is_digit(b)) {
        return Err(Failure::new(ParseError::InvalidTarget, offset + 1));
    }
    let value: u64 = digits
        .iter()
        .fold(0u64, |acc, &b| acc.saturating_mul(10) + (b - b'0') as u64);
    if value > 65535 {
        return Err(Failure::new(ParseError::InvalidTarget, offset + 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn parses_simple_origin_form() {
        let data = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
        let (rl, consumed) = try_parse(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(rl.method.resolve(data), b"GET");
        assert_eq!(rl.target.resolve(data), b"/");
        assert_eq!(rl.target_form, TargetForm::Origin);
        assert_eq!(rl.version, Version::HTTP_1_1);
    }

    #[test]
    fn needs_more_data_without_crlf() {
        let data = b"GET / HTTP/1.1";
        assert!(try_parse(data, 0, &cfg()).unwrap().is_none());
    }

    #[test]
    fn asterisk_form() {
        let data = b"OPTIONS * HTTP/1.1\r\n";
        let (rl, _) = try_parse(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(rl.target_form, TargetForm::Asterisk);
    }

    #[test]
    fn authority_form_with_port() {
        let data = b"CONNECT example.com:443 HTTP/1.1\r\n";
        let (rl, _) = try_parse(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(rl.target_form, TargetForm::Authority);
    }

    #[test]
    fn absolute_form() {
        let data = b"GET http://example.com/path HTTP/1.1\r\n";
        let (rl, _) = try_parse(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(rl.target_form, TargetForm::Absolute);
    }

    #[test]
    fn rejects_http2_major_version() {
        let data = b"GET / HTTP/2.0\r\n";
        let err = try_parse(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidVersion);
    }

    #[test]
    fn rejects_empty_method() {
        let data = b" / HTTP/1.1\r\n";
        let err = try_parse(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidMethod);
    }

    #[test]
    fn rejects_fragment_in_origin_form() {
        let data = b"GET /a#b HTTP/1.1\r\n";
        let err = try_parse(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidTarget);
    }

    #[test]
    fn rejects_bad_percent_encoding() {
        let data = b"GET /a%2 HTTP/1.1\r\n";
        let err = try_parse(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidTarget);
    }

    #[test]
    fn request_line_too_long_fails_before_seeing_crlf() {
        let mut cfg = cfg();
        cfg.max_request_line_len = 8;
        let data = b"GET /abcdefghijklmnop HTTP/1.1\r\n";
        let err = try_parse(data, 0, &cfg).unwrap_err();
        assert_eq!(err.error, ParseError::RequestLineTooLong);
    }
}
