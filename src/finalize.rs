//! Post-header-section semantic checks: Host presence/uniqueness,
//! Content-Length parsing and agreement, Transfer-Encoding parsing and its
//! interaction with Content-Length, method/target-form compatibility, and
//! the resulting body-framing and connection-lifecycle flags (spec §4.4,
//! §4.5).

use crate::classify::is_digit;
use crate::config::ParserConfig;
use crate::error::{Failure, PResult, ParseError};
use crate::span::Span;
use crate::types::{find_header, BodyType, KnownHeader, Request, RequestFlags, TargetForm};

/// Run every cross-header semantic check and populate `req.body_type`,
/// `req.content_length`, and the framing-related `RequestFlags`.
///
/// Called once, after the empty line ending the header section has been
/// consumed and before body framing begins.
pub fn finalize(req: &mut Request, base: &[u8], config: &ParserConfig) -> PResult<()> {
    check_method_target_compatibility(req, base)?;
    check_host(req, base)?;
    let te_present = check_transfer_encoding(req, base)?;
    let cl_value = check_content_length(req, base)?;

    if te_present && cl_value.is_some() && config.reject_te_cl_conflict {
        return Err(Failure::new(ParseError::TeClConflict, 0));
    }

    let body_type = match (te_present, cl_value) {
        (true, _) => {
            // Transfer-Encoding wins over a disagreeing Content-Length when
            // the conflict is tolerated rather than rejected above.
            req.flags.insert(RequestFlags::IS_CHUNKED);
            BodyType::Chunked
        }
        (false, Some(len)) => {
            req.content_length = len;
            BodyType::ContentLength
        }
        (false, None) => BodyType::None,
    };
    req.body_type = Some(body_type);

    check_expect(req, base)?;
    determine_keep_alive(req, base);
    check_upgrade(req, base);

    Ok(())
}

fn check_method_target_compatibility(req: &Request, base: &[u8]) -> PResult<()> {
    let method = req.method.resolve(base);
    let form = req.target_form;
    match form {
        Some(TargetForm::Asterisk) if method != b"OPTIONS" => {
            Err(Failure::new(ParseError::InvalidTarget, req.target.offset as usize))
        }
        Some(TargetForm::Authority) if method != b"CONNECT" => {
            Err(Failure::new(ParseError::InvalidTarget, req.target.offset as usize))
        }
        Some(TargetForm::Origin) | Some(TargetForm::Absolute) if method == b"CONNECT" => {
            Err(Failure::new(ParseError::InvalidTarget, req.target.offset as usize))
        }
        _ => Ok(()),
    }
}

fn check_host(req: &mut Request, base: &[u8]) -> PResult<()> {
    let host_idx = KnownHeader::Host.index().unwrap();
    let mut count = 0usize;
    let mut first: Option<usize> = None;
    for (i, h) in req.headers.iter().enumerate() {
        if h.name_id == KnownHeader::Host {
            count += 1;
            if first.is_none() {
                first = Some(i);
            }
        }
    }
    if count > 1 {
        return Err(Failure::new(ParseError::MultipleHost, 0));
    }
    match first {
        Some(i) => {
            req.flags.insert(RequestFlags::HAS_HOST);
            req.known_idx[host_idx] = Some(i as u32);
            validate_host_value(req.headers[i].value, base)?;
            Ok(())
        }
        None if req.version.at_least_1_1() => Err(Failure::new(ParseError::MissingHost, 0)),
        None => Ok(()),
    }
}

fn validate_host_value(span: Span, base: &[u8]) -> PResult<()> {
    let value = span.resolve(base);
    let invalid = || Failure::new(ParseError::InvalidHost, span.offset as usize);
    if value.is_empty() {
        return Err(invalid());
    }

    let port = if value[0] == b'[' {
        let close = value.iter().position(|&b| b == b']').ok_or_else(invalid)?;
        if close == 1 {
            return Err(invalid());
        }
        let interior = &value[1..close];
        if !interior
            .iter()
            .all(|&b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
        {
            return Err(invalid());
        }
        &value[close + 1..]
    } else {
        // reg-name / port: reject whitespace and control bytes, which cannot
        // appear here (the header-value scanner already excludes raw CTL, but
        // SP/HTAB survive trimming only at the edges, not embedded).
        if value.iter().any(|&b| b == b' ' || b == b'\t') {
            return Err(invalid());
        }
        match value.iter().position(|&b| b == b':') {
            Some(colon) => &value[colon..],
            None => return Ok(()),
        }
    };

    if port.is_empty() {
        return Ok(());
    }
    if port[0] != b':' {
        return Err(invalid());
    }
    let digits = &port[1..];
    if digits.is_empty() || digits.len() > 5 || !digits.iter().all(|&b| is_digit(b)) {
        return Err(invalid());
    }
    let port_value = digits
        .iter()
        .fold(0u32, |acc, &b| acc * 10 + (b - b'0') as u32);
    if port_value > 65535 {
        return Err(invalid());
    }
    Ok(())
}

/// Returns `true` if a (validated) `Transfer-Encoding` header is present.
fn check_transfer_encoding(req: &Request, base: &[u8]) -> PResult<bool> {
    let te_idx = KnownHeader::TransferEncoding.index().unwrap();
    let present = req.known_idx[te_idx].is_some();
    if !present {
        return Ok(false);
    }
    // Concatenate all Transfer-Encoding header occurrences with comma
    // separators, matching RFC 9110 §5.3's field-combination rule, then
    // split on commas to get the coding list.
    let mut codings: Vec<&[u8]> = Vec::new();
    for h in &req.headers {
        if h.name_id == KnownHeader::TransferEncoding {
            for part in h.value.resolve(base).split(|&b| b == b',') {
                let trimmed = trim_ows(part);
                if !trimmed.is_empty() {
                    codings.push(trimmed);
                }
            }
        }
    }
    if codings.is_empty() {
        return Err(Failure::new(ParseError::InvalidTransferEncoding, 0));
    }
    let last = *codings.last().unwrap();
    if !last.eq_ignore_ascii_case(b"chunked") {
        return Err(Failure::new(ParseError::TeNotChunkedFinal, 0));
    }
    for coding in &codings[..codings.len() - 1] {
        if !is_known_transfer_coding(coding) {
            return Err(Failure::new(ParseError::UnknownTransferCoding, 0));
        }
    }
    Ok(true)
}

fn is_known_transfer_coding(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"chunked")
        || name.eq_ignore_ascii_case(b"gzip")
        || name.eq_ignore_ascii_case(b"deflate")
        || name.eq_ignore_ascii_case(b"compress")
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = bytes.len();
    while start < end && (bytes[start] == b' ' || bytes[start] == b'\t') {
        start += 1;
    }
    while end > start && (bytes[end - 1] == b' ' || bytes[end - 1] == b'\t') {
        end -= 1;
    }
    &bytes[start..end]
}

/// Returns the agreed Content-Length value, if any header of that name was
/// present and every occurrence agrees.
fn check_content_length(req: &Request, base: &[u8]) -> PResult<Option<u64>> {
    let mut value: Option<u64> = None;
    let mut any = false;
    for h in &req.headers {
        if h.name_id == KnownHeader::ContentLength {
            any = true;
            let text = h.value.resolve(base);
            // A single Content-Length line may itself list the same value
            // comma-separated; every comma-separated value (here and across
            // repeated Content-Length lines) must agree.
            for part in text.split(|&b| b == b',') {
                let digits = trim_ows(part);
                if digits.is_empty() || !digits.iter().all(|&b| is_digit(b)) {
                    return Err(Failure::new(
                        ParseError::ContentLengthOverflow,
                        h.value.offset as usize,
                    ));
                }
                let parsed = parse_u64_strict(digits).ok_or_else(|| {
                    Failure::new(ParseError::ContentLengthOverflow, h.value.offset as usize)
                })?;
                match value {
                    None => value = Some(parsed),
                    Some(existing) if existing == parsed => {}
                    Some(_) => return Err(Failure::new(ParseError::MultipleContentLength, 0)),
                }
            }
        }
    }
    if !any {
        return Ok(None);
    }
    Ok(value)
}

fn parse_u64_strict(digits: &[u8]) -> Option<u64> {
    let mut acc: u64 = 0;
    for &b in digits {
        acc = acc.checked_mul(10)?.checked_add((b - b'0') as u64)?;
    }
    Some(acc)
}

fn check_expect(req: &mut Request, base: &[u8]) -> PResult<()> {
    if let Some(idx) = find_header(req, base, b"expect") {
        let value = req.headers[idx].value.resolve(base);
        if req.version.at_least_1_1() && value.eq_ignore_ascii_case(b"100-continue") {
            req.flags.insert(RequestFlags::EXPECT_CONTINUE);
        }
    }
    Ok(())
}

fn determine_keep_alive(req: &mut Request, base: &[u8]) {
    let connection_idx = KnownHeader::Connection.index().unwrap();
    let mut close = false;
    let mut keep_alive_token = false;
    if req.known_idx[connection_idx].is_some() {
        for h in &req.headers {
            if h.name_id == KnownHeader::Connection {
                for tok in h.value.resolve(base).split(|&b| b == b',') {
                    let tok = trim_ows(tok);
                    if tok.eq_ignore_ascii_case(b"close") {
                        close = true;
                    } else if tok.eq_ignore_ascii_case(b"keep-alive") {
                        keep_alive_token = true;
                    }
                }
            }
        }
    }
    let keep_alive = if close {
        false
    } else if req.version.at_least_1_1() {
        true
    } else {
        keep_alive_token
    };
    if keep_alive {
        req.flags.insert(RequestFlags::KEEP_ALIVE);
    } else {
        req.flags.remove(RequestFlags::KEEP_ALIVE);
    }
}

fn check_upgrade(req: &mut Request, base: &[u8]) {
    let _ = base;
    let upgrade_idx = KnownHeader::Upgrade.index().unwrap();
    if req.known_idx[upgrade_idx].is_some() {
        req.flags.insert(RequestFlags::HAS_UPGRADE);
    }
}
