//! Chunked transfer-coding: chunk-size lines (with chunk-extensions) and
//! the CRLF terminator following each chunk's data (spec §4.7). Trailers
//! are header-section lines and are driven by the caller through
//! [`crate::headers::try_parse_one`] once the last (zero-length) chunk is
//! seen.

use crate::classify::{is_ctl, is_hexdig, is_tchar};
use crate::config::ParserConfig;
use crate::error::{Failure, PResult, ParseError};
use crate::simd::find_line_ending;

/// A 64-bit chunk-size can never need more than 16 hex digits.
const MAX_SIZE_DIGITS: usize = 16;

/// Parse one chunk-size line: `1*HEXDIG *( ";" chunk-ext ) CRLF`.
///
/// Returns `(size, consumed)` on success; `size == 0` marks the last
/// chunk, after which the caller reads trailers instead of chunk data.
pub fn try_parse_chunk_size(
    data: &[u8],
    base: usize,
    config: &ParserConfig,
) -> PResult<Option<(u64, usize)>> {
    let (line_len, term_len) = match find_line_ending(data, config.strict_crlf) {
        Some(hit) => hit,
        None => {
            let bound = MAX_SIZE_DIGITS + 1 + config.max_chunk_ext_len;
            if data.len() >= bound {
                return Err(Failure::new(ParseError::InvalidChunkSize, base + data.len()));
            }
            return Ok(None);
        }
    };
    let line = &data[..line_len];
    let ext_start = line.iter().position(|&b| b == b';').unwrap_or(line.len());
    let size_bytes = &line[..ext_start];

    if size_bytes.is_empty() || !size_bytes.iter().all(|&b| is_hexdig(b)) {
        return Err(Failure::new(ParseError::InvalidChunkSize, base));
    }
    if size_bytes.len() > MAX_SIZE_DIGITS {
        return Err(Failure::new(ParseError::ChunkSizeOverflow, base));
    }
    let mut size: u64 = 0;
    for &b in size_bytes {
        let digit = crate::classify::hex_value(b).unwrap() as u64;
        size = size
            .checked_shl(4)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Failure::new(ParseError::ChunkSizeOverflow, base))?;
    }

    let ext_bytes = &line[ext_start..];
    if ext_bytes.len() > config.max_chunk_ext_len {
        return Err(Failure::new(ParseError::ChunkExtTooLong, base + ext_start));
    }
    validate_chunk_ext(ext_bytes, base + ext_start)?;

    Ok(Some((size, line_len + term_len)))
}

/// `*( ";" chunk-ext-name [ "=" chunk-ext-val ] )`.
fn validate_chunk_ext(bytes: &[u8], offset: usize) -> PResult<()> {
    let mut idx = 0usize;
    while idx < bytes.len() {
        if bytes[idx] != b';' {
            return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx));
        }
        idx += 1;
        let name_start = idx;
        while idx < bytes.len() && is_tchar(bytes[idx]) {
            idx += 1;
        }
        if idx == name_start {
            return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx));
        }
        if idx < bytes.len() && bytes[idx] == b'=' {
            idx += 1;
            if idx < bytes.len() && bytes[idx] == b'"' {
                idx += 1;
                loop {
                    if idx >= bytes.len() {
                        return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx));
                    }
                    match bytes[idx] {
                        b'"' => {
                            idx += 1;
                            break;
                        }
                        b'\\' => {
                            idx += 1;
                            if idx >= bytes.len() || is_ctl(bytes[idx]) {
                                return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx));
                            }
                            idx += 1;
                        }
                        b if is_ctl(b) => {
                            return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx))
                        }
                        _ => idx += 1,
                    }
                }
            } else {
                let val_start = idx;
                while idx < bytes.len() && is_tchar(bytes[idx]) {
                    idx += 1;
                }
                if idx == val_start {
                    return Err(Failure::new(ParseError::InvalidChunkExt, offset + idx));
                }
            }
        }
    }
    Ok(())
}

/// Consume the CRLF (or bare LF, if tolerant) following a chunk's data.
/// Returns `Ok(None)` if fewer than `term_len` bytes are available yet.
pub fn try_parse_chunk_terminator(
    data: &[u8],
    base: usize,
    config: &ParserConfig,
) -> PResult<Option<usize>> {
    if config.strict_crlf {
        if data.len() < 2 {
            return Ok(None);
        }
        if data[0] == b'\r' && data[1] == b'\n' {
            Ok(Some(2))
        } else {
            Err(Failure::new(ParseError::InvalidChunkData, base))
        }
    } else {
        if data.is_empty() {
            return Ok(None);
        }
        if data[0] == b'\n' {
            return Ok(Some(1));
        }
        if data[0] == b'\r' {
            if data.len() < 2 {
                return Ok(None);
            }
            return if data[1] == b'\n' {
                Ok(Some(2))
            } else {
                Err(Failure::new(ParseError::InvalidChunkData, base))
            };
        }
        Err(Failure::new(ParseError::InvalidChunkData, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn parses_simple_chunk_size() {
        let data = b"1a\r\n";
        let (size, consumed) = try_parse_chunk_size(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(size, 0x1a);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn parses_last_chunk() {
        let data = b"0\r\n";
        let (size, _) = try_parse_chunk_size(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(size, 0);
    }

    #[test]
    fn parses_chunk_ext() {
        let data = b"4;foo=bar\r\n";
        let (size, consumed) = try_parse_chunk_size(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(size, 4);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn parses_quoted_chunk_ext_value() {
        let data = b"4;foo=\"b a;r\"\r\n";
        let (size, _) = try_parse_chunk_size(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn rejects_non_hex_size() {
        let data = b"zz\r\n";
        let err = try_parse_chunk_size(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidChunkSize);
    }

    #[test]
    fn rejects_overflowing_size() {
        let data = b"ffffffffffffffffff\r\n";
        let err = try_parse_chunk_size(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::ChunkSizeOverflow);
    }

    #[test]
    fn needs_more_data_without_terminator() {
        let data = b"4";
        assert!(try_parse_chunk_size(data, 0, &cfg()).unwrap().is_none());
    }

    #[test]
    fn chunk_ext_too_long_is_rejected() {
        let mut cfg = cfg();
        cfg.max_chunk_ext_len = 4;
        let data = b"4;foo=barbaz\r\n";
        let err = try_parse_chunk_size(data, 0, &cfg).unwrap_err();
        assert_eq!(err.error, ParseError::ChunkExtTooLong);
    }

    #[test]
    fn terminator_accepts_crlf() {
        let data = b"\r\nrest";
        let consumed = try_parse_chunk_terminator(data, 0, &cfg()).unwrap().unwrap();
        assert_eq!(consumed, 2);
    }

    #[test]
    fn terminator_rejects_lone_lf_in_strict_mode() {
        let data = b"\nrest";
        let err = try_parse_chunk_terminator(data, 0, &cfg()).unwrap_err();
        assert_eq!(err.error, ParseError::InvalidChunkData);
    }
}
