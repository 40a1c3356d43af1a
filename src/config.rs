//! Parser configuration: size/count limits and behavior flags.

/// Configurable limits and behavior switches for [`crate::parser::Parser`].
///
/// All sizes are in bytes unless stated otherwise. Defaults match spec §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum length of the request-line, CRLF excluded (default: 8192).
    pub max_request_line_len: usize,
    /// Maximum length of a single header line, CRLF excluded (default: 8192).
    pub max_header_line_len: usize,
    /// Maximum accumulated size of the header section, including line
    /// terminators (default: 65536).
    pub max_headers_size: usize,
    /// Maximum number of header fields (default: 100).
    pub max_header_count: usize,
    /// Maximum body size, identity or chunked (default: `None`, unbounded).
    pub max_body_size: Option<u64>,
    /// Maximum total length of chunk-extensions on one chunk-size line
    /// (default: 1024).
    pub max_chunk_ext_len: usize,

    /// Require exact CRLF line endings. When `false`, a lone LF is also
    /// accepted as a line terminator (default: `true`).
    pub strict_crlf: bool,
    /// Reject obs-fold (header continuation lines starting with SP/HTAB).
    /// When `false`, such lines are skipped rather than rejected
    /// (default: `true`).
    pub reject_obs_fold: bool,
    /// Allow obs-text (0x80..=0xFF) in header field values (default: `true`).
    pub allow_obs_text: bool,
    /// Silently consume empty lines preceding the request-line
    /// (default: `true`).
    pub allow_leading_crlf: bool,
    /// Tolerate multiple SP/HTAB where the grammar requires exactly one SP,
    /// and trailing SP/HTAB before the request-line's CRLF (default: `false`).
    pub tolerate_spaces: bool,
    /// Reject a request carrying both Transfer-Encoding and Content-Length.
    /// When `false`, Transfer-Encoding is honored and the connection is
    /// marked non-keep-alive instead (default: `true`).
    pub reject_te_cl_conflict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_request_line_len: 8192,
            max_header_line_len: 8192,
            max_headers_size: 65536,
            max_header_count: 100,
            max_body_size: None,
            max_chunk_ext_len: 1024,

            strict_crlf: true,
            reject_obs_fold: true,
            allow_obs_text: true,
            allow_leading_crlf: true,
            tolerate_spaces: false,
            reject_te_cl_conflict: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let c = ParserConfig::default();
        assert_eq!(c.max_request_line_len, 8192);
        assert_eq!(c.max_header_line_len, 8192);
        assert_eq!(c.max_headers_size, 65536);
        assert_eq!(c.max_header_count, 100);
        assert_eq!(c.max_body_size, None);
        assert_eq!(c.max_chunk_ext_len, 1024);
        assert!(c.strict_crlf);
        assert!(c.reject_obs_fold);
        assert!(c.allow_obs_text);
        assert!(c.allow_leading_crlf);
        assert!(!c.tolerate_spaces);
        assert!(c.reject_te_cl_conflict);
    }
}
