//! Parsed-request data model: spans, headers, flags, and the `Request`
//! container itself (spec §3).

use crate::span::Span;

/// Defines a minimal hand-rolled bitflags-style newtype over an integer,
/// matching the small, dependency-free data types this crate otherwise
/// favors over pulling in a `bitflags` crate the teacher's own
/// dependency set never reached for.
macro_rules! bitfield_type {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) {
            $(
                $(#[$cmeta:meta])*
                const $cname:ident = $cval:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(pub $repr);

        impl $name {
            $(
                $(#[$cmeta])*
                pub const $cname: $name = $name($cval);
            )*

            #[inline]
            pub fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            #[inline]
            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            #[inline]
            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            #[inline]
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// KnownHeader
// ---------------------------------------------------------------------------

/// The six header kinds the parser itself interprets, plus a catch-all for
/// everything else. Order matches `Request::known_idx`'s index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KnownHeader {
    Host = 0,
    ContentLength = 1,
    TransferEncoding = 2,
    Connection = 3,
    Expect = 4,
    Upgrade = 5,
    Other = 6,
}

const KNOWN_NAMES: [&[u8]; 6] = [
    b"host",
    b"content-length",
    b"transfer-encoding",
    b"connection",
    b"expect",
    b"upgrade",
];

impl KnownHeader {
    /// Classify a header name by case-insensitive comparison against the
    /// six known names.
    pub fn from_name(name: &[u8]) -> KnownHeader {
        for (idx, known) in KNOWN_NAMES.iter().enumerate() {
            if eq_ignore_ascii_case(name, known) {
                return match idx {
                    0 => KnownHeader::Host,
                    1 => KnownHeader::ContentLength,
                    2 => KnownHeader::TransferEncoding,
                    3 => KnownHeader::Connection,
                    4 => KnownHeader::Expect,
                    _ => KnownHeader::Upgrade,
                };
            }
        }
        KnownHeader::Other
    }

    /// Index into `Request::known_idx`, if this is one of the six kinds.
    pub fn index(&self) -> Option<usize> {
        if *self == KnownHeader::Other {
            None
        } else {
            Some(*self as usize)
        }
    }
}

/// Case-insensitive ASCII byte-slice comparison (header names are always
/// ASCII tokens, so no full Unicode case-folding is needed or correct).
#[inline]
pub fn eq_ignore_ascii_case(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

bitfield_type! {
    /// Per-header bit flags.
    pub struct HeaderFlags(u16) {
        /// Set when `name_id` identifies one of the six known headers.
        const KNOWN_NAME = 1 << 0;
    }
}

/// A single parsed header field: zero-copy spans into the input buffer
/// plus the classification computed while scanning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub name: Span,
    pub value: Span,
    pub name_id: KnownHeader,
    pub flags: HeaderFlags,
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// HTTP/1.x version, packed as `major << 8 | minor` where exposed as a
/// single integer (spec §3: "major in high byte, minor in low byte").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_1_0: Version = Version { major: 1, minor: 0 };
    pub const HTTP_1_1: Version = Version { major: 1, minor: 1 };

    #[inline]
    pub fn packed(&self) -> u16 {
        ((self.major as u16) << 8) | self.minor as u16
    }

    /// `true` for HTTP/1.1 and above — the version at and above which
    /// persistent connections are the default and `Expect: 100-continue`
    /// is meaningful.
    #[inline]
    pub fn at_least_1_1(&self) -> bool {
        self.major > 1 || (self.major == 1 && self.minor >= 1)
    }
}

// ---------------------------------------------------------------------------
// TargetForm / BodyType
// ---------------------------------------------------------------------------

/// The four request-target forms of RFC 9112 §3.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    Origin,
    Absolute,
    Authority,
    Asterisk,
}

/// How the request body (if any) is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    None,
    ContentLength,
    Chunked,
}

// ---------------------------------------------------------------------------
// RequestFlags
// ---------------------------------------------------------------------------

bitfield_type! {
    /// Request-level bit flags.
    pub struct RequestFlags(u16) {
        /// The connection should remain open after this request completes.
        const KEEP_ALIVE = 1 << 0;
        /// `Expect: 100-continue` was present on an HTTP/1.1+ request.
        const EXPECT_CONTINUE = 1 << 1;
        /// An `Upgrade` header was present; the caller must abandon this
        /// parser after any protocol switch.
        const HAS_UPGRADE = 1 << 2;
        const HAS_HOST = 1 << 3;
        const HAS_CONTENT_LENGTH = 1 << 4;
        const HAS_TRANSFER_ENCODING = 1 << 5;
        const IS_CHUNKED = 1 << 6;
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A fully- or partially-parsed HTTP request. Spans are only meaningful
/// when resolved against the most recent input buffer (spec §3).
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Span,
    pub target: Span,
    pub content_length: u64,
    pub version: Version,
    pub target_form: Option<TargetForm>,
    pub body_type: Option<BodyType>,
    pub flags: RequestFlags,
    /// Index into `headers` of each known header kind's first occurrence.
    pub known_idx: [Option<u32>; 6],
    pub headers: Vec<Header>,
    pub trailers: Vec<Header>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            method: Span::EMPTY,
            target: Span::EMPTY,
            content_length: 0,
            version: Version::default(),
            target_form: None,
            body_type: None,
            flags: RequestFlags::default(),
            known_idx: [None; 6],
            headers: Vec::with_capacity(16),
            trailers: Vec::with_capacity(8),
        }
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn trailer_count(&self) -> usize {
        self.trailers.len()
    }

    /// Reset to the empty state for reuse, preserving `headers`/`trailers`
    /// allocated capacity (mirrors `Parser::reset`'s contract).
    pub fn reset(&mut self) {
        self.method = Span::EMPTY;
        self.target = Span::EMPTY;
        self.content_length = 0;
        self.version = Version::default();
        self.target_form = None;
        self.body_type = None;
        self.flags = RequestFlags::default();
        self.known_idx = [None; 6];
        self.headers.clear();
        self.trailers.clear();
    }

    /// Record `idx` as the first occurrence of `kind`, if not already set.
    pub fn note_known_header(&mut self, kind: KnownHeader, idx: usize) {
        if let Some(slot) = kind.index() {
            if self.known_idx[slot].is_none() {
                self.known_idx[slot] = Some(idx as u32);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup utilities (spec §6: header_name_eq / find_header)
// ---------------------------------------------------------------------------

/// Case-insensitive comparison of a header name span against a literal
/// name.
#[inline]
pub fn header_name_eq(base: &[u8], span: Span, name: &[u8]) -> bool {
    eq_ignore_ascii_case(span.resolve(base), name)
}

/// Index of the first header in `req.headers` whose name case-insensitively
/// equals `name`, or `None`.
pub fn find_header(req: &Request, base: &[u8], name: &[u8]) -> Option<usize> {
    req.headers
        .iter()
        .position(|h| header_name_eq(base, h.name, name))
}

/// Index of the first trailer in `req.trailers` whose name
/// case-insensitively equals `name`, or `None`.
pub fn find_trailer(req: &Request, base: &[u8], name: &[u8]) -> Option<usize> {
    req.trailers
        .iter()
        .position(|h| header_name_eq(base, h.name, name))
}

// ---------------------------------------------------------------------------
// Owned snapshot (one-shot convenience layer, spec §9)
// ---------------------------------------------------------------------------

/// An owned, borrow-free header: a copy of a [`Header`]'s spans resolved
/// against the buffer they were cut from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OwnedHeader {
    pub name: String,
    pub value: String,
}

/// A fully owned snapshot of a [`Request`], for callers who don't want to
/// manage the lifetime of the buffer a [`crate::parser::Parser`] borrows
/// against. Produced once, after parsing completes; never used on the
/// streaming hot path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OwnedRequest {
    pub method: String,
    pub target: String,
    pub version_major: u8,
    pub version_minor: u8,
    pub headers: Vec<OwnedHeader>,
    pub trailers: Vec<OwnedHeader>,
    #[serde(with = "serde_bytes_body")]
    pub body: Vec<u8>,
    pub keep_alive: bool,
}

impl OwnedRequest {
    /// Snapshot `req` (resolving its spans against `base`) together with
    /// an already-decoded `body`.
    pub fn from_request(req: &Request, base: &[u8], body: Vec<u8>) -> Self {
        let to_owned = |h: &Header| OwnedHeader {
            name: String::from_utf8_lossy(h.name.resolve(base)).into_owned(),
            value: String::from_utf8_lossy(h.value.resolve(base)).into_owned(),
        };
        Self {
            method: String::from_utf8_lossy(req.method.resolve(base)).into_owned(),
            target: String::from_utf8_lossy(req.target.resolve(base)).into_owned(),
            version_major: req.version.major,
            version_minor: req.version.minor,
            headers: req.headers.iter().map(to_owned).collect(),
            trailers: req.trailers.iter().map(to_owned).collect(),
            body,
            keep_alive: req.flags.contains(RequestFlags::KEEP_ALIVE),
        }
    }

    /// Case-insensitive lookup of the first header with this name,
    /// mirroring [`find_header`] for the owned/zero-copy-free variant.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Renders `body` as a UTF-8-lossy string in JSON/serde output, matching
/// the teacher CLI's existing binary-body handling in `format_debug`.
mod serde_bytes_body {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(String::deserialize(deserializer)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_header_classification_is_case_insensitive() {
        assert_eq!(KnownHeader::from_name(b"Host"), KnownHeader::Host);
        assert_eq!(KnownHeader::from_name(b"CONTENT-LENGTH"), KnownHeader::ContentLength);
        assert_eq!(KnownHeader::from_name(b"x-custom"), KnownHeader::Other);
    }

    #[test]
    fn version_packs_major_high_minor_low() {
        assert_eq!(Version::HTTP_1_1.packed(), 0x0101);
        assert_eq!(Version::HTTP_1_0.packed(), 0x0100);
        assert!(Version::HTTP_1_1.at_least_1_1());
        assert!(!Version::HTTP_1_0.at_least_1_1());
    }

    #[test]
    fn request_flags_round_trip() {
        let mut flags = RequestFlags::default();
        assert!(!flags.contains(RequestFlags::KEEP_ALIVE));
        flags.insert(RequestFlags::KEEP_ALIVE);
        assert!(flags.contains(RequestFlags::KEEP_ALIVE));
        flags.remove(RequestFlags::KEEP_ALIVE);
        assert!(!flags.contains(RequestFlags::KEEP_ALIVE));
    }

    #[test]
    fn known_idx_records_first_occurrence_only() {
        let mut req = Request::new();
        req.note_known_header(KnownHeader::Host, 0);
        req.note_known_header(KnownHeader::Host, 3);
        assert_eq!(req.known_idx[KnownHeader::Host.index().unwrap()], Some(0));
    }

    #[test]
    fn reset_preserves_vec_capacity() {
        let mut req = Request::new();
        req.headers.push(Header {
            name: Span::EMPTY,
            value: Span::EMPTY,
            name_id: KnownHeader::Host,
            flags: HeaderFlags::KNOWN_NAME,
        });
        let cap_before = req.headers.capacity();
        req.reset();
        assert_eq!(req.headers.len(), 0);
        assert_eq!(req.headers.capacity(), cap_before);
    }

    #[test]
    fn owned_request_resolves_spans_and_looks_up_headers() {
        let base = b"GET /x HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut req = Request::new();
        req.method = Span::new(0, 3);
        req.target = Span::new(4, 2);
        req.version = Version::HTTP_1_1;
        req.headers.push(Header {
            name: Span::new(17, 4),
            value: Span::new(23, 11),
            name_id: KnownHeader::Host,
            flags: HeaderFlags::KNOWN_NAME,
        });
        req.flags.insert(RequestFlags::KEEP_ALIVE);

        let owned = OwnedRequest::from_request(&req, base, Vec::new());
        assert_eq!(owned.method, "GET");
        assert_eq!(owned.target, "/x");
        assert_eq!(owned.header("host"), Some("example.com"));
        assert!(owned.keep_alive);
    }
}
