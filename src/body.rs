//! Identity (Content-Length-framed) body reading.
//!
//! Chunked bodies are handled separately in [`crate::chunked`]; this module
//! only covers the simple "read exactly N bytes" case (spec §4.6).

/// How much of a fixed-length body `data` can satisfy right now.
pub struct IdentityProgress {
    /// Bytes of `data` that belong to the body and have been consumed.
    pub consumed: usize,
    /// `true` once `remaining` reaches zero after this call.
    pub complete: bool,
}

/// Feed up to `remaining` bytes of `data` into a Content-Length-framed
/// body, returning how many bytes were consumed and whether the body is
/// now complete. Never consumes more than `data.len()` or more than
/// `remaining`.
pub fn advance_identity(data: &[u8], remaining: u64) -> IdentityProgress {
    let take = (data.len() as u64).min(remaining) as usize;
    IdentityProgress {
        consumed: take,
        complete: take as u64 == remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_exactly_remaining_when_data_is_sufficient() {
        let data = b"hello world";
        let progress = advance_identity(data, 5);
        assert_eq!(progress.consumed, 5);
        assert!(progress.complete);
    }

    #[test]
    fn consumes_all_data_when_insufficient() {
        let data = b"hi";
        let progress = advance_identity(data, 10);
        assert_eq!(progress.consumed, 2);
        assert!(!progress.complete);
    }

    #[test]
    fn zero_length_body_is_immediately_complete() {
        let progress = advance_identity(b"", 0);
        assert_eq!(progress.consumed, 0);
        assert!(progress.complete);
    }
}
