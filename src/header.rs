//! Framing-header recognition (spec §4.2).
//!
//! Runs alongside the header field/value callbacks without altering what
//! gets streamed to the caller: it only watches for the four header names
//! the framing controller needs, matching case-insensitively the way the
//! teacher crate's `bstr`-backed `Header`/`Name` comparisons do in
//! `headers.rs`.

use bstr::ByteSlice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingHeader {
    ContentLength,
    TransferEncoding,
    Connection,
    Upgrade,
    /// Matched against the table so far but not yet complete.
    Unresolved,
    /// Diverged from every entry in the table; value bytes are streamed to
    /// the caller but ignored for framing.
    General,
}

/// Incremental case-insensitive classifier for one header field name.
///
/// Feed it the field-name bytes as they arrive (they may span several
/// `execute` calls); `finish` reports which framing header, if any, matched
/// exactly.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    candidates: Vec<&'static [u8]>,
    matched_len: usize,
}

const CANDIDATES: &[&[u8]] = &[
    b"Content-Length",
    b"Transfer-Encoding",
    b"Connection",
    b"Upgrade",
];

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NameMatcher {
    pub fn new() -> NameMatcher {
        NameMatcher {
            candidates: CANDIDATES.to_vec(),
            matched_len: 0,
        }
    }

    pub fn feed(&mut self, byte: u8) {
        if self.candidates.is_empty() {
            return;
        }
        let pos = self.matched_len;
        self.candidates.retain(|c| {
            pos < c.len() && c[pos].eq_ignore_ascii_case(&byte)
        });
        self.matched_len += 1;
    }

    pub fn finish(&self) -> FramingHeader {
        for c in &self.candidates {
            if c.len() == self.matched_len {
                return match *c {
                    b"Content-Length" => FramingHeader::ContentLength,
                    b"Transfer-Encoding" => FramingHeader::TransferEncoding,
                    b"Connection" => FramingHeader::Connection,
                    b"Upgrade" => FramingHeader::Upgrade,
                    _ => FramingHeader::General,
                };
            }
        }
        if self.candidates.is_empty() {
            FramingHeader::General
        } else {
            // Prefix of a candidate but not a full match (e.g. "Content-Type"
            // diverging partway is already excluded by retain(); this only
            // happens if the name byte stream ended early).
            FramingHeader::General
        }
    }
}

/// True if `token` (case-insensitive) equals `"chunked"`.
pub fn is_chunked_token(token: &[u8]) -> bool {
    token.trim().eq_ignore_ascii_case(b"chunked")
}

/// Split a `Connection`/`Transfer-Encoding` value on commas, trimming OWS
/// around each token.
pub fn comma_tokens(value: &[u8]) -> impl Iterator<Item = &[u8]> {
    value.split_str(",").map(|t| t.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classify(name: &[u8]) -> FramingHeader {
        let mut m = NameMatcher::new();
        for &b in name {
            m.feed(b);
        }
        m.finish()
    }

    #[rstest]
    #[case(b"Content-Length", FramingHeader::ContentLength)]
    #[case(b"content-length", FramingHeader::ContentLength)]
    #[case(b"CONTENT-LENGTH", FramingHeader::ContentLength)]
    #[case(b"Transfer-Encoding", FramingHeader::TransferEncoding)]
    #[case(b"Connection", FramingHeader::Connection)]
    #[case(b"Upgrade", FramingHeader::Upgrade)]
    #[case(b"Host", FramingHeader::General)]
    #[case(b"Content-Type", FramingHeader::General)]
    fn classifies(#[case] name: &[u8], #[case] expected: FramingHeader) {
        assert_eq!(classify(name), expected);
    }

    #[test]
    fn chunked_token_is_case_insensitive() {
        assert!(is_chunked_token(b"chunked"));
        assert!(is_chunked_token(b"CHUNKED"));
        assert!(is_chunked_token(b" Chunked "));
        assert!(!is_chunked_token(b"gzip"));
    }

    #[test]
    fn splits_connection_tokens() {
        let tokens: Vec<&[u8]> = comma_tokens(b"keep-alive, Upgrade").collect();
        assert_eq!(tokens, vec![b"keep-alive".as_slice(), b"Upgrade".as_slice()]);
    }
}
