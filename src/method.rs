//! Recognized HTTP request methods.
//!
//! The table mirrors the historical `http_parser` method set (see
//! `original_source/http_parser.h`'s `enum http_method`): a small fixed
//! list of literals matched as whole tokens, not an open-ended registry.

/// A recognized HTTP request method.
///
/// Values are not meaningful as bitflags here (unlike the C original, which
/// packed them into a `u16` bitmask); the ordering is simply declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Delete,
    Get,
    Head,
    Post,
    Put,
    Connect,
    Options,
    Trace,
    Copy,
    Lock,
    Mkcol,
    Move,
    Propfind,
    Proppatch,
    Unlock,
}

impl Method {
    /// Longest recognized method literal, in bytes. Used to size the
    /// request-line scratch buffer and as the default `max_method_len`.
    pub const MAX_LEN: usize = 9; // "PROPPATCH"

    /// Match a complete, uppercase ASCII method literal.
    ///
    /// Returns `None` for anything not in the fixed table; the caller decides
    /// whether that is fatal (strict mode) or merely unclassified.
    pub fn from_bytes(buf: &[u8]) -> Option<Method> {
        match buf {
            b"DELETE" => Some(Method::Delete),
            b"GET" => Some(Method::Get),
            b"HEAD" => Some(Method::Head),
            b"POST" => Some(Method::Post),
            b"PUT" => Some(Method::Put),
            b"CONNECT" => Some(Method::Connect),
            b"OPTIONS" => Some(Method::Options),
            b"TRACE" => Some(Method::Trace),
            b"COPY" => Some(Method::Copy),
            b"LOCK" => Some(Method::Lock),
            b"MKCOL" => Some(Method::Mkcol),
            b"MOVE" => Some(Method::Move),
            b"PROPFIND" => Some(Method::Propfind),
            b"PROPPATCH" => Some(Method::Proppatch),
            b"UNLOCK" => Some(Method::Unlock),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Copy => "COPY",
            Method::Lock => "LOCK",
            Method::Mkcol => "MKCOL",
            Method::Move => "MOVE",
            Method::Propfind => "PROPFIND",
            Method::Proppatch => "PROPPATCH",
            Method::Unlock => "UNLOCK",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"GET", Some(Method::Get))]
    #[case(b"POST", Some(Method::Post))]
    #[case(b"PROPPATCH", Some(Method::Proppatch))]
    #[case(b"BREW", None)]
    #[case(b"get", None)]
    fn recognizes_table(#[case] input: &[u8], #[case] expected: Option<Method>) {
        assert_eq!(Method::from_bytes(input), expected);
    }

    #[test]
    fn roundtrips_as_str() {
        for &m in &[Method::Get, Method::Proppatch, Method::Unlock] {
            assert_eq!(Method::from_bytes(m.as_str().as_bytes()), Some(m));
        }
    }
}
