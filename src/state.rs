//! The lexer's state graph.
//!
//! One big tagged enum driving a match-dispatch byte loop in `parser.rs`,
//! the same shape the distilled spec's Design Notes call out as option (a):
//! a giant `match` over a state tag, rather than a generated jump table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Terminal error/cancellation state. Every subsequent `execute` call
    /// returns 0 bytes consumed until `init`/`reset`.
    Dead,

    /// `Mode::Either` only: waiting for the first non-whitespace byte to
    /// decide between the request and response paths.
    StartReqOrRes,
    /// `Mode::Either` only: first byte was `H`; one more byte disambiguates.
    StartReqOrResH,
    StartReq,
    StartRes,

    ReqMethod,
    ReqSpacesBeforeUrl,
    /// Scanning the request-target; `Parser`'s internal `url_phase` tracks
    /// which sub-span (scheme/authority, path, query, fragment) is open.
    ReqUrl,
    /// Matching the `"HTTP/"` literal; `Parser`'s internal `index` tracks
    /// how many of its 5 bytes have matched so far.
    ReqHttpVersion,
    ReqHttpMajor,
    ReqHttpDot,
    ReqHttpMinor,
    ReqLineAlmostDone,

    ResHttpVersion,
    ResHttpMajor,
    ResHttpDot,
    ResHttpMinor,
    ResSpaceBeforeStatusCode,
    ResStatusCode,
    ResStatusLine,
    ResLineAlmostDone,

    HeaderFieldStart,
    HeaderField,
    HeaderValueDiscardWs,
    HeaderValueStart,
    HeaderValue,
    /// Saw `CRLF`; checking whether the next byte is SP/HTAB (obs-fold
    /// continuation), the start of a new header, or the blank line.
    HeaderValueLws,
    HeaderAlmostDone,
    HeadersAlmostDone,

    BodyIdentity,
    BodyIdentityEof,

    ChunkSizeStart,
    ChunkSize,
    ChunkExtension,
    ChunkSizeAlmostDone,
    ChunkData,
    ChunkDataAlmostDone,
    ChunkDataDone,

    MessageDone,
}

impl State {
    pub fn is_dead(self) -> bool {
        matches!(self, State::Dead)
    }
}

/// Sub-phase of request-target scanning while in `State::ReqUrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlPhase {
    /// Either an absolute-path target, or the scheme of an absolute-URI
    /// target, not yet disambiguated.
    SchemeOrPath,
    Authority,
    Path,
    Query,
    Fragment,
}
