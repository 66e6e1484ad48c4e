//! Internal error taxonomy.
//!
//! `Error` is deliberately not part of the minimal public contract described
//! in the spec's Error Handling Design: callers detect failure via
//! `consumed < data.len() && !upgrade`. This enum exists for
//! `Parser::last_error` introspection and for internal `log` diagnostics,
//! the same "diagnose without widening the callback surface" role the
//! teacher crate's `htp_log_t`/`HtpLogCode` machinery plays.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid byte {byte:#04x} in state {state}")]
    Grammar { byte: u8, state: &'static str },

    #[error("conflicting Content-Length values")]
    ConflictingContentLength,

    #[error("header block exceeded {limit} bytes")]
    HeaderTooLarge { limit: u32 },

    #[error("callback rejected input")]
    CallbackRejected,

    #[error("unrecognized method")]
    UnknownMethod,

    #[error("malformed chunk size")]
    MalformedChunkSize,

    #[error("malformed request or status line")]
    MalformedStartLine,
}

/// Returned by callbacks to request that the parser stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop;
