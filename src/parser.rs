//! The parser state machine: `init`, `execute`, `should_keep_alive`.
//!
//! This is the crate's core (spec §4.1-§4.5): a byte-at-a-time transducer
//! with no lookahead and no retained borrows across calls. Body bytes are
//! bulk-sliced for throughput (the original C implementation does the same
//! for `BODY_IDENTITY`/`CHUNK_DATA`); everything else — request/status
//! line, headers, chunk framing — is driven one byte at a time because any
//! single byte may end a field.

use bstr::ByteSlice;
use log::{trace, warn};

use crate::config::Config;
use crate::error::{Error, Stop};
use crate::flags::Flags;
use crate::header::{comma_tokens, is_chunked_token, FramingHeader, NameMatcher};
use crate::mark::Marks;
use crate::method::Method;
use crate::settings::Settings;
use crate::state::{State, UrlPhase};
use crate::util::{is_digit, is_hex_digit, is_space_or_tab, is_token_char, is_upper_alpha};

/// Which side of the connection a `Parser` is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Request,
    Response,
    /// Ambiguous until the first byte: `H` followed by `T` is a response
    /// (`HTTP/...` status line), any other uppercase letter is a request
    /// method. See SPEC_FULL.md §9 for the one open question this leaves.
    Either,
}

const HTTP_LITERAL: &[u8] = b"HTTP/";

enum StepResult {
    Ok,
    CallbackStop,
    UpgradeExit,
    Error(Error),
}

/// Which field kind a committed span belongs to, for the generic `emit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Path,
    QueryString,
    Url,
    Fragment,
    HeaderField,
    HeaderValue,
}

pub struct Parser<T> {
    pub mode: Mode,
    pub state: State,
    pub config: Config,
    pub flags: Flags,
    pub nread: u32,
    pub content_length: Option<u64>,
    pub body_read: u64,
    pub chunk_remaining: u64,
    pub status_code: u16,
    pub method: Option<Method>,
    pub http_major: u16,
    pub http_minor: u16,
    pub upgrade: bool,
    pub user_data: Option<T>,
    pub error: Option<Error>,

    is_response: bool,
    index: usize,
    method_buf: Vec<u8>,
    marks: Marks,
    url_phase: UrlPhase,
    scheme_colon_seen: bool,
    scheme_slash1_seen: bool,
    header_name_matcher: NameMatcher,
    active_framing_header: FramingHeader,
    framing_value_buf: Vec<u8>,
}

impl<T> Parser<T> {
    pub fn init(mode: Mode, config: Config) -> Parser<T> {
        let mut p = Parser {
            mode,
            state: State::Dead,
            config,
            flags: Flags::empty(),
            nread: 0,
            content_length: None,
            body_read: 0,
            chunk_remaining: 0,
            status_code: 0,
            method: None,
            http_major: 0,
            http_minor: 0,
            upgrade: false,
            user_data: None,
            error: None,
            is_response: false,
            index: 0,
            method_buf: Vec::with_capacity(Method::MAX_LEN),
            marks: Marks::new(),
            url_phase: UrlPhase::Path,
            scheme_colon_seen: false,
            scheme_slash1_seen: false,
            header_name_matcher: NameMatcher::new(),
            active_framing_header: FramingHeader::Unresolved,
            framing_value_buf: Vec::new(),
        };
        p.reset(mode);
        p
    }

    /// Reinitialize an existing instance in place, equivalent to `init` but
    /// reusing the allocation and the caller's chosen `T`.
    pub fn reset(&mut self, mode: Mode) {
        self.mode = mode;
        self.state = self.start_state();
        self.flags.reset();
        self.nread = 0;
        self.content_length = None;
        self.body_read = 0;
        self.chunk_remaining = 0;
        self.status_code = 0;
        self.method = None;
        self.http_major = 0;
        self.http_minor = 0;
        self.upgrade = false;
        self.error = None;
        self.is_response = matches!(mode, Mode::Response);
        self.index = 0;
        self.method_buf.clear();
        self.marks.clear();
        self.scheme_colon_seen = false;
        self.scheme_slash1_seen = false;
        self.header_name_matcher = NameMatcher::new();
        self.active_framing_header = FramingHeader::Unresolved;
        self.framing_value_buf.clear();
    }

    fn start_state(&self) -> State {
        match self.mode {
            Mode::Request => State::StartReq,
            Mode::Response => State::StartRes,
            Mode::Either => State::StartReqOrRes,
        }
    }

    pub fn should_keep_alive(&self) -> bool {
        if self.http_major > 1 || (self.http_major == 1 && self.http_minor >= 1) {
            !self.flags.contains(Flags::CONNECTION_CLOSE)
        } else {
            self.flags.contains(Flags::CONNECTION_KEEP_ALIVE)
        }
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    fn die(&mut self, e: Error) {
        warn!("increhttp: parse error in state {:?}: {}", self.state, e);
        self.error = Some(e);
        self.state = State::Dead;
    }

    fn begin_next_message(&mut self) {
        trace!("increhttp: message complete, resetting for next message");
        self.flags.reset();
        self.nread = 0;
        self.content_length = None;
        self.body_read = 0;
        self.chunk_remaining = 0;
        self.status_code = 0;
        self.method = None;
        self.http_major = 0;
        self.http_minor = 0;
        self.index = 0;
        self.method_buf.clear();
        self.marks.clear();
        self.scheme_colon_seen = false;
        self.scheme_slash1_seen = false;
        self.header_name_matcher = NameMatcher::new();
        self.active_framing_header = FramingHeader::Unresolved;
        self.framing_value_buf.clear();
        self.state = self.start_state();
    }

    /// Reopen marks for fields that were still open at the end of the
    /// previous `execute` call, keyed off `state` rather than a separate
    /// "was open" flag (spec §4.4).
    fn reopen_marks(&mut self) {
        match self.state {
            State::ReqUrl => {
                if self.marks.url.is_none() {
                    self.marks.url = Some(0);
                }
                match self.url_phase {
                    UrlPhase::Path if self.marks.path.is_none() => self.marks.path = Some(0),
                    UrlPhase::Query if self.marks.query_string.is_none() => {
                        self.marks.query_string = Some(0)
                    }
                    UrlPhase::Fragment if self.marks.fragment.is_none() => {
                        self.marks.fragment = Some(0)
                    }
                    _ => {}
                }
            }
            State::HeaderField if self.marks.header_field.is_none() => {
                self.marks.header_field = Some(0);
            }
            State::HeaderValue if self.marks.header_value.is_none() => {
                self.marks.header_value = Some(0);
            }
            _ => {}
        }
    }

    /// Flush any span left open at the end of this call as a partial
    /// callback, so the next call starts clean (spec §4.4).
    fn flush_partial_marks(&mut self, settings: &mut Settings<T>, data: &[u8]) -> Result<(), Stop> {
        let end = data.len();
        if let Some(start) = self.marks.path.take() {
            self.emit(FieldKind::Path, settings, data, start, end)?;
        }
        if let Some(start) = self.marks.query_string.take() {
            self.emit(FieldKind::QueryString, settings, data, start, end)?;
        }
        if let Some(start) = self.marks.fragment.take() {
            self.emit(FieldKind::Fragment, settings, data, start, end)?;
        }
        if let Some(start) = self.marks.url.take() {
            self.emit(FieldKind::Url, settings, data, start, end)?;
        }
        if let Some(start) = self.marks.header_field.take() {
            self.emit(FieldKind::HeaderField, settings, data, start, end)?;
        }
        if let Some(start) = self.marks.header_value.take() {
            self.emit(FieldKind::HeaderValue, settings, data, start, end)?;
        }
        Ok(())
    }

    fn emit(
        &mut self,
        kind: FieldKind,
        settings: &mut Settings<T>,
        data: &[u8],
        start: usize,
        end: usize,
    ) -> Result<(), Stop> {
        if start >= end {
            return Ok(());
        }
        let slice = &data[start..end];
        match kind {
            FieldKind::Path => {
                if let Some(cb) = settings.on_path.as_mut() {
                    cb(self, slice)?;
                }
            }
            FieldKind::QueryString => {
                if let Some(cb) = settings.on_query_string.as_mut() {
                    cb(self, slice)?;
                }
            }
            FieldKind::Url => {
                if let Some(cb) = settings.on_url.as_mut() {
                    cb(self, slice)?;
                }
            }
            FieldKind::Fragment => {
                if let Some(cb) = settings.on_fragment.as_mut() {
                    cb(self, slice)?;
                }
            }
            FieldKind::HeaderField => {
                if let Some(cb) = settings.on_header_field.as_mut() {
                    cb(self, slice)?;
                }
            }
            FieldKind::HeaderValue => {
                if let Some(cb) = settings.on_header_value.as_mut() {
                    cb(self, slice)?;
                }
            }
        }
        Ok(())
    }

    /// Drive `data` through the state machine. An empty slice signals EOF.
    /// Returns the number of bytes consumed.
    pub fn execute(&mut self, settings: &mut Settings<T>, data: &[u8]) -> usize {
        if self.state.is_dead() {
            return 0;
        }
        if data.is_empty() {
            return self.handle_eof(settings);
        }

        self.reopen_marks();
        let mut i = 0usize;
        while i < data.len() {
            if self.state == State::MessageDone {
                self.begin_next_message();
            }

            let outcome = match self.state {
                State::BodyIdentity => self.consume_body_identity(settings, data, &mut i),
                State::BodyIdentityEof => self.consume_body_identity_eof(settings, data, &mut i),
                State::ChunkData => self.consume_chunk_data(settings, data, &mut i),
                _ => {
                    let byte = data[i];
                    let r = self.step(settings, data, i, byte);
                    if let StepResult::Ok = r {
                        i += 1;
                    }
                    r
                }
            };

            match outcome {
                StepResult::Ok => {}
                StepResult::CallbackStop => {
                    self.die(Error::CallbackRejected);
                    return i;
                }
                StepResult::UpgradeExit => {
                    self.upgrade = true;
                    return i;
                }
                StepResult::Error(e) => {
                    self.die(e);
                    return i;
                }
            }

            if self.state.is_dead() || self.upgrade {
                break;
            }
        }
        if self.state == State::MessageDone {
            self.begin_next_message();
        }
        if self.flush_partial_marks(settings, data).is_err() {
            self.die(Error::CallbackRejected);
        }
        i
    }

    fn handle_eof(&mut self, settings: &mut Settings<T>) -> usize {
        if self.state == State::BodyIdentityEof {
            match self.complete_message(settings) {
                StepResult::Ok => {}
                _ => self.die(Error::CallbackRejected),
            }
        }
        0
    }

    fn consume_body_identity(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: &mut usize,
    ) -> StepResult {
        let total = self.content_length.unwrap_or(0);
        let remaining = total.saturating_sub(self.body_read);
        let available = (data.len() - *i) as u64;
        let take = remaining.min(available) as usize;
        let slice = &data[*i..*i + take];
        if !slice.is_empty() {
            if let Some(cb) = settings.on_body.as_mut() {
                if cb(self, slice).is_err() {
                    *i += take;
                    return StepResult::CallbackStop;
                }
            }
        }
        self.body_read += take as u64;
        *i += take;
        if self.body_read >= total {
            return self.complete_message(settings);
        }
        StepResult::Ok
    }

    fn consume_body_identity_eof(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: &mut usize,
    ) -> StepResult {
        let slice = &data[*i..];
        if !slice.is_empty() {
            if let Some(cb) = settings.on_body.as_mut() {
                if cb(self, slice).is_err() {
                    *i = data.len();
                    return StepResult::CallbackStop;
                }
            }
        }
        self.body_read += slice.len() as u64;
        *i = data.len();
        StepResult::Ok
    }

    fn consume_chunk_data(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: &mut usize,
    ) -> StepResult {
        let available = (data.len() - *i) as u64;
        let take = self.chunk_remaining.min(available) as usize;
        let slice = &data[*i..*i + take];
        if !slice.is_empty() {
            if let Some(cb) = settings.on_body.as_mut() {
                if cb(self, slice).is_err() {
                    *i += take;
                    return StepResult::CallbackStop;
                }
            }
        }
        self.body_read += take as u64;
        self.chunk_remaining -= take as u64;
        *i += take;
        if self.chunk_remaining == 0 {
            self.state = State::ChunkDataAlmostDone;
        }
        StepResult::Ok
    }

    fn complete_message(&mut self, settings: &mut Settings<T>) -> StepResult {
        if let Some(cb) = settings.on_message_complete.as_mut() {
            if cb(self).is_err() {
                return StepResult::CallbackStop;
            }
        }
        self.state = State::MessageDone;
        StepResult::Ok
    }

    fn fire_message_begin(&mut self, settings: &mut Settings<T>) -> Result<(), ()> {
        if let Some(cb) = settings.on_message_begin.as_mut() {
            if cb(self).is_err() {
                return Err(());
            }
        }
        Ok(())
    }

    // -- per-byte state dispatch -------------------------------------------------

    fn step(&mut self, settings: &mut Settings<T>, data: &[u8], i: usize, byte: u8) -> StepResult {
        if !matches!(
            self.state,
            State::BodyIdentity
                | State::BodyIdentityEof
                | State::ChunkData
                | State::MessageDone
        ) {
            self.nread += 1;
            if self.nread > self.config.max_header_size {
                return StepResult::Error(Error::HeaderTooLarge {
                    limit: self.config.max_header_size,
                });
            }
        }

        match self.state {
            State::StartReqOrRes => self.handle_start_req_or_res(settings, byte),
            State::StartReqOrResH => self.handle_start_req_or_res_h(settings, byte),
            State::StartReq => self.handle_start_req(settings, byte),
            State::StartRes => self.handle_start_res(settings, byte),

            State::ReqMethod => self.handle_req_method(byte),
            State::ReqSpacesBeforeUrl => self.handle_req_spaces_before_url(settings, data, i, byte),
            State::ReqUrl => self.handle_req_url_byte(settings, data, i, byte),
            State::ReqHttpVersion => self.handle_http_version_byte(byte, true),
            State::ReqHttpMajor => self.handle_http_major(byte, true),
            State::ReqHttpDot => self.handle_http_dot(byte, true),
            State::ReqHttpMinor => self.handle_http_minor(byte, true),
            State::ReqLineAlmostDone => self.handle_req_line_almost_done(byte),

            State::ResHttpVersion => self.handle_http_version_byte(byte, false),
            State::ResHttpMajor => self.handle_http_major(byte, false),
            State::ResHttpDot => self.handle_http_dot(byte, false),
            State::ResHttpMinor => self.handle_http_minor(byte, false),
            State::ResSpaceBeforeStatusCode => self.handle_res_space_before_status(byte),
            State::ResStatusCode => self.handle_res_status_code(byte),
            State::ResStatusLine => self.handle_res_status_line(byte),
            State::ResLineAlmostDone => self.handle_res_line_almost_done(byte),

            State::HeaderFieldStart => self.handle_header_field_start(settings, data, i, byte),
            State::HeaderField => self.handle_header_field(settings, data, i, byte),
            State::HeaderValueDiscardWs => self.handle_header_value_discard_ws(settings, data, i, byte),
            State::HeaderValueStart => self.handle_header_value_discard_ws(settings, data, i, byte),
            State::HeaderValue => self.handle_header_value_byte(settings, data, i, byte),
            State::HeaderValueLws => self.handle_header_value_lws(settings, data, i, byte),
            State::HeaderAlmostDone => self.handle_header_almost_done(byte),
            State::HeadersAlmostDone => self.handle_headers_almost_done(settings, byte),

            State::ChunkSizeStart => self.handle_chunk_size_start(byte),
            State::ChunkSize => self.handle_chunk_size(byte),
            State::ChunkExtension => self.handle_chunk_extension(byte),
            State::ChunkSizeAlmostDone => self.handle_chunk_size_almost_done(byte),
            State::ChunkDataAlmostDone => self.handle_chunk_data_almost_done(byte),
            State::ChunkDataDone => self.handle_chunk_data_done(byte),

            State::Dead | State::MessageDone | State::BodyIdentity | State::BodyIdentityEof
            | State::ChunkData => StepResult::Ok,
        }
    }

    fn handle_start_req_or_res(&mut self, settings: &mut Settings<T>, byte: u8) -> StepResult {
        if byte == b'\r' || byte == b'\n' {
            return StepResult::Ok;
        }
        if self.fire_message_begin(settings).is_err() {
            return StepResult::CallbackStop;
        }
        if byte == b'H' {
            self.method_buf.clear();
            self.method_buf.push(byte);
            self.state = State::StartReqOrResH;
            StepResult::Ok
        } else if is_upper_alpha(byte) {
            self.is_response = false;
            self.method_buf.clear();
            self.method_buf.push(byte);
            self.state = State::ReqMethod;
            StepResult::Ok
        } else {
            StepResult::Error(Error::MalformedStartLine)
        }
    }

    fn handle_start_req_or_res_h(&mut self, _settings: &mut Settings<T>, byte: u8) -> StepResult {
        if byte == b'T' {
            self.is_response = true;
            self.index = 2; // "HT" of "HTTP/" already matched
            self.state = State::ResHttpVersion;
            StepResult::Ok
        } else {
            self.is_response = false;
            self.method_buf.push(byte);
            self.state = State::ReqMethod;
            StepResult::Ok
        }
    }

    fn handle_start_req(&mut self, settings: &mut Settings<T>, byte: u8) -> StepResult {
        if !is_upper_alpha(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        if self.fire_message_begin(settings).is_err() {
            return StepResult::CallbackStop;
        }
        self.is_response = false;
        self.method_buf.clear();
        self.method_buf.push(byte);
        self.state = State::ReqMethod;
        StepResult::Ok
    }

    fn handle_start_res(&mut self, settings: &mut Settings<T>, byte: u8) -> StepResult {
        if byte != b'H' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        if self.fire_message_begin(settings).is_err() {
            return StepResult::CallbackStop;
        }
        self.is_response = true;
        self.index = 1;
        self.state = State::ResHttpVersion;
        StepResult::Ok
    }

    fn handle_req_method(&mut self, byte: u8) -> StepResult {
        if byte == b' ' {
            if self.method_buf.is_empty() {
                return StepResult::Error(Error::MalformedStartLine);
            }
            match Method::from_bytes(&self.method_buf) {
                Some(m) => self.method = Some(m),
                None => {
                    if self.config.strict {
                        return StepResult::Error(Error::UnknownMethod);
                    }
                    self.method = None;
                }
            }
            self.state = State::ReqSpacesBeforeUrl;
            return StepResult::Ok;
        }
        if !is_upper_alpha(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        if self.method_buf.len() >= self.config.max_method_len {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.method_buf.push(byte);
        StepResult::Ok
    }

    fn handle_req_spaces_before_url(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b' ' {
            return StepResult::Ok;
        }
        self.marks.url = Some(i);
        match byte {
            b'/' | b'*' => {
                self.url_phase = UrlPhase::Path;
                self.marks.path = Some(i);
            }
            b if is_upper_alpha(b) || b.is_ascii_lowercase() => {
                self.url_phase = UrlPhase::SchemeOrPath;
                self.scheme_colon_seen = false;
                self.scheme_slash1_seen = false;
            }
            _ => return StepResult::Error(Error::MalformedStartLine),
        }
        self.state = State::ReqUrl;
        self.handle_req_url_byte(settings, data, i, byte)
    }

    fn handle_req_url_byte(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b' ' {
            if let Err(()) = self.close_url(settings, data, i) {
                return StepResult::CallbackStop;
            }
            self.state = State::ReqHttpVersion;
            self.index = 0;
            return StepResult::Ok;
        }
        if byte == b'\r' || byte == b'\n' {
            // HTTP/0.9-style request line with no version; treat end of
            // target as end of line directly.
            if let Err(()) = self.close_url(settings, data, i) {
                return StepResult::CallbackStop;
            }
            self.http_major = 0;
            self.http_minor = 9;
            self.state = if byte == b'\r' {
                State::ReqLineAlmostDone
            } else {
                State::HeaderFieldStart
            };
            return StepResult::Ok;
        }

        match self.url_phase {
            UrlPhase::SchemeOrPath => {
                if byte == b':' && !self.scheme_colon_seen {
                    self.scheme_colon_seen = true;
                } else if self.scheme_colon_seen && !self.scheme_slash1_seen && byte == b'/' {
                    self.scheme_slash1_seen = true;
                } else if self.scheme_colon_seen && self.scheme_slash1_seen && byte == b'/' {
                    self.url_phase = UrlPhase::Authority;
                    self.scheme_colon_seen = false;
                    self.scheme_slash1_seen = false;
                } else {
                    self.scheme_colon_seen = false;
                    self.scheme_slash1_seen = false;
                }
            }
            UrlPhase::Authority => match byte {
                b'/' => {
                    self.url_phase = UrlPhase::Path;
                    self.marks.path = Some(i);
                }
                b'?' => {
                    self.url_phase = UrlPhase::Query;
                    self.marks.query_string = Some(i + 1);
                }
                b'#' => {
                    self.url_phase = UrlPhase::Fragment;
                    self.marks.fragment = Some(i + 1);
                }
                _ => {}
            },
            UrlPhase::Path => match byte {
                b'?' => {
                    if let Some(start) = self.marks.path.take() {
                        if self.emit(FieldKind::Path, settings, data, start, i).is_err() {
                            return StepResult::CallbackStop;
                        }
                    }
                    self.url_phase = UrlPhase::Query;
                    self.marks.query_string = Some(i + 1);
                }
                b'#' => {
                    if let Some(start) = self.marks.path.take() {
                        if self.emit(FieldKind::Path, settings, data, start, i).is_err() {
                            return StepResult::CallbackStop;
                        }
                    }
                    self.url_phase = UrlPhase::Fragment;
                    self.marks.fragment = Some(i + 1);
                }
                _ => {}
            },
            UrlPhase::Query => {
                if byte == b'#' {
                    if let Some(start) = self.marks.query_string.take() {
                        if self
                            .emit(FieldKind::QueryString, settings, data, start, i)
                            .is_err()
                        {
                            return StepResult::CallbackStop;
                        }
                    }
                    self.url_phase = UrlPhase::Fragment;
                    self.marks.fragment = Some(i + 1);
                }
            }
            UrlPhase::Fragment => {}
        }
        StepResult::Ok
    }

    /// Commit whichever of path/query/fragment/url spans are still open at
    /// the end of the request-target.
    fn close_url(&mut self, settings: &mut Settings<T>, data: &[u8], end: usize) -> Result<(), ()> {
        if let Some(start) = self.marks.path.take() {
            self.emit(FieldKind::Path, settings, data, start, end)
                .map_err(|_| ())?;
        }
        if let Some(start) = self.marks.query_string.take() {
            self.emit(FieldKind::QueryString, settings, data, start, end)
                .map_err(|_| ())?;
        }
        if let Some(start) = self.marks.fragment.take() {
            self.emit(FieldKind::Fragment, settings, data, start, end)
                .map_err(|_| ())?;
        }
        if let Some(start) = self.marks.url.take() {
            self.emit(FieldKind::Url, settings, data, start, end)
                .map_err(|_| ())?;
        }
        Ok(())
    }

    fn handle_http_version_byte(&mut self, byte: u8, is_req: bool) -> StepResult {
        if self.index >= HTTP_LITERAL.len() || HTTP_LITERAL[self.index] != byte {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.index += 1;
        if self.index == HTTP_LITERAL.len() {
            self.state = if is_req {
                State::ReqHttpMajor
            } else {
                State::ResHttpMajor
            };
        }
        StepResult::Ok
    }

    fn handle_http_major(&mut self, byte: u8, is_req: bool) -> StepResult {
        if !is_digit(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.http_major = (byte - b'0') as u16;
        self.state = if is_req { State::ReqHttpDot } else { State::ResHttpDot };
        StepResult::Ok
    }

    fn handle_http_dot(&mut self, byte: u8, is_req: bool) -> StepResult {
        if byte != b'.' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.state = if is_req {
            State::ReqHttpMinor
        } else {
            State::ResHttpMinor
        };
        StepResult::Ok
    }

    fn handle_http_minor(&mut self, byte: u8, is_req: bool) -> StepResult {
        if !is_digit(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.http_minor = (byte - b'0') as u16;
        if is_req {
            self.state = State::ReqLineAlmostDone;
        } else {
            self.state = State::ResSpaceBeforeStatusCode;
        }
        StepResult::Ok
    }

    fn handle_req_line_almost_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\r' && byte != b'\n' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        if byte == b'\r' {
            return StepResult::Ok;
        }
        self.state = State::HeaderFieldStart;
        StepResult::Ok
    }

    fn handle_res_space_before_status(&mut self, byte: u8) -> StepResult {
        if byte == b' ' {
            return StepResult::Ok;
        }
        if !is_digit(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.status_code = (byte - b'0') as u16;
        self.index = 1;
        self.state = State::ResStatusCode;
        StepResult::Ok
    }

    fn handle_res_status_code(&mut self, byte: u8) -> StepResult {
        if is_digit(byte) && self.index < 3 {
            self.status_code = self.status_code * 10 + (byte - b'0') as u16;
            self.index += 1;
            return StepResult::Ok;
        }
        if self.index != 3 {
            return StepResult::Error(Error::MalformedStartLine);
        }
        match byte {
            b' ' => {
                self.state = State::ResStatusLine;
                StepResult::Ok
            }
            b'\r' => {
                self.state = State::ResLineAlmostDone;
                StepResult::Ok
            }
            b'\n' => {
                self.state = State::HeaderFieldStart;
                StepResult::Ok
            }
            _ => StepResult::Error(Error::MalformedStartLine),
        }
    }

    fn handle_res_status_line(&mut self, byte: u8) -> StepResult {
        match byte {
            b'\r' => {
                self.state = State::ResLineAlmostDone;
                StepResult::Ok
            }
            b'\n' => {
                self.state = State::HeaderFieldStart;
                StepResult::Ok
            }
            _ => StepResult::Ok,
        }
    }

    fn handle_res_line_almost_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\n' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.state = State::HeaderFieldStart;
        StepResult::Ok
    }

    fn handle_header_field_start(
        &mut self,
        settings: &mut Settings<T>,
        _data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b'\r' {
            self.state = State::HeadersAlmostDone;
            return StepResult::Ok;
        }
        if byte == b'\n' {
            // Lenient lone-LF blank line: the terminator is already fully
            // consumed, so drive the headers-complete transition directly
            // instead of waiting for a `\n` that HeadersAlmostDone expects.
            if self.flags.contains(Flags::TRAILING) {
                return self.complete_message(settings);
            }
            return self.finish_headers(settings);
        }
        if !is_token_char(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.header_name_matcher = NameMatcher::new();
        self.header_name_matcher.feed(byte);
        self.active_framing_header = FramingHeader::Unresolved;
        self.framing_value_buf.clear();
        self.marks.header_field = Some(i);
        self.state = State::HeaderField;
        StepResult::Ok
    }

    fn handle_header_field(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b':' {
            if let Some(start) = self.marks.header_field.take() {
                if self
                    .emit(FieldKind::HeaderField, settings, data, start, i)
                    .is_err()
                {
                    return StepResult::CallbackStop;
                }
            }
            self.active_framing_header = self.header_name_matcher.finish();
            self.state = State::HeaderValueDiscardWs;
            return StepResult::Ok;
        }
        if !is_token_char(byte) {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.header_name_matcher.feed(byte);
        StepResult::Ok
    }

    fn handle_header_value_discard_ws(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if is_space_or_tab(byte) {
            return StepResult::Ok;
        }
        if byte == b'\r' || byte == b'\n' {
            // Empty header value.
            self.marks.header_value = Some(i);
            self.state = State::HeaderValue;
            return self.handle_header_value_byte(settings, data, i, byte);
        }
        self.marks.header_value = Some(i);
        self.state = State::HeaderValue;
        self.handle_header_value_byte(settings, data, i, byte)
    }

    fn handle_header_value_byte(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b'\r' || byte == b'\n' {
            if let Some(start) = self.marks.header_value.take() {
                if self
                    .emit(FieldKind::HeaderValue, settings, data, start, i)
                    .is_err()
                {
                    return StepResult::CallbackStop;
                }
            }
            if let Err(e) = self.finalize_framing_value() {
                return StepResult::Error(e);
            }
            if byte == b'\r' {
                self.state = State::HeaderAlmostDone;
            } else {
                self.state = State::HeaderValueLws;
                return self.handle_header_value_lws(settings, data, i, b'\0');
            }
            return StepResult::Ok;
        }
        if !matches!(self.active_framing_header, FramingHeader::General) {
            self.framing_value_buf.push(byte);
        }
        StepResult::Ok
    }

    fn handle_header_almost_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\n' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        self.state = State::HeaderValueLws;
        StepResult::Ok
    }

    fn handle_header_value_lws(
        &mut self,
        settings: &mut Settings<T>,
        data: &[u8],
        i: usize,
        byte: u8,
    ) -> StepResult {
        if byte == b'\0' {
            // Synthetic re-entry right after a bare-LF value terminator;
            // nothing to consume, just fall through to real dispatch on the
            // next byte.
            return StepResult::Ok;
        }
        if is_space_or_tab(byte) {
            if self.config.strict {
                return StepResult::Error(Error::Grammar {
                    byte,
                    state: "header_value_lws",
                });
            }
            return StepResult::Ok;
        }
        self.handle_header_field_start(settings, data, i, byte)
    }

    fn handle_headers_almost_done(&mut self, settings: &mut Settings<T>, byte: u8) -> StepResult {
        if byte != b'\n' {
            return StepResult::Error(Error::MalformedStartLine);
        }
        if self.flags.contains(Flags::TRAILING) {
            return self.complete_message(settings);
        }
        self.finish_headers(settings)
    }

    fn finalize_framing_value(&mut self) -> Result<(), Error> {
        match self.active_framing_header {
            FramingHeader::ContentLength => {
                let mut val: u64 = 0;
                if self.framing_value_buf.is_empty() {
                    return Err(Error::MalformedStartLine);
                }
                for &b in self.framing_value_buf.trim() {
                    if !b.is_ascii_digit() {
                        return Err(Error::Grammar {
                            byte: b,
                            state: "content-length",
                        });
                    }
                    val = val
                        .checked_mul(10)
                        .and_then(|v| v.checked_add((b - b'0') as u64))
                        .ok_or(Error::Grammar {
                            byte: b,
                            state: "content-length",
                        })?;
                }
                if let Some(existing) = self.content_length {
                    if existing != val {
                        return Err(Error::ConflictingContentLength);
                    }
                } else {
                    self.content_length = Some(val);
                }
            }
            FramingHeader::TransferEncoding => {
                if let Some(last) = comma_tokens(&self.framing_value_buf).last() {
                    if is_chunked_token(last) {
                        self.flags.set(Flags::CHUNKED);
                    }
                }
            }
            FramingHeader::Connection => {
                for tok in comma_tokens(&self.framing_value_buf) {
                    if tok.eq_ignore_ascii_case(b"keep-alive") {
                        self.flags.set(Flags::CONNECTION_KEEP_ALIVE);
                    } else if tok.eq_ignore_ascii_case(b"close") {
                        self.flags.set(Flags::CONNECTION_CLOSE);
                    } else if tok.eq_ignore_ascii_case(b"upgrade") {
                        self.flags.set(Flags::UPGRADE);
                    }
                }
            }
            FramingHeader::Upgrade => {
                self.flags.set(Flags::UPGRADE);
            }
            FramingHeader::Unresolved | FramingHeader::General => {}
        }
        self.framing_value_buf.clear();
        Ok(())
    }

    fn finish_headers(&mut self, settings: &mut Settings<T>) -> StepResult {
        let mut skip_body = false;
        if let Some(cb) = settings.on_headers_complete.as_mut() {
            match cb(self) {
                Ok(v) => skip_body = v,
                Err(_) => return StepResult::CallbackStop,
            }
        }

        let is_connect_response = self.is_response && self.method == Some(Method::Connect);
        if self.flags.contains(Flags::UPGRADE) || is_connect_response {
            return StepResult::UpgradeExit;
        }
        if skip_body {
            return self.complete_message(settings);
        }
        if self.is_response && matches!(self.status_code, 100..=199 | 204 | 304) {
            return self.complete_message(settings);
        }
        if self.flags.contains(Flags::CHUNKED) {
            self.state = State::ChunkSizeStart;
            return StepResult::Ok;
        }
        if let Some(len) = self.content_length {
            if len == 0 {
                return self.complete_message(settings);
            }
            self.state = State::BodyIdentity;
            return StepResult::Ok;
        }
        if self.is_response {
            self.state = State::BodyIdentityEof;
            return StepResult::Ok;
        }
        self.complete_message(settings)
    }

    fn handle_chunk_size_start(&mut self, byte: u8) -> StepResult {
        if !is_hex_digit(byte) {
            return StepResult::Error(Error::MalformedChunkSize);
        }
        self.chunk_remaining = crate::util::hex_value(byte).unwrap() as u64;
        self.state = State::ChunkSize;
        StepResult::Ok
    }

    fn handle_chunk_size(&mut self, byte: u8) -> StepResult {
        if is_hex_digit(byte) {
            let digit = crate::util::hex_value(byte).unwrap() as u64;
            self.chunk_remaining = match self
                .chunk_remaining
                .checked_mul(16)
                .and_then(|v| v.checked_add(digit))
            {
                Some(v) => v,
                None => return StepResult::Error(Error::MalformedChunkSize),
            };
            return StepResult::Ok;
        }
        match byte {
            b';' => {
                self.state = State::ChunkExtension;
                StepResult::Ok
            }
            b'\r' => {
                self.state = State::ChunkSizeAlmostDone;
                StepResult::Ok
            }
            _ => StepResult::Error(Error::MalformedChunkSize),
        }
    }

    fn handle_chunk_extension(&mut self, byte: u8) -> StepResult {
        if byte == b'\r' {
            self.state = State::ChunkSizeAlmostDone;
        }
        StepResult::Ok
    }

    fn handle_chunk_size_almost_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\n' {
            return StepResult::Error(Error::MalformedChunkSize);
        }
        if self.chunk_remaining == 0 {
            self.flags.set(Flags::TRAILING);
            self.state = State::HeaderFieldStart;
        } else {
            self.state = State::ChunkData;
        }
        StepResult::Ok
    }

    fn handle_chunk_data_almost_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\r' {
            return StepResult::Error(Error::MalformedChunkSize);
        }
        self.state = State::ChunkDataDone;
        StepResult::Ok
    }

    fn handle_chunk_data_done(&mut self, byte: u8) -> StepResult {
        if byte != b'\n' {
            return StepResult::Error(Error::MalformedChunkSize);
        }
        self.state = State::ChunkSizeStart;
        StepResult::Ok
    }
}
