//! The callback table the caller supplies to drive `Parser::execute`.
//!
//! Shaped after the original `http_parser_settings` struct: one field per
//! event, each independently nullable. Closer in spirit to the teacher
//! crate's own callback convention (`fn(tx: *mut htp_tx_t) -> Result<()>`,
//! see its hybrid-mode tests) than to a trait object per event.

use crate::error::Stop;
use crate::parser::Parser;

type DataCb<T> = Box<dyn FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop>>;
type EventCb<T> = Box<dyn FnMut(&mut Parser<T>) -> Result<(), Stop>>;
/// `on_headers_complete` alone may return `Ok(true)` to tell the framing
/// controller this message has no body (the HEAD-response case in §4.3).
type HeadersCompleteCb<T> = Box<dyn FnMut(&mut Parser<T>) -> Result<bool, Stop>>;

pub struct Settings<T> {
    pub on_message_begin: Option<EventCb<T>>,
    pub on_path: Option<DataCb<T>>,
    pub on_query_string: Option<DataCb<T>>,
    pub on_url: Option<DataCb<T>>,
    pub on_fragment: Option<DataCb<T>>,
    pub on_header_field: Option<DataCb<T>>,
    pub on_header_value: Option<DataCb<T>>,
    pub on_headers_complete: Option<HeadersCompleteCb<T>>,
    pub on_body: Option<DataCb<T>>,
    pub on_message_complete: Option<EventCb<T>>,
}

impl<T> Settings<T> {
    pub fn new() -> Settings<T> {
        Settings {
            on_message_begin: None,
            on_path: None,
            on_query_string: None,
            on_url: None,
            on_fragment: None,
            on_header_field: None,
            on_header_value: None,
            on_headers_complete: None,
            on_body: None,
            on_message_complete: None,
        }
    }

    pub fn on_message_begin<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>) -> Result<(), Stop> + 'static,
    {
        self.on_message_begin = Some(Box::new(f));
        self
    }

    pub fn on_path<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_path = Some(Box::new(f));
        self
    }

    pub fn on_query_string<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_query_string = Some(Box::new(f));
        self
    }

    pub fn on_url<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_url = Some(Box::new(f));
        self
    }

    pub fn on_fragment<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_fragment = Some(Box::new(f));
        self
    }

    pub fn on_header_field<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_header_field = Some(Box::new(f));
        self
    }

    pub fn on_header_value<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_header_value = Some(Box::new(f));
        self
    }

    pub fn on_headers_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>) -> Result<bool, Stop> + 'static,
    {
        self.on_headers_complete = Some(Box::new(f));
        self
    }

    pub fn on_body<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>, &[u8]) -> Result<(), Stop> + 'static,
    {
        self.on_body = Some(Box::new(f));
        self
    }

    pub fn on_message_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Parser<T>) -> Result<(), Stop> + 'static,
    {
        self.on_message_complete = Some(Box::new(f));
        self
    }
}
