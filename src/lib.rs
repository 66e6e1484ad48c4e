//! Incremental, allocation-free, zero-copy HTTP/1.x message parser.
//!
//! A byte-at-a-time state machine (`Parser::execute`) that reports message
//! structure through caller-supplied callbacks (`Settings`) instead of
//! building an owned representation of the message. See `SPEC_FULL.md` for
//! the full design; `DESIGN.md` for how each part is grounded.

mod config;
mod error;
mod flags;
mod header;
mod mark;
mod method;
mod parser;
mod settings;
mod state;
mod util;

pub use config::{Config, DEFAULT_MAX_HEADER_SIZE};
pub use error::{Error, Stop};
pub use method::Method;
pub use parser::{Mode, Parser};
pub use settings::Settings;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn consumes_a_full_simple_request() {
        let input = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut settings: Settings<()> = Settings::new();
        let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());
        let consumed = parser.execute(&mut settings, input);
        assert_eq!(consumed, input.len());
        assert_eq!(parser.method, Some(Method::Get));
        assert_eq!((parser.http_major, parser.http_minor), (1, 1));
    }

    #[test]
    fn rejects_bad_method() {
        let input = b"BREW / HTTP/1.1\r\n\r\n";
        let mut settings: Settings<()> = Settings::new();
        let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());
        let consumed = parser.execute(&mut settings, input);
        assert!(consumed < input.len());
        assert!(!parser.upgrade);
        assert!(parser.last_error().is_some());
    }

    #[test]
    fn records_path_and_header_via_callbacks() {
        let path = Rc::new(RefCell::new(Vec::new()));
        let headers = Rc::new(RefCell::new(Vec::new()));
        let path_cb = path.clone();
        let headers_cb = headers.clone();
        let mut settings: Settings<()> = Settings::new()
            .on_path(move |_p, d| {
                path_cb.borrow_mut().extend_from_slice(d);
                Ok(())
            })
            .on_header_field(move |_p, d| {
                headers_cb.borrow_mut().extend_from_slice(d);
                Ok(())
            });
        let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());
        let input = b"GET /widgets?x=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let consumed = parser.execute(&mut settings, input);
        assert_eq!(consumed, input.len());
        assert_eq!(&*path.borrow(), b"/widgets");
        assert_eq!(&*headers.borrow(), b"Host");
    }
}
