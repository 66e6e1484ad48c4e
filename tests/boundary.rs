//! Boundary scenarios from SPEC_FULL.md §8.

use std::cell::RefCell;
use std::rc::Rc;

use increhttp::{Config, Mode, Parser, Settings};
use rstest::rstest;

#[derive(Default)]
struct Recorded {
    path: Vec<u8>,
    query: Vec<u8>,
    url: Vec<u8>,
    fragment: Vec<u8>,
    header_field: Vec<u8>,
    header_value: Vec<u8>,
    body: Vec<u8>,
    message_begins: u32,
    headers_complete: u32,
    message_completes: u32,
}

fn recording_settings(rec: &Rc<RefCell<Recorded>>) -> Settings<()> {
    let a = rec.clone();
    let b = rec.clone();
    let c = rec.clone();
    let d = rec.clone();
    let e = rec.clone();
    let f = rec.clone();
    let g = rec.clone();
    let h = rec.clone();
    let j = rec.clone();
    let k = rec.clone();
    Settings::new()
        .on_message_begin(move |_p| {
            a.borrow_mut().message_begins += 1;
            Ok(())
        })
        .on_path(move |_p, data| {
            b.borrow_mut().path.extend_from_slice(data);
            Ok(())
        })
        .on_query_string(move |_p, data| {
            c.borrow_mut().query.extend_from_slice(data);
            Ok(())
        })
        .on_url(move |_p, data| {
            d.borrow_mut().url.extend_from_slice(data);
            Ok(())
        })
        .on_fragment(move |_p, data| {
            e.borrow_mut().fragment.extend_from_slice(data);
            Ok(())
        })
        .on_header_field(move |_p, data| {
            f.borrow_mut().header_field.extend_from_slice(data);
            Ok(())
        })
        .on_header_value(move |_p, data| {
            g.borrow_mut().header_value.extend_from_slice(data);
            Ok(())
        })
        .on_headers_complete(move |_p| {
            h.borrow_mut().headers_complete += 1;
            Ok(false)
        })
        .on_body(move |_p, data| {
            j.borrow_mut().body.extend_from_slice(data);
            Ok(())
        })
        .on_message_complete(move |_p| {
            k.borrow_mut().message_completes += 1;
            Ok(())
        })
}

#[test]
fn byte_by_byte_feed_reports_full_request() {
    let input = b"GET /foo?x=1#f HTTP/1.1\r\nHost: a\r\n\r\n";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());

    let mut total = 0usize;
    for &byte in input.iter() {
        total += parser.execute(&mut settings, std::slice::from_ref(&byte));
    }

    assert_eq!(total, input.len());
    let r = rec.borrow();
    assert_eq!(r.message_begins, 1);
    assert_eq!(r.path, b"/foo");
    assert_eq!(r.query, b"x=1");
    assert_eq!(r.fragment, b"f");
    assert_eq!(r.url, b"/foo?x=1#f");
    assert_eq!(r.header_field, b"Host");
    assert_eq!(r.header_value, b"a");
    assert_eq!(r.headers_complete, 1);
    assert_eq!(r.message_completes, 1);
    assert_eq!(parser.method, Some(increhttp::Method::Get));
    assert_eq!((parser.http_major, parser.http_minor), (1, 1));
}

#[test]
fn head_response_suppresses_body_when_callback_declines_it() {
    let input = b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let h = rec.clone();
    let mut settings: Settings<()> = Settings::new().on_headers_complete(move |_p| {
        h.borrow_mut().headers_complete += 1;
        Ok(true) // caller knows this is a response to HEAD: no body follows.
    });
    let mut parser: Parser<()> = Parser::init(Mode::Response, Config::default());

    let consumed = parser.execute(&mut settings, input);

    assert_eq!(consumed, input.len());
    assert_eq!(rec.borrow().headers_complete, 1);
    assert!(parser.should_keep_alive());
}

#[test]
fn chunked_body_concatenates_across_chunks() {
    let input = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> = Parser::init(Mode::Response, Config::default());

    let consumed = parser.execute(&mut settings, input);

    assert_eq!(consumed, input.len());
    assert_eq!(rec.borrow().body, b"hello");
    assert_eq!(rec.borrow().message_completes, 1);
}

#[test]
fn upgrade_exits_with_unconsumed_tail() {
    let input = b"GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\nTRAILDATA";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());

    let consumed = parser.execute(&mut settings, input);

    assert!(parser.upgrade);
    assert_eq!(&input[consumed..], b"TRAILDATA");
}

#[test]
fn pipelined_requests_share_one_parser() {
    let input = b"GET / HTTP/1.1\r\n\r\nGET /next HTTP/1.1\r\n\r\n";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> = Parser::init(Mode::Request, Config::default());

    let consumed = parser.execute(&mut settings, input);

    assert_eq!(consumed, input.len());
    assert_eq!(rec.borrow().message_begins, 2);
    assert_eq!(rec.borrow().message_completes, 2);
    assert!(parser.should_keep_alive());
}

#[test]
fn overlong_header_block_is_rejected() {
    let mut input = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    input.extend(std::iter::repeat(b'a').take(100 * 1024));
    input.extend_from_slice(b"\r\n\r\n");

    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> =
        Parser::init(Mode::Request, Config::default());

    let consumed = parser.execute(&mut settings, &input);

    assert!(consumed < input.len());
    assert!(parser.last_error().is_some());
}

#[rstest]
#[case(Mode::Request, &b"GET / HTTP/1.0\r\n\r\n"[..], false)]
#[case(Mode::Request, &b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n"[..], true)]
#[case(Mode::Request, &b"GET / HTTP/1.1\r\n\r\n"[..], true)]
#[case(Mode::Request, &b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n"[..], false)]
fn keep_alive_follows_version_and_connection_header(
    #[case] mode: Mode,
    #[case] input: &[u8],
    #[case] expected: bool,
) {
    let mut settings: Settings<()> = Settings::new();
    let mut parser: Parser<()> = Parser::init(mode, Config::default());
    let consumed = parser.execute(&mut settings, input);
    assert_eq!(consumed, input.len());
    assert_eq!(parser.should_keep_alive(), expected);
}

#[test]
fn chunked_takes_precedence_over_content_length() {
    let input =
        b"HTTP/1.1 200 OK\r\nContent-Length: 999\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nhi\r\n0\r\n\r\n";
    let rec = Rc::new(RefCell::new(Recorded::default()));
    let mut settings = recording_settings(&rec);
    let mut parser: Parser<()> = Parser::init(Mode::Response, Config::default());

    let consumed = parser.execute(&mut settings, input);

    assert_eq!(consumed, input.len());
    assert_eq!(rec.borrow().body, b"hi");
}
