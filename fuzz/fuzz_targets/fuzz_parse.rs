#![no_main]

use increhttp::{Config, Mode, Parser, Settings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let mode = match data[0] % 3 {
        0 => Mode::Request,
        1 => Mode::Response,
        _ => Mode::Either,
    };
    let mut settings: Settings<()> = Settings::new()
        .on_path(|_p, _d| Ok(()))
        .on_query_string(|_p, _d| Ok(()))
        .on_url(|_p, _d| Ok(()))
        .on_fragment(|_p, _d| Ok(()))
        .on_header_field(|_p, _d| Ok(()))
        .on_header_value(|_p, _d| Ok(()))
        .on_headers_complete(|_p| Ok(false))
        .on_body(|_p, _d| Ok(()));
    let mut parser: Parser<()> = Parser::init(mode, Config::default());

    // Feed in a handful of arbitrarily sized slices to exercise the
    // mark/commit reopening path across call boundaries, not just a single
    // whole-buffer call.
    let body = &data[1..];
    let mut offset = 0;
    while offset < body.len() {
        let take = 1 + (body[offset] as usize % 7);
        let end = (offset + take).min(body.len());
        let consumed = parser.execute(&mut settings, &body[offset..end]);
        if consumed == 0 && end > offset {
            break;
        }
        offset += consumed.max(1);
        if parser.upgrade {
            break;
        }
    }
});
