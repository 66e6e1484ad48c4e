//! Zero-copy mark/commit span bookkeeping (spec §4.4).
//!
//! A mark is an offset into the *current* `execute` call's input slice. It
//! never survives past the call: on a slice boundary the open span is
//! flushed as a partial callback and the offset is cleared. Whether to
//! re-open a mark at offset 0 of the next slice is decided by the caller
//! (`Parser::execute`) by inspecting `state`/`url_phase`, not by a separate
//! "was this field open" flag — matching how the original C implementation
//! keys mark re-opening off `parser->state`.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub path: Option<usize>,
    pub query_string: Option<usize>,
    pub url: Option<usize>,
    pub fragment: Option<usize>,
    pub header_field: Option<usize>,
    pub header_value: Option<usize>,
}

impl Marks {
    pub fn new() -> Marks {
        Marks::default()
    }

    pub fn clear(&mut self) {
        *self = Marks::default();
    }
}
