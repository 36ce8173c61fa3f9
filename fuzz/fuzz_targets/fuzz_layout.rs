#![no_main]

use arbitrary::Arbitrary;
use dgrep::search::LineMatcher;
use dgrep::tui::layout::{layout_content, room_for_text, visible_width};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    query: &'a str,
    text: &'a str,
    width: u8,
    truncate: bool,
}

fuzz_target!(|input: Input| {
    // Laid-out rows must never exceed the room for text
    let Ok(matcher) = LineMatcher::new(input.query) else {
        return;
    };
    let room = room_for_text(input.width as usize);
    for line in matcher.match_text(input.text) {
        for row in layout_content(&line, room, input.truncate) {
            assert!(visible_width(&row) <= room);
        }
    }
});
