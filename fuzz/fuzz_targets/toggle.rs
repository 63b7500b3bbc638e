#![no_main]

use libfuzzer_sys::fuzz_target;
use vtoggle::{apply_edits, parse_sfc, toggle_binding_actions, CancelToken, Span};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 || data.len() > 32 * 1024 {
        return;
    }
    // The first four bytes pick the selection, the rest is the document.
    let (head, body) = data.split_at(4);
    let src = String::from_utf8_lossy(body);
    let start = u16::from_le_bytes([head[0], head[1]]) as usize % (src.len() + 1);
    let len = head[2] as usize;
    let selection = Span::new(start, (start + len).min(src.len()));

    let document = parse_sfc(&src);
    let cancel = CancelToken::new();
    for action in toggle_binding_actions(&document, selection, &cancel) {
        let edited = apply_edits(&src, &action.edits);
        if let Some(cursor) = action.cursor {
            assert!(cursor <= edited.len());
        }
    }
});
