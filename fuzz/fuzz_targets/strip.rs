#![no_main]

use libfuzzer_sys::fuzz_target;
use strip_comments::{StripOptions, strip_comments, strip_comments_with_sourcemap};

fuzz_target!(|data: &[u8]| {
    // Limit input size to keep the fuzzer fast and avoid OOM in pathological cases.
    let data = if data.len() > 64 * 1024 {
        &data[..64 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);
    let options = StripOptions {
        filename: Some("input.js".to_string()),
        ..StripOptions::default()
    };

    // Resolution failures are expected outcomes and must never crash.
    let Ok(out) = strip_comments_with_sourcemap(&source, &options) else {
        return;
    };
    let res = &out.result;

    assert_eq!(res.code.len() + res.removed_chars, source.len());
    assert!(res.removed_ranges.len() <= res.comment_count);
    assert!(res.removed_ranges.windows(2).all(|w| w[0].end <= w[1].start));

    let _ = serde_json::from_str::<serde_json::Value>(&out.sourcemap)
        .expect("sourcemap must be valid JSON when stripping succeeds");

    // Stripped output can tokenize differently and fail to resolve, but must not panic.
    let _ = strip_comments(&res.code, &options);
});
