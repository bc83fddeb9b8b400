#![no_main]

use libfuzzer_sys::fuzz_target;
use strip_comments::{Span, erase};

fuzz_target!(|data: &[u8]| {
    // First byte: span count; then pairs of bytes as span bounds; the rest is the source.
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let count = usize::from(count % 32).min(rest.len() / 2);
    let (bounds, text) = rest.split_at(count * 2);
    let source = String::from_utf8_lossy(text);

    let spans: Vec<Span> = bounds
        .chunks_exact(2)
        .map(|pair| Span::new(usize::from(pair[0]), usize::from(pair[1])))
        .collect();

    let out = erase(&source, &spans);
    assert_eq!(out.code.len() + out.removed_chars, source.len());
    assert_eq!(
        out.removed.iter().map(Span::len).sum::<usize>(),
        out.removed_chars
    );
    assert!(out.removed.windows(2).all(|w| w[0].end <= w[1].start));
});
