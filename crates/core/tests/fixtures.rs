use std::path::PathBuf;

use strip_comments::{StripOptions, strip_comments, strip_comments_with_sourcemap};

const CASES: &[(&str, &str)] = &[
    ("plain.js", "plain.out.js"),
    ("modern.js", "modern.out.js"),
    ("unicode.js", "unicode.out.js"),
    ("button.jsx", "button.out.jsx"),
    ("service.ts", "service.out.ts"),
    ("component.tsx", "component.out.tsx"),
    ("decorators.ts", "decorators.out.ts"),
];

fn fixtures_dir() -> PathBuf {
    #[cfg(target_os = "wasi")]
    {
        PathBuf::from("/workspace/fixtures")
    }

    #[cfg(not(target_os = "wasi"))]
    {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
    }
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).expect("read fixture")
}

fn options_for(name: &str) -> StripOptions {
    StripOptions {
        filename: Some(name.to_string()),
        ..StripOptions::default()
    }
}

#[test]
fn fixtures_match_expected_output() {
    for &(input_name, expected_name) in CASES {
        let input = read_fixture(input_name);
        let expected = read_fixture(expected_name);

        let res = strip_comments(&input, &options_for(input_name)).unwrap();
        assert_eq!(res.code, expected, "fixture mismatch: {input_name}");
        assert!(res.comment_count > 0, "no comments found: {input_name}");
        assert_eq!(
            res.code.len() + res.removed_chars,
            input.len(),
            "length law: {input_name}"
        );

        // Idempotence: stripped output has nothing left to strip.
        let again = strip_comments(&res.code, &options_for(expected_name)).unwrap();
        assert_eq!(again.comment_count, 0, "not idempotent: {input_name}");
        assert_eq!(again.code, res.code, "not idempotent: {input_name}");
    }
}

#[test]
fn fixtures_emit_parseable_sourcemaps() {
    for &(input_name, expected_name) in CASES {
        let input = read_fixture(input_name);
        let expected = read_fixture(expected_name);

        // Source filename is the fixture filename; tests assert this gets recorded.
        let out = strip_comments_with_sourcemap(&input, &options_for(input_name)).unwrap();
        assert_eq!(out.result.code, expected, "code mismatch: {input_name}");

        let map = sourcemap::SourceMap::from_slice(out.sourcemap.as_bytes())
            .expect("sourcemap JSON must parse");
        assert_eq!(map.get_source(0), Some(input_name));
        assert!(map.get_token_count() > 0, "empty sourcemap: {input_name}");
    }
}
