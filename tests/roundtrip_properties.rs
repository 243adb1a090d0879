//! Property tests: parse totality and serializer round-trips

use ftl_engine::syntax::visit::strip_spans;
use proptest::prelude::*;

/// Identifier strategy matching the FTL grammar
fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,12}"
}

/// Pattern text without syntax-significant characters
fn plain_text() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9.!?,]{1,40}".prop_map(|s| s.trim().to_string()).prop_filter(
        "text must not be empty or look like an attribute",
        |s| !s.is_empty() && !s.starts_with(['.', '[', '*']),
    )
}

/// A small well-formed resource: messages, terms, selects, comments
fn well_formed_source() -> impl Strategy<Value = String> {
    let message = (identifier(), plain_text())
        .prop_map(|(id, text)| format!("{id} = {text}\n"));
    let term = (identifier(), plain_text())
        .prop_map(|(id, text)| format!("-{id} = {text}\n"));
    let comment = plain_text().prop_map(|text| format!("# {text}\n\n"));
    let select = (identifier(), identifier(), plain_text(), plain_text()).prop_map(
        |(id, var, one, other)| {
            format!("{id} = {{ ${var} ->\n    [one] {one}\n   *[other] {other}\n}}\n")
        },
    );
    prop::collection::vec(
        prop_oneof![message, term, comment, select],
        1..6,
    )
    .prop_map(|entries| entries.join("\n"))
}

proptest! {
    /// Any string parses to a resource; malformed regions become junk,
    /// never a panic or an error.
    #[test]
    fn parse_is_total_over_arbitrary_text(source in ".{0,300}") {
        let resource = ftl_engine::parse(&source).unwrap();
        // Every junk region preserves its source bytes (after newline
        // normalization they must reassemble into a subset of it).
        for junk in resource.junk() {
            prop_assert!(!junk.content.is_empty());
        }
    }

    /// Parsing text with every kind of line ending never fails
    #[test]
    fn parse_is_total_over_mixed_newlines(chunks in prop::collection::vec("[a-z =#-]{0,10}", 0..8)) {
        let mut source = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            source.push_str(chunk);
            source.push_str(match index % 3 {
                0 => "\n",
                1 => "\r\n",
                _ => "\r",
            });
        }
        ftl_engine::parse(&source).unwrap();
    }

    /// For sources that parse clean, serialize∘parse is the identity on
    /// the AST (modulo spans) and serialization is a fixed point.
    #[test]
    fn serializer_round_trips_well_formed_sources(source in well_formed_source()) {
        let first = ftl_engine::parse(&source).unwrap();
        prop_assume!(first.junk().is_empty());

        let text1 = ftl_engine::serialize(&first).unwrap();
        let second = ftl_engine::parse(&text1).unwrap();
        prop_assert_eq!(
            strip_spans(&first),
            strip_spans(&second),
            "AST changed across one round trip of {:?}",
            source
        );

        let text2 = ftl_engine::serialize(&second).unwrap();
        prop_assert_eq!(text1, text2, "serialization is not a fixed point");
    }

    /// Line/column lookups agree with a naive scan
    #[test]
    fn line_offsets_match_naive_computation(source in ".{0,200}", offset in 0usize..220) {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let cache = ftl_engine::diagnostics::line_offsets::LineOffsetCache::new(&normalized);
        let chars: Vec<char> = normalized.chars().collect();
        let clamped = offset.min(chars.len());
        let mut line = 1;
        let mut column = 1;
        for ch in chars.iter().take(clamped) {
            if *ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        prop_assert_eq!(cache.position(clamped), (line, column));
    }
}
