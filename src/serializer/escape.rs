//! Escape policy for string literals
//!
//! Only `\\`, `\"`, `\{`, `\uHHHH`, and `\UHHHHHH` are legal escape
//! outputs. Control characters below U+0020 and U+007F are always
//! escape-sequenced, so tabs serialize as `\u0009`.

/// Compute the canonical raw form of a string literal value
pub fn escape_string_literal(value: &str) -> String {
    let mut raw = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => raw.push_str("\\\\"),
            '"' => raw.push_str("\\\""),
            '{' => raw.push_str("\\{"),
            c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                raw.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => raw.push(c),
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("say \"hi\"", "say \\\"hi\\\"")]
    #[case("back\\slash", "back\\\\slash")]
    #[case("open {brace", "open \\{brace")]
    #[case("tab\there", "tab\\u0009here")]
    #[case("bell\u{7}", "bell\\u0007")]
    #[case("del\u{7f}", "del\\u007F")]
    fn escapes_follow_the_policy(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(escape_string_literal(value), expected);
    }

    #[test]
    fn non_ascii_text_is_left_alone() {
        assert_eq!(escape_string_literal("héllo 漢字"), "héllo 漢字");
    }
}
