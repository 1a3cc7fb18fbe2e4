//! Keyword normalization

/// Canonicalize a raw trained word
///
/// Inserts one space after every comma not already followed by whitespace,
/// then trims the result. Idempotent.
pub fn normalize_keyword(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == ','
            && let Some(next) = chars.peek()
            && !is_space(*next)
        {
            out.push(' ');
        }
    }

    out.trim_matches(is_space).to_string()
}

/// Unicode whitespace plus the ASCII information separators U+001C..=U+001F
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Normalize a keyword list, dropping entries that end up empty
pub fn normalize_keywords<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|k| normalize_keyword(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Join keywords the way they are displayed and inserted into prompts
pub fn join_keywords<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_space_after_bare_comma() {
        assert_eq!(normalize_keyword("a,b, c"), "a, b, c");
        assert_eq!(normalize_keyword("1girl,solo,smile"), "1girl, solo, smile");
    }

    #[test]
    fn test_keeps_existing_whitespace() {
        assert_eq!(normalize_keyword("a, b"), "a, b");
        assert_eq!(normalize_keyword("a,\tb"), "a,\tb");
        assert_eq!(normalize_keyword("a,  b"), "a,  b");
    }

    #[test]
    fn test_trailing_and_repeated_commas() {
        assert_eq!(normalize_keyword("a,"), "a,");
        assert_eq!(normalize_keyword("a,,b"), "a, , b");
        assert_eq!(normalize_keyword("  a,b  "), "a, b");
    }

    #[test]
    fn test_idempotent_on_edge_cases() {
        for raw in ["a, ", " ,a", ",,,", "x,y,z", "", "   ", "a,\u{3000}b"] {
            let once = normalize_keyword(raw);
            assert_eq!(normalize_keyword(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_information_separators_count_as_whitespace() {
        assert_eq!(normalize_keyword("a,\u{1f}b"), "a,\u{1f}b");
        assert_eq!(normalize_keyword("\u{1c}a,b\u{1d}"), "a, b");
        assert!(normalize_keywords(&["\u{1e}"]).is_empty());
    }

    #[test]
    fn test_normalize_keywords_drops_blank_and_keeps_order() {
        let raw = ["c,d", "  ", "a", ""];
        assert_eq!(normalize_keywords(&raw), vec!["c, d", "a"]);
    }

    #[test]
    fn test_join_keywords() {
        assert_eq!(join_keywords(&["a, b", "c"]), "a, b, c");
        assert_eq!(join_keywords::<&str>(&[]), "");
    }
}
