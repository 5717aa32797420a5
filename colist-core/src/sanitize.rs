//! Name and slug sanitizers for list documents.
//!
//! A character is "safe" when it falls in the ASCII range `A..=z` (which also
//! admits `[ \ ] ^ _` and the backtick), is an ASCII digit, or is `-` / `+`.
//! Everything else is replaced: with `-` in slugs, with a space in names.

fn is_safe(c: char) -> bool {
    matches!(c, 'A'..='z' | '0'..='9' | '-' | '+')
}

/// URL-safe slug used as the suffix of a list id.
///
/// Unsafe characters become `-`, runs of `-` collapse, a single leading and
/// trailing `-` are stripped, and the result is lowercased.
pub fn safe_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if is_safe(c) { c } else { '-' };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_lowercase()
}

/// Display-safe list name.
///
/// Unsafe characters become spaces, whitespace runs collapse to one space, and
/// the result is trimmed. May return an empty string; callers reject that.
pub fn safe_name(input: &str) -> String {
    let mut name = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if is_safe(c) { c } else { ' ' };
        if c == ' ' && name.ends_with(' ') {
            continue;
        }
        name.push(c);
    }
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Groceries", "groceries")]
    #[case("Weekend Trip!!", "weekend-trip")]
    #[case("  spaced   out  ", "spaced-out")]
    #[case("a--b", "a-b")]
    #[case("C++ notes", "c++-notes")]
    #[case("snake_case", "snake_case")]
    #[case("café list", "caf-list")]
    fn slug_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(safe_slug(input), expected);
    }

    #[rstest]
    #[case("Groceries", "Groceries")]
    #[case("Weekend   Trip!!", "Weekend Trip")]
    #[case("  padded\tname\n", "padded name")]
    #[case("café list", "caf list")]
    fn name_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(safe_name(input), expected);
    }

    #[test]
    fn name_of_only_unsafe_characters_is_empty() {
        assert_eq!(safe_name("!!! ???"), "");
    }
}
