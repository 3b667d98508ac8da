//! Search term tokenisation and regular expressions

use regex::Regex;
use std::sync::LazyLock;
use crate::emitter::encode;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("quoted phrase pattern is valid"));
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer pattern is valid"));
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+[.][0-9]*|[0-9]*[.][0-9]+)$").expect("decimal pattern is valid")
});

const REGEX_SPECIAL: &str = r"-[]/{}()*+?.\^$";

/// Split a search term into tokens
///
/// Quoted phrases come first, then the remaining words. An unbalanced quote
/// is closed at the end of the term.
pub fn tokenize(term: &str) -> Vec<String> {
    let mut term = term.to_string();
    if term.matches('"').count() % 2 == 1 {
        term.push('"');
    }

    let mut tokens: Vec<String> = QUOTED
        .find_iter(&term)
        .map(|m| m.as_str().trim_matches('"').to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let rest = QUOTED.replace_all(&term, " ");
    tokens.extend(rest.split_whitespace().map(str::to_string));
    tokens
}

/// Case-insensitive regular expression for one token
///
/// Numbers are anchored so that `11` does not match `110`; leading zeros in
/// the data are tolerated.
pub fn search_pattern(token: &str) -> String {
    let escaped = escape_regex(token);
    if INTEGER.is_match(token) {
        format!("^(.*[^0-9.])?0*{escaped}([^0-9].*|$)")
    } else if DECIMAL.is_match(token) {
        format!("^(.*[^0-9.])?0*{escaped}")
    } else {
        escaped
    }
}

fn escape_regex(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if REGEX_SPECIAL.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Filter matching every token of `term` against `column`
///
/// `column` is the already encoded column reference (`*`, `col` or
/// `alias:col`). Returns `None` when the term has no tokens.
pub fn search_term_filter(term: &str, column: &str, quantified: bool) -> Option<String> {
    let patterns: Vec<String> = tokenize(term).iter().map(|t| encode(&search_pattern(t))).collect();
    match patterns.len() {
        0 => None,
        n if quantified && n > 1 => Some(format!("{column}::ciregexp::all({})", patterns.join(","))),
        _ => Some(
            patterns
                .iter()
                .map(|p| format!("{column}::ciregexp::{p}"))
                .collect::<Vec<_>>()
                .join("&"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quotes_then_words() {
        assert_eq!(tokenize(r#"one "two three" four"#), vec!["two three", "one", "four"]);
        assert_eq!(tokenize(r#"open "quote here"#), vec!["quote here", "open"]);
        assert_eq!(tokenize("  spaced\tout  "), vec!["spaced", "out"]);
        assert!(tokenize(r#""""#).is_empty());
    }

    #[test]
    fn test_numeric_patterns() {
        assert_eq!(search_pattern("11"), "^(.*[^0-9.])?0*11([^0-9].*|$)");
        assert_eq!(search_pattern("1.5"), r"^(.*[^0-9.])?0*1\.5");
        assert_eq!(search_pattern(".5"), r"^(.*[^0-9.])?0*\.5");
        assert_eq!(search_pattern("1.2.3"), r"1\.2\.3");
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(search_pattern("a+b(c)"), r"a\+b\(c\)");
        assert_eq!(search_pattern("x|y"), "x|y");
    }

    #[test]
    fn test_term_filter_forms() {
        assert_eq!(search_term_filter("abc", "name", false).unwrap(), "name::ciregexp::abc");
        assert_eq!(
            search_term_filter("ab cd", "name", false).unwrap(),
            "name::ciregexp::ab&name::ciregexp::cd"
        );
        assert_eq!(
            search_term_filter("ab cd", "*", true).unwrap(),
            "*::ciregexp::all(ab,cd)"
        );
        // one token never uses the quantified form
        assert_eq!(search_term_filter("ab", "name", true).unwrap(), "name::ciregexp::ab");
        assert_eq!(search_term_filter("   ", "name", true), None);
    }

    #[test]
    fn test_term_filter_encodes_patterns() {
        assert_eq!(
            search_term_filter("a b", "name", false).unwrap(),
            "name::ciregexp::a&name::ciregexp::b"
        );
        assert_eq!(
            search_term_filter("\"a b\"", "name", false).unwrap(),
            "name::ciregexp::a%20b"
        );
        assert_eq!(
            search_term_filter("7", "id", false).unwrap(),
            "id::ciregexp::%5E%28.%2A%5B%5E0-9.%5D%29%3F0%2A7%28%5B%5E0-9%5D.%2A%7C%24%29"
        );
    }
}
