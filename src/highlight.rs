use std::ops::Range;

use regex::{Regex, RegexBuilder};

/// Case-insensitive literal matcher for the toolbar filter text.
pub fn build_filter_regex(filter: &str) -> Option<Regex> {
    if filter.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(filter))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Byte ranges of `text` matched by the filter, in order and non-overlapping.
pub fn match_ranges(text: &str, regex: Option<&Regex>) -> Vec<Range<usize>> {
    match regex {
        Some(regex) => regex.find_iter(text).map(|m| m.range()).collect(),
        None => Vec::new(),
    }
}

/// Splits `text` into `(segment, highlighted)` pieces.
pub fn split_matches<'a>(text: &'a str, regex: Option<&Regex>) -> Vec<(&'a str, bool)> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for range in match_ranges(text, regex) {
        if range.start > last {
            pieces.push((&text[last..range.start], false));
        }
        pieces.push((&text[range.clone()], true));
        last = range.end;
    }
    if last < text.len() || pieces.is_empty() {
        pieces.push((&text[last..], false));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_literal_and_case_insensitive() {
        let regex = build_filter_regex("a.c").expect("regex");
        assert!(regex.is_match("xA.Cx"));
        assert!(!regex.is_match("abc"));
        assert!(build_filter_regex("").is_none());
        let spaced = build_filter_regex("a ").expect("regex");
        assert!(spaced.is_match("A b"));
        assert!(!spaced.is_match("ab"));
    }

    #[test]
    fn splits_text_around_matches() {
        let regex = build_filter_regex("abc");
        assert_eq!(
            split_matches("ABCtest abc", regex.as_ref()),
            vec![("ABC", true), ("test ", false), ("abc", true)]
        );
        assert_eq!(split_matches("plain", None), vec![("plain", false)]);
        assert_eq!(split_matches("", None), vec![("", false)]);
    }
}
