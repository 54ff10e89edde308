use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::storage::{fallback_title, NoteId};

static HTML_PROLOGUE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^\s*<(!doctype\s+html|html)[\s>]")
        .case_insensitive(true)
        .build()
        .expect("valid html prologue pattern")
});

static HIDDEN_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"<(head|style|script)\b[^>]*>.*?</(head|style|script)\s*>")
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("valid hidden block pattern")
});

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"<br\s*/?>|</(p|div|li|tr|h[1-6])\s*>")
        .case_insensitive(true)
        .build()
        .expect("valid line break pattern")
});

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

static ENTITIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Plain text of a note payload. Full HTML documents written by the desktop
/// edition are flattened; anything else, markup fragments included, is
/// returned as is.
pub fn to_plain_text(content: &str) -> String {
    if !looks_like_html(content) {
        return content.to_string();
    }
    let visible = HIDDEN_BLOCKS.replace_all(content, "");
    // markup newlines are not content; only tags produce line breaks
    let collapsed = visible.replace(['\r', '\n'], "");
    let broken = LINE_BREAKS.replace_all(&collapsed, "\n");
    let stripped = TAGS.replace_all(&broken, "");
    let decoded = ENTITIES.replace_all(&stripped, |caps: &Captures| decode_entity(caps));
    decoded.trim_end_matches('\n').to_string()
}

pub fn looks_like_html(content: &str) -> bool {
    HTML_PROLOGUE.is_match(content)
}

fn decode_entity(caps: &Captures) -> String {
    let name = &caps[1];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => numeric_entity(name),
    };
    decoded
        .map(String::from)
        .unwrap_or_else(|| caps[0].to_string())
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Title derived from the first `preview_lines` lines of the content's plain
/// text, or the generic placeholder when that is blank.
pub fn derive_title(content: &str, preview_lines: usize, id: &NoteId) -> String {
    let plain = to_plain_text(content);
    let title = plain
        .split('\n')
        .take(preview_lines.max(1))
        .collect::<Vec<_>>()
        .join("\n");
    let title = title.trim();
    if title.is_empty() {
        fallback_title(id)
    } else {
        title.to_string()
    }
}

/// First line of a title, for single-row chrome.
pub fn chrome_label(title: &str) -> &str {
    title.lines().next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QT_DOCUMENT: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.0//EN" "http://www.w3.org/TR/REC-html40/strict.dtd">
<html><head><meta name="qrichtext" content="1" /><style type="text/css">
p, li { white-space: pre-wrap; }
</style></head><body style=" font-family:'Inter'; font-size:10pt;">
<p style=" margin-top:0px;">Groceries &amp; errands</p>
<p style=" margin-top:0px;">- milk<br />- eggs &lt;12&gt;</p></body></html>"#;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(to_plain_text("just <words> here"), "just <words> here");
        assert!(!looks_like_html("a <p> inside"));
        assert!(!looks_like_html("<p>a &amp; b</p>"));
        assert_eq!(to_plain_text("<p>a &amp; b</p>"), "<p>a &amp; b</p>");
        assert!(looks_like_html("  <html><body>x</body></html>"));
    }

    #[test]
    fn qt_html_is_flattened() {
        assert!(looks_like_html(QT_DOCUMENT));
        assert_eq!(
            to_plain_text(QT_DOCUMENT),
            "Groceries & errands\n- milk\n- eggs <12>"
        );
    }

    #[test]
    fn numeric_entities_decode_and_unknown_ones_survive() {
        assert_eq!(
            to_plain_text("<html><body><p>&#72;&#x69; &bogus; &nbsp;</p></body></html>"),
            "Hi &bogus;  "
        );
    }

    #[test]
    fn title_takes_leading_lines_and_trims() {
        let id = NoteId::from("abcdef0123");
        let content = "\n  first\nsecond\nthird\nfourth\nfifth\nsixth\n";
        assert_eq!(
            derive_title(content, 5, &id),
            "first\nsecond\nthird\nfourth"
        );
        assert_eq!(derive_title(content, 2, &id), "first");
    }

    #[test]
    fn blank_content_uses_placeholder() {
        let id = NoteId::from("abcdef0123");
        assert_eq!(derive_title("   \n\t\n", 5, &id), "New Note abcdef01");
        assert_eq!(
            derive_title("<html><body><p> </p></body></html>", 5, &id),
            "New Note abcdef01"
        );
    }

    #[test]
    fn title_derivation_is_idempotent() {
        let id = NoteId::from("n");
        for content in [QT_DOCUMENT, "one\ntwo", "", "x\n\n\n\n\n\ny"] {
            let first = derive_title(content, 5, &id);
            assert_eq!(derive_title(content, 5, &id), first);
        }
    }

    #[test]
    fn chrome_label_is_first_line() {
        assert_eq!(chrome_label("  top \nrest"), "top");
        assert_eq!(chrome_label(""), "");
    }
}
