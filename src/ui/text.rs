use unicode_width::UnicodeWidthChar;

/// Terminal columns taken by `s`.
pub(super) fn display_width(s: &str) -> usize {
    s.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Cut `s` to at most `max_width` columns, never splitting a wide glyph.
pub(super) fn truncate_display(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width: usize = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        result.push(ch);
    }
    result
}

/// Control characters in file names would move the cursor; show them as `?`.
pub(super) fn sanitize(s: &str) -> String {
    s.chars()
        .map(|ch| if ch.is_control() { '?' } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_wide_glyphs_twice() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_respects_columns() {
        assert_eq!(truncate_display("hello", 3), "hel");
        assert_eq!(truncate_display("hello", 10), "hello");
        assert_eq!(truncate_display("hello", 0), "");
        assert_eq!(truncate_display("日本語", 5), "日本");
    }

    #[test]
    fn sanitize_replaces_control_chars() {
        assert_eq!(sanitize("a\x1b[2Jb\tc"), "a?[2Jb?c");
    }
}
