use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        // First char that fits, else empty
        return s
            .chars()
            .find(|ch| ch.width().unwrap_or(0) <= width)
            .map(|ch| ch.to_string())
            .unwrap_or_default();
    }

    // Stop at width - 2 to leave room for ".."
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns (left-aligned).
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Right-align within `width` display columns. Never truncates.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(sw)), s)
}
