use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Column index to spreadsheet letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn letters_from_col(mut col: usize) -> String {
    col += 1;
    let mut buf = Vec::new();
    while col > 0 {
        col -= 1;
        let rem = (col % 26) as u8;
        buf.push((b'A' + rem) as char);
        col /= 26;
    }
    buf.into_iter().rev().collect()
}

pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `idx`-th character (or the end of the string)
pub fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map(|(b, _)| b).unwrap_or(s.len())
}

pub fn insert_char_at(s: &mut String, idx: usize, c: char) {
    let at = byte_offset(s, idx);
    s.insert(at, c);
}

/// Remove the character at a character index, returning it
pub fn remove_char_at(s: &mut String, idx: usize) -> Option<char> {
    if idx >= char_count(s) {
        return None;
    }
    let at = byte_offset(s, idx);
    Some(s.remove(at))
}

/// Display width in terminal columns
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` down to `width` terminal columns, marking the cut with '…'
pub fn fit_width(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_from_col() {
        assert_eq!(letters_from_col(0), "A");
        assert_eq!(letters_from_col(25), "Z");
        assert_eq!(letters_from_col(26), "AA");
        assert_eq!(letters_from_col(51), "AZ");
        assert_eq!(letters_from_col(52), "BA");
    }

    #[test]
    fn test_char_editing_multibyte() {
        let mut s = String::from("héllo");
        insert_char_at(&mut s, 2, 'x');
        assert_eq!(s, "héxllo");
        assert_eq!(remove_char_at(&mut s, 1), Some('é'));
        assert_eq!(s, "hxllo");
        assert_eq!(remove_char_at(&mut s, 10), None);
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("short", 10), "short");
        assert_eq!(fit_width("truncate me", 6), "trunc…");
        assert_eq!(fit_width("abc", 0), "");
    }
}
