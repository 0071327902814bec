use crate::constants::markers;

/// Head-truncate `text` to `max_length` characters plus the truncation
/// marker. Text that already fits is returned unchanged, so applying this
/// twice with the same bound gives the same result as applying it once.
pub fn condense(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], markers::TRUNCATED),
    }
}

/// Split `text` into windows of at most `size` characters where consecutive
/// windows share `overlap` characters. Breaks prefer a newline, then a
/// space, when one falls past the overlap region.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(size - 1);
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let hard_end = (start + size).min(total);
        let end = if hard_end == total {
            total
        } else {
            soft_break(&chars[start + overlap + 1..hard_end])
                .map(|offset| start + overlap + 1 + offset + 1)
                .unwrap_or(hard_end)
        };

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(piece);
        }

        if end == total {
            break;
        }
        start = end - overlap;
    }

    chunks
}

/// Index of the last newline in `window`, else the last space.
fn soft_break(window: &[char]) -> Option<usize> {
    window
        .iter()
        .rposition(|c| *c == '\n')
        .or_else(|| window.iter().rposition(|c| *c == ' '))
}
