//! Text chunking under platform message-length limits.

/// Find the last UTF-8 char boundary at or before `byte_index` in `s`.
///
/// Returns a byte offset that is safe to use for slicing `s`.
fn floor_char_boundary(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return s.len();
    }
    let mut i = byte_index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split text into an ordered sequence of chunks of at most `limit` bytes.
///
/// Prefers cutting at the last newline within the limit; if the only
/// newline sits in the front half of the window the cut falls back to the
/// hard limit, so no chunk degenerates into a tiny fragment. Never splits
/// inside a multi-byte UTF-8 character. Empty or whitespace-only input
/// yields no chunks at all.
pub fn split_text(text: &str, limit: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > limit {
        let window = floor_char_boundary(remaining, limit);

        // If the limit is smaller than the first character, force at least
        // one character of progress to avoid an infinite loop.
        if window == 0 {
            let first_char_end = remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len());
            chunks.push(remaining[..first_char_end].to_string());
            remaining = remaining[first_char_end..].trim_start();
            continue;
        }

        let cut = match remaining[..window].rfind('\n') {
            Some(pos) if pos >= std::cmp::max(1, limit / 2) => pos,
            _ => window,
        };

        chunks.push(remaining[..cut].trim_end().to_string());
        remaining = remaining[cut..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}
