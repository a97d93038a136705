//! Splits long text into bounded chunks at word or line boundaries.

use std::ops::Range;

/// Default chunk bound, sized to stay under the summarize request limit.
pub const DEFAULT_MAX_LEN: usize = 3500;

/// Split `text` into trimmed chunks of at most `max_len` characters.
///
/// Chunks that are empty after trimming are dropped, so a whitespace-only
/// document yields no chunks.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    chunk_spans(text, max_len)
        .into_iter()
        .map(|span| text[span].trim())
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw byte ranges of each chunk window, before trimming.
///
/// The ranges are contiguous and cover `text` exactly once. Each window holds
/// at most `max_len` characters and, unless it reaches the end of the text, is
/// cut at the rightmost newline or space inside it. A window with no usable
/// boundary keeps its full length so unbroken tokens still make progress.
pub fn chunk_spans(text: &str, max_len: usize) -> Vec<Range<usize>> {
    let max_len = max_len.max(1);

    // Byte offset of every char, plus the end of the text.
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = offsets.len() - 1;

    let mut spans = Vec::new();
    let mut start = 0;
    while start < char_count {
        let mut end = (start + max_len).min(char_count);
        if end < char_count {
            let window = &text[offsets[start]..offsets[end]];
            if let Some(byte_pos) = window.rfind(|c: char| c == '\n' || c == ' ') {
                let boundary = start + window[..byte_pos].chars().count();
                if boundary > start {
                    end = boundary;
                }
            }
        }
        spans.push(offsets[start]..offsets[end]);
        start = end;
    }
    spans
}
