//! Text preparation for TTS — locale punctuation normalization and chunking.
//!
//! Pure functions, no I/O.

/// Sentence-final marks the local engine's prosody model understands.
const TERMINAL_MARKS: &[char] = &['。', '！', '？', '…', '!', '?', '.'];

/// Default maximum chunk length (in chars) for [`split_chunks`].
///
/// The translate endpoint used by the cloud-simple engine rejects long
/// query strings, so text is synthesized in segments of at most this size.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 200;

/// Normalize text for the local neural engine.
///
/// ASCII punctuation is mapped to the full-width equivalents the acoustic
/// model was trained on, and a sentence-final `。` is appended when the text
/// does not already end in a terminal mark. Adds at most one char.
pub fn prepare_for_local(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        out.push(to_fullwidth(c));
    }
    if !out.chars().next_back().is_some_and(is_terminal_mark) {
        out.push('。');
    }
    out
}

fn to_fullwidth(c: char) -> char {
    match c {
        ',' => '，',
        '.' => '。',
        '?' => '？',
        '!' => '！',
        ';' => '；',
        ':' => '：',
        _ => c,
    }
}

fn is_terminal_mark(c: char) -> bool {
    TERMINAL_MARKS.contains(&c)
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Prefers sentence-final punctuation, then whitespace, then hard-splits.
/// Works on char boundaries so multi-byte text is never cut mid-character.
/// Chunks that are empty after trimming are discarded.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "max_chars must be positive");

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut result = Vec::new();
    let mut start = 0;

    while chars.len() - start > max_chars {
        let window = &chars[start..start + max_chars];
        let split_at = sentence_split(window)
            .or_else(|| whitespace_split(window))
            .unwrap_or(max_chars);

        let chunk: String = window[..split_at].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            result.push(chunk.to_string());
        }
        start += split_at;
        // Skip whitespace between chunks
        while start < chars.len() && chars[start].is_whitespace() {
            start += 1;
        }
    }

    let tail: String = chars[start..].iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        result.push(tail.to_string());
    }

    result
}

/// Last sentence-final mark in the window, if it leaves a usefully sized
/// chunk behind (at least half the window).
fn sentence_split(window: &[char]) -> Option<usize> {
    window
        .iter()
        .rposition(|&c| is_terminal_mark(c))
        .map(|pos| pos + 1)
        .filter(|&end| end >= window.len() / 2)
}

/// Last whitespace in the window, if it leaves at least a third of it.
fn whitespace_split(window: &[char]) -> Option<usize> {
    window
        .iter()
        .rposition(|c| c.is_whitespace())
        .filter(|&pos| pos >= window.len() / 3)
}
