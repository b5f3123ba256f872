//! Turns one flat transcript blob into an ordered list of post-sized segments.

/// Prefix for the opening post of a multi-segment thread.
pub const THREAD_MARKER: &str = "🧵 Thread: ";

pub const EMPTY_TRANSCRIPT_FALLBACK: &str = "Unable to generate thread from this video.";
pub const EMPTY_THREAD_FALLBACK: &str = "Unable to generate meaningful threads from this video.";

/// Split a transcript on sentence-ending punctuation. Whitespace is trimmed
/// and empty pieces dropped; input order is preserved.
fn split_sentences(transcript: &str) -> Vec<&str> {
    transcript
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Bucket the transcript's sentences into up to `target_count` segments of at
/// most `max_chars` characters each.
///
/// `target_count` must be at least 1 (the HTTP layer rejects anything else).
/// Sentences are divided evenly by integer division, with the last segment
/// absorbing the remainder. When there are fewer sentences than requested
/// segments, the trailing iterations produce empty slices and are dropped, so
/// fewer than `target_count` segments come back. The result is never empty: a
/// fallback message stands in when the transcript yields nothing usable.
pub fn build_thread(transcript: &str, target_count: usize, max_chars: usize) -> Vec<String> {
    debug_assert!(target_count >= 1);
    debug_assert!(max_chars >= 4);

    let sentences = split_sentences(transcript);
    if sentences.is_empty() {
        return vec![EMPTY_TRANSCRIPT_FALLBACK.to_string()];
    }

    let per_segment = (sentences.len() / target_count).max(1);
    let mut threads = Vec::with_capacity(target_count);

    for i in 0..target_count {
        let start = (i * per_segment).min(sentences.len());
        let end = if i + 1 == target_count {
            sentences.len()
        } else {
            ((i + 1) * per_segment).min(sentences.len())
        };

        let mut text = sentences[start..end].join(". ");

        if text.chars().count() > max_chars {
            let mut truncated: String = text.chars().take(max_chars - 3).collect();
            truncated.push_str("...");
            text = truncated;
        }

        // The marker goes on after truncation, so the opening post may run
        // over the cap by the marker's own length.
        if i == 0 && target_count > 1 {
            text = format!("{}{}", THREAD_MARKER, text);
        }

        if !text.is_empty() {
            threads.push(text);
        }
    }

    if threads.is_empty() {
        return vec![EMPTY_THREAD_FALLBACK.to_string()];
    }
    threads
}
