/// Markers tried in order; the identifier is the run of characters that follows.
const VIDEO_ID_MARKERS: [&str; 3] = ["watch?v=", "youtu.be/", "embed/"];

const VIDEO_ID_LEN: usize = 11;

fn is_video_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Pull a video identifier out of a URL, or accept a bare 11-character id.
///
/// Very small heuristic; avoids adding a URL parser dependency. Returns
/// `None` when no recognition rule matches (the caller treats that as an
/// invalid URL).
pub fn extract_video_id(input: &str) -> Option<String> {
    for marker in VIDEO_ID_MARKERS {
        if let Some(idx) = input.find(marker) {
            let rest = &input[idx + marker.len()..];
            let id: String = rest
                .chars()
                .take_while(|c| !matches!(c, '&' | '\n' | '?' | '#'))
                .collect();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }

    if input.len() == VIDEO_ID_LEN && input.chars().all(is_video_id_char) {
        return Some(input.to_string());
    }

    None
}

/// Canonical watch URL handed to yt-dlp for a bare identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123XYZ_q"),
            Some("abc123XYZ_q".to_string())
        );
    }

    #[test]
    fn extracts_from_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_from_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn stops_at_query_delimiters() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123XYZ_q&list=PLx"),
            Some("abc123XYZ_q".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=30"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123XYZ_q#t=1m"),
            Some("abc123XYZ_q".to_string())
        );
    }

    #[test]
    fn accepts_bare_eleven_char_id() {
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("abc-123_XYZ"),
            Some("abc-123_XYZ".to_string())
        );
    }

    #[test]
    fn rejects_non_matching_input() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        // Right alphabet, wrong length.
        assert_eq!(extract_video_id("abc123"), None);
        assert_eq!(extract_video_id("abc123XYZ_q9extra"), None);
        // Right length, wrong alphabet.
        assert_eq!(extract_video_id("abc 123 XYZ"), None);
    }

    #[test]
    fn empty_capture_falls_through() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=&x=1"), None);
    }

    #[test]
    fn builds_canonical_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
