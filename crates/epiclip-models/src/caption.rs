//! Caption text preparation.
//!
//! Caption strings are truncated to a hard ceiling of twice the line
//! width, then greedily wrapped at word boundaries. A single word
//! longer than the width is emitted as an over-length line rather than
//! split.

/// Up to two caller-supplied caption strings. Transient per-request
/// value; empty strings mean "no caption".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionRequest {
    pub top: String,
    pub bottom: String,
}

impl CaptionRequest {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }

    /// Whether both captions are empty. Callers skip the compositor
    /// entirely in that case to avoid a pointless re-encode.
    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }
}

/// Truncate and wrap a caption into display lines.
///
/// Input is first cut to `2 * max_line_width` characters, then wrapped
/// greedily into lines of at most `max_line_width` characters.
pub fn wrap_caption(text: &str, max_line_width: usize) -> Vec<String> {
    let truncated: String = text.chars().take(max_line_width * 2).collect();

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in truncated.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_line_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request() {
        assert!(CaptionRequest::default().is_empty());
        assert!(!CaptionRequest::new("hi", "").is_empty());
        assert!(!CaptionRequest::new("", "there").is_empty());
    }

    #[test]
    fn test_wrap_simple() {
        assert_eq!(
            wrap_caption("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_exact_width() {
        assert_eq!(wrap_caption("abcde fghij", 11), vec!["abcde fghij"]);
        assert_eq!(wrap_caption("abcde fghij", 10), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_long_word_not_split() {
        // Truncation to 2x width happens first; the remaining over-length
        // word is emitted whole rather than split.
        let lines = wrap_caption("hi incomprehensibilities", 10);
        assert_eq!(lines, vec!["hi", "incomprehensibili"]);
        assert!(lines[1].chars().count() > 10);
    }

    #[test]
    fn test_truncation_before_wrapping() {
        // 500 input chars, width 40: hard ceiling of 80 chars applies first
        let text = "word ".repeat(100);
        let lines = wrap_caption(&text, 40);
        let total: usize = lines.iter().map(|l| l.chars().count()).sum::<usize>()
            + lines.len().saturating_sub(1);
        assert!(total <= 80);
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
    }

    #[test]
    fn test_whitespace_only() {
        assert!(wrap_caption("   ", 10).is_empty());
        assert!(wrap_caption("", 10).is_empty());
    }
}
