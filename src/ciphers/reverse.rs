//! Character reversal

/// Reverse the character sequence of `text`.
pub fn reverse_text(text: &str) -> String {
    text.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_basic() {
        assert_eq!(reverse_text("Hello World"), "dlroW olleH");
        assert_eq!(reverse_text("Hello, World!"), "!dlroW ,olleH");
    }

    #[test]
    fn test_reverse_edges() {
        assert_eq!(reverse_text(""), "");
        assert_eq!(reverse_text("A"), "A");
        assert_eq!(reverse_text("racecar"), "racecar");
    }

    #[test]
    fn test_reverse_is_involution() {
        let s = "Test message 123";
        assert_eq!(reverse_text(&reverse_text(s)), s);
    }
}
