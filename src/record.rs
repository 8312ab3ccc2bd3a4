//! The opaque unit that flows through a chain.
//!
//! The chain itself never looks inside a [`Record`]. The helpers here exist
//! for concrete filters, which usually treat a record as one line of text
//! with an optional trailing line terminator.

use std::fmt;

/// One line of text (terminator included, when present).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Record(String);

impl Record {
    /// Create a record from a string slice.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Record(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The text of the record without its line terminator.
    pub fn content(&self) -> &str {
        &self.0[..self.0.len() - self.terminator().len()]
    }

    /// The trailing `"\r\n"`, `"\n"`, or `""`.
    pub fn terminator(&self) -> &str {
        if self.0.ends_with("\r\n") {
            "\r\n"
        } else if self.0.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }

    /// Rewrite the content, keeping the original terminator.
    pub fn map_content<F>(&self, f: F) -> Record
    where
        F: FnOnce(&str) -> String,
    {
        let mut out = f(self.content());
        out.push_str(self.terminator());
        Record(out)
    }

    /// True for a line with nothing before its terminator.
    pub fn is_empty_line(&self) -> bool {
        self.content().is_empty()
    }
}

impl From<String> for Record {
    fn from(s: String) -> Self {
        Record(s)
    }
}

impl From<&str> for Record {
    fn from(s: &str) -> Self {
        Record::from_str(s)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_strips_newline() {
        let r = Record::from_str("abc\n");
        assert_eq!(r.content(), "abc");
        assert_eq!(r.terminator(), "\n");
    }

    #[test]
    fn test_content_strips_crlf() {
        let r = Record::from_str("abc\r\n");
        assert_eq!(r.content(), "abc");
        assert_eq!(r.terminator(), "\r\n");
    }

    #[test]
    fn test_unterminated_last_line() {
        let r = Record::from_str("tail");
        assert_eq!(r.content(), "tail");
        assert_eq!(r.terminator(), "");
    }

    #[test]
    fn test_map_content_keeps_terminator() {
        let r = Record::from_str("ab\n").map_content(|s| s.to_uppercase());
        assert_eq!(r.as_str(), "AB\n");
    }

    #[test]
    fn test_is_empty_line() {
        assert!(Record::from_str("\n").is_empty_line());
        assert!(Record::from_str("").is_empty_line());
        assert!(!Record::from_str(" \n").is_empty_line());
    }
}
