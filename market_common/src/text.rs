//! Bounded text buffers for display strings.
//!
//! `FixedText<N>` wraps a `heapless::String<N>`: at most `N` bytes of content stored
//! inline, which is what a C string buffer of `N + 1` bytes holds. Writes past the
//! capacity are silently truncated at the last whole character that fits, and once a
//! write has been truncated every following write in the same fill is dropped, the way
//! `snprintf` stops at the end of its buffer.
use std::fmt;

/// Size of every display buffer on the watch, terminator slot included.
pub const DISPLAY_BUFFER_SIZE: usize = 32;

/// Display string sized like the watch's static buffers.
pub type DisplayText = FixedText<{ DISPLAY_BUFFER_SIZE - 1 }>;

/// Fixed-capacity, truncating text value.
#[derive(Clone, Default)]
pub struct FixedText<const N: usize> {
    text: heapless::String<N>,
    truncated: bool,
}

impl<const N: usize> FixedText<N> {
    /// Maximum content length in bytes.
    pub const CAPACITY: usize = N;

    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            text: heapless::String::new(),
            truncated: false,
        }
    }

    /// Create a buffer holding `text`, truncated to [`Self::CAPACITY`].
    pub fn from_truncated(text: &str) -> Self {
        let mut out = Self::new();
        out.set(text);
        out
    }

    /// Overwrite the content in place.
    pub fn set(&mut self, text: &str) {
        self.clear();
        self.push_truncated(text);
    }

    /// Reset to the empty string.
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// Append as much of `text` as fits.
    pub fn push_truncated(&mut self, text: &str) {
        if self.truncated {
            return;
        }
        for c in text.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                return;
            }
        }
    }

    /// Content as a string slice.
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` when the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` when the last fill did not fit completely.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> fmt::Write for FixedText<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_truncated(s);
        Ok(())
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> PartialEq for FixedText<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for FixedText<N> {}

impl<const N: usize> PartialEq<&str> for FixedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn short_text_is_kept_verbatim() {
        let text = DisplayText::from_truncated("19500.25");
        assert_eq!(text, "19500.25");
        assert!(!text.is_truncated());
    }

    #[test]
    fn long_text_is_cut_to_31_bytes() {
        let long = "0123456789".repeat(5);
        let text = DisplayText::from_truncated(&long);
        assert_eq!(DisplayText::CAPACITY, 31);
        assert_eq!(text.len(), 31);
        assert_eq!(text.as_str(), &long[..31]);
        assert!(text.is_truncated());
    }

    #[test]
    fn truncation_never_splits_a_character() {
        // 11 three-byte characters, 33 bytes; only 10 whole ones fit in 31.
        let text = DisplayText::from_truncated("円円円円円円円円円円円");
        assert_eq!(text.len(), 30);
        assert_eq!(text.as_str().chars().count(), 10);
    }

    #[test]
    fn formatted_writes_stop_after_first_truncation() {
        let mut text = FixedText::<7>::new();
        write!(text, "{}円{}", "abcde", "x").unwrap();
        // "abcde" fits, "円" needs 3 bytes with 2 left, "x" must not sneak in after it.
        assert_eq!(text, "abcde");
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut text = DisplayText::from_truncated("Loading...");
        text.set("19500(+50)");
        assert_eq!(text, "19500(+50)");
        assert!(!text.is_truncated());
    }
}
