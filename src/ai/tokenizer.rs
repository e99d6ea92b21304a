//! Token Counting
//!
//! Approximate token estimation used when the provider does not report
//! usage, and for logging prompt size before a call.

/// Characters per token for English text and compact JSON
const CHARS_PER_TOKEN: usize = 4;

/// Character-based token counter for prompt sizing
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter;

impl TokenCounter {
    /// Estimate token count for a string
    pub fn count(&self, text: &str) -> u32 {
        let tokens = text.chars().count().div_ceil(CHARS_PER_TOKEN);
        u32::try_from(tokens).unwrap_or(u32::MAX)
    }

    /// Estimate tokens across several strings
    pub fn count_all<'a>(&self, parts: impl IntoIterator<Item = &'a str>) -> u32 {
        parts
            .into_iter()
            .map(|p| self.count(p))
            .fold(0u32, |acc, n| acc.saturating_add(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_based_counting() {
        let counter = TokenCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(TokenCounter.count("café"), 1);
    }

    #[test]
    fn test_count_all_sums_parts() {
        let counter = TokenCounter::default();
        assert_eq!(counter.count_all(["abcd", "abcdefgh"]), 3);
    }
}
