use tracing::warn;

/// Joins cue texts inside one translation request. Three newlines survive
/// machine translation verbatim and never occur inside a parsed WebVTT cue.
pub const DELIMITER: &str = "\n\n\n";

/// Lazily groups texts into chunks whose joined length stays within `limit`
pub struct Chunks<'a, T> {
    texts: &'a [T],
    pos: usize,
    limit: usize,
    delimiter_len: usize,
}

impl<'a, T: AsRef<str>> Chunks<'a, T> {
    pub fn new(texts: &'a [T], limit: usize, delimiter: &str) -> Self {
        Self {
            texts,
            pos: 0,
            limit,
            delimiter_len: delimiter.chars().count(),
        }
    }
}

impl<'a, T: AsRef<str>> Iterator for Chunks<'a, T> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk: Vec<&'a str> = Vec::new();
        let mut joined_len = 0;

        while let Some(text) = self.texts.get(self.pos) {
            let text = text.as_ref();
            let len = text.chars().count();
            let added = if chunk.is_empty() {
                len
            } else {
                self.delimiter_len + len
            };

            if !chunk.is_empty() && joined_len + added > self.limit {
                break;
            }
            if len > self.limit {
                warn!(
                    "Cue {} is {} characters, over the {} character limit; sending it alone",
                    self.pos, len, self.limit
                );
            }

            chunk.push(text);
            joined_len += added;
            self.pos += 1;
        }

        if chunk.is_empty() { None } else { Some(chunk) }
    }
}

/// Chunk `texts` for a service accepting at most `limit` characters per call
pub fn chunk_texts<T: AsRef<str>>(texts: &[T], limit: usize) -> Chunks<'_, T> {
    Chunks::new(texts, limit, DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Length in characters of `chunk` once joined with `delimiter`
    fn joined_len(chunk: &[&str], delimiter: &str) -> usize {
        let text_len: usize = chunk.iter().map(|t| t.chars().count()).sum();
        text_len + delimiter.chars().count() * chunk.len().saturating_sub(1)
    }

    #[test]
    fn test_everything_fits_in_one_chunk() {
        let texts = vec!["Bonjour", "Au revoir"];
        let chunks: Vec<_> = chunk_texts(&texts, 5000).collect();

        assert_eq!(chunks, vec![vec!["Bonjour", "Au revoir"]]);
        assert_eq!(chunks[0].join(DELIMITER), "Bonjour\n\n\nAu revoir");
    }

    #[test]
    fn test_delimiter_overhead_forces_split() {
        let a = "A".repeat(100);
        let b = "B".repeat(100);
        let c = "C".repeat(100);
        let texts = vec![a.clone(), b.clone(), c.clone()];

        let chunks: Vec<_> = chunk_texts(&texts, 150).collect();
        assert_eq!(chunks, vec![vec![a.as_str()], vec![b.as_str()], vec![c.as_str()]]);
    }

    #[test]
    fn test_exact_fit_includes_delimiter() {
        // 3 + 3 + 3 == 9 fits; one more character does not.
        let texts = vec!["abc", "def"];
        assert_eq!(chunk_texts(&texts, 9).count(), 1);
        assert_eq!(chunk_texts(&texts, 8).count(), 2);
    }

    #[test]
    fn test_oversized_cue_is_emitted_alone() {
        let long = "x".repeat(20);
        let texts = vec!["a".to_string(), long.clone(), "b".to_string()];
        let chunks: Vec<_> = chunk_texts(&texts, 10).collect();

        assert_eq!(chunks, vec![vec!["a"], vec![long.as_str()], vec!["b"]]);
    }

    #[test]
    fn test_oversized_first_cue_yields_no_empty_chunk() {
        let long = "y".repeat(50);
        let texts = vec![long.clone()];
        let chunks: Vec<_> = chunk_texts(&texts, 10).collect();
        assert_eq!(chunks, vec![vec![long.as_str()]]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let texts: Vec<String> = Vec::new();
        assert_eq!(chunk_texts(&texts, 10).next(), None);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 4 chars each, 8 bytes each
        let texts = vec!["éééé", "àààà"];
        assert_eq!(chunk_texts(&texts, 11).count(), 1);
    }

    #[test]
    fn test_joined_len() {
        assert_eq!(joined_len(&[], DELIMITER), 0);
        assert_eq!(joined_len(&["ab"], DELIMITER), 2);
        assert_eq!(joined_len(&["ab", "cd", "e"], DELIMITER), 11);
    }

    proptest! {
        #[test]
        fn chunks_respect_budget(
            texts in prop::collection::vec("[a-zé ]{0,40}", 0..40),
            limit in 1usize..120,
        ) {
            for chunk in chunk_texts(&texts, limit) {
                prop_assert!(!chunk.is_empty());
                if chunk.len() == 1 {
                    continue;
                }
                prop_assert!(joined_len(&chunk, DELIMITER) <= limit);
            }
        }

        #[test]
        fn chunks_cover_input_in_order(
            texts in prop::collection::vec("[a-z ]{0,30}", 0..40),
            limit in 1usize..100,
        ) {
            let flattened: Vec<&str> = chunk_texts(&texts, limit).flatten().collect();
            let original: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
            prop_assert_eq!(flattened, original);
        }
    }
}
