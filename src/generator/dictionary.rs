use rand::Rng;
use rand::rngs::SmallRng;
use tracing::warn;

use crate::generator::load_asset;

const WORDS_ASSET: &str = "words.json";

/// Used when the bundled list is missing or unreadable.
pub const FALLBACK_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "it", "for", "not", "on", "with",
    "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say",
    "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what",
    "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can",
    "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "code", "data", "type", "learn", "work", "such",
    "give", "want", "use", "software", "build", "great", "should", "product", "system",
    "first", "well", "way", "even", "new",
];

pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn load() -> Self {
        let words = match load_asset::<Vec<String>>(WORDS_ASSET) {
            Ok(words) => words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_alphabetic()))
                .collect(),
            Err(e) => {
                warn!(error = %e, "word list unavailable, using fallback words");
                Vec::new()
            }
        };
        Self::from_words(words)
    }

    /// An empty list falls back to the built-in words.
    pub fn from_words(words: Vec<String>) -> Self {
        if words.is_empty() {
            return Self {
                words: FALLBACK_WORDS.iter().map(|w| w.to_string()).collect(),
            };
        }
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn pick(&self, rng: &mut SmallRng) -> String {
        let idx = rng.gen_range(0..self.words.len());
        self.words[idx].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_bundled_words_are_clean() {
        let dictionary = Dictionary::load();
        assert!(dictionary.len() > 100);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let w = dictionary.pick(&mut rng);
            assert!(!w.is_empty());
            assert_eq!(w, w.to_lowercase());
        }
    }

    #[test]
    fn test_empty_list_falls_back() {
        let dictionary = Dictionary::from_words(Vec::new());
        assert_eq!(dictionary.len(), FALLBACK_WORDS.len());
    }
}
