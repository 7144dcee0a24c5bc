pub mod dictionary;
pub mod passage;
pub mod themed;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_embed::Embed;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::generator::dictionary::Dictionary;
use crate::generator::passage::PassageLibrary;
use crate::generator::themed::ThemedWords;

#[derive(Embed)]
#[folder = "assets/data/"]
struct DataAssets;

/// Parse a bundled JSON asset.
pub(crate) fn load_asset<T: DeserializeOwned>(name: &str) -> Result<T> {
    let file = DataAssets::get(name).ok_or_else(|| Error::MissingAsset(name.to_string()))?;
    serde_json::from_slice(file.data.as_ref()).map_err(|e| Error::MalformedAsset {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    pub text: String,
    pub actual_word_count: usize,
}

impl Passage {
    pub fn new(text: String) -> Self {
        let actual_word_count = text.split_whitespace().count();
        Self {
            text,
            actual_word_count,
        }
    }

    pub fn words(&self) -> Vec<String> {
        self.text.split_whitespace().map(str::to_string).collect()
    }
}

/// Where tests and the arcade get their words from.
pub trait WordSource {
    fn random_word(&mut self) -> String;
    fn random_passage(&mut self, nominal: usize) -> Passage;
    /// A word from the named difficulty tier's list.
    fn themed_word(&mut self, tier: &str) -> String;
}

/// `count` random words where no word directly repeats its predecessor.
pub fn generate_words(source: &mut dyn WordSource, count: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::with_capacity(count);
    while words.len() < count {
        let mut word = source.random_word();
        // A one-word dictionary would spin forever.
        for _ in 0..8 {
            if words.last() != Some(&word) {
                break;
            }
            word = source.random_word();
        }
        words.push(word);
    }
    words
}

/// The bundled word lists, passages and arcade tier lists.
pub struct BundledSource {
    dictionary: Dictionary,
    passages: PassageLibrary,
    themed: ThemedWords,
    rng: SmallRng,
}

impl BundledSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            dictionary: Dictionary::load(),
            passages: PassageLibrary::load(),
            themed: ThemedWords::load(),
            rng,
        }
    }
}

impl WordSource for BundledSource {
    fn random_word(&mut self) -> String {
        self.dictionary.pick(&mut self.rng)
    }

    fn random_passage(&mut self, nominal: usize) -> Passage {
        self.passages.pick(nominal, &mut self.rng)
    }

    fn themed_word(&mut self, tier: &str) -> String {
        match self.themed.pick(tier, &mut self.rng) {
            Some(word) => word,
            None => self.dictionary.pick(&mut self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cycle {
        words: Vec<&'static str>,
        next: usize,
    }

    impl WordSource for Cycle {
        fn random_word(&mut self) -> String {
            let w = self.words[self.next % self.words.len()];
            self.next += 1;
            w.to_string()
        }
        fn random_passage(&mut self, _nominal: usize) -> Passage {
            Passage::new("a b c".into())
        }
        fn themed_word(&mut self, _tier: &str) -> String {
            self.random_word()
        }
    }

    #[test]
    fn test_generate_words_skips_immediate_repeats() {
        let mut source = Cycle {
            words: vec!["sea", "sea", "ship"],
            next: 0,
        };
        let words = generate_words(&mut source, 6);
        assert_eq!(words.len(), 6);
        for pair in words.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_generate_words_single_word_terminates() {
        let mut source = Cycle {
            words: vec!["only"],
            next: 0,
        };
        assert_eq!(generate_words(&mut source, 3).len(), 3);
    }

    #[test]
    fn test_passage_counts_words() {
        let p = Passage::new("  the  quick brown\nfox ".into());
        assert_eq!(p.actual_word_count, 4);
        assert_eq!(p.words(), vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn test_bundled_source_is_deterministic_with_seed() {
        let mut a = BundledSource::new(Some(7));
        let mut b = BundledSource::new(Some(7));
        let wa: Vec<String> = (0..10).map(|_| a.random_word()).collect();
        let wb: Vec<String> = (0..10).map(|_| b.random_word()).collect();
        assert_eq!(wa, wb);
    }

    #[test]
    fn test_bundled_assets_parse() {
        let words: Vec<String> = load_asset("words.json").unwrap();
        assert!(words.len() > 100);
        assert!(matches!(
            load_asset::<Vec<String>>("nope.json"),
            Err(Error::MissingAsset(_))
        ));
    }
}
