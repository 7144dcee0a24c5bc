use std::collections::HashMap;

use rand::Rng;
use rand::rngs::SmallRng;
use tracing::warn;

use crate::generator::load_asset;

const THEMED_ASSET: &str = "arcade_words.json";

/// Arcade word lists keyed by difficulty tier name.
pub struct ThemedWords {
    lists: HashMap<String, Vec<String>>,
}

impl ThemedWords {
    pub fn load() -> Self {
        match load_asset::<HashMap<String, Vec<String>>>(THEMED_ASSET) {
            Ok(lists) => Self::from_lists(lists),
            Err(e) => {
                warn!(error = %e, "arcade word lists unavailable, using plain words");
                Self::from_lists(HashMap::new())
            }
        }
    }

    pub fn from_lists(lists: HashMap<String, Vec<String>>) -> Self {
        let lists = lists
            .into_iter()
            .map(|(tier, words)| {
                let words: Vec<String> = words
                    .into_iter()
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty() && !w.contains(char::is_whitespace))
                    .collect();
                (normalize_tier(&tier), words)
            })
            .filter(|(_, words)| !words.is_empty())
            .collect();
        Self { lists }
    }

    /// None when the tier has no list; callers fall back to plain words.
    pub fn pick(&self, tier: &str, rng: &mut SmallRng) -> Option<String> {
        let words = self.lists.get(&normalize_tier(tier))?;
        Some(words[rng.gen_range(0..words.len())].clone())
    }
}

/// "Warlord_Commander" and "warlord commander" name the same tier.
fn normalize_tier(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}
