use std::collections::BTreeMap;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::generator::{Passage, load_asset};

const PASSAGES_ASSET: &str = "passages.json";

/// Used when no bundled passage exists at all.
const FALLBACK_PASSAGES: &[&str] = &[
    "the quick brown fox jumps over the lazy dog and then runs across the field while the sun sets behind the hills",
    "it was the best of times it was the worst of times it was the age of wisdom it was the age of foolishness",
    "she walked along the narrow path through the forest listening to the birds singing in the trees above her head",
];

/// Curated passages grouped by nominal length (`"20_words"`, `"50_words"`, ...).
pub struct PassageLibrary {
    buckets: BTreeMap<usize, Vec<String>>,
}

impl PassageLibrary {
    pub fn load() -> Self {
        match load_asset::<BTreeMap<String, Vec<String>>>(PASSAGES_ASSET) {
            Ok(raw) => Self::from_buckets(raw),
            Err(e) => {
                warn!(error = %e, "passages unavailable, using fallback passages");
                Self::from_buckets(BTreeMap::new())
            }
        }
    }

    /// Keys that do not look like `<n>_words` are ignored.
    pub fn from_buckets(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut buckets: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (key, passages) in raw {
            let Some(n) = key.strip_suffix("_words").and_then(|n| n.parse::<usize>().ok()) else {
                warn!(key, "ignoring passage bucket with unexpected name");
                continue;
            };
            let passages: Vec<String> = passages
                .into_iter()
                .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|p| !p.is_empty())
                .collect();
            if !passages.is_empty() {
                buckets.insert(n, passages);
            }
        }
        if buckets.is_empty() {
            buckets.insert(
                20,
                FALLBACK_PASSAGES.iter().map(|p| p.to_string()).collect(),
            );
        }
        Self { buckets }
    }

    pub fn pick(&self, nominal: usize, rng: &mut SmallRng) -> Passage {
        if let Some(passages) = self.buckets.get(&nominal) {
            let idx = rng.gen_range(0..passages.len());
            return Passage::new(passages[idx].clone());
        }
        self.assemble(nominal, rng)
    }

    /// Join shorter passages until the nominal count is reached. The result
    /// can overshoot, which is why the actual count travels with the text.
    fn assemble(&self, nominal: usize, rng: &mut SmallRng) -> Passage {
        let mut pool: Vec<&String> = self
            .buckets
            .range(..nominal.max(1))
            .flat_map(|(_, ps)| ps.iter())
            .collect();
        if pool.is_empty() {
            pool = self.buckets.values().flat_map(|ps| ps.iter()).collect();
        }

        let mut parts: Vec<&str> = Vec::new();
        let mut count = 0;
        while count < nominal.max(1) {
            pool.shuffle(rng);
            for p in &pool {
                parts.push(p.as_str());
                count += p.split_whitespace().count();
                if count >= nominal {
                    break;
                }
            }
        }
        Passage::new(parts.join(" "))
    }
}
