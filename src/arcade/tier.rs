use serde::{Deserialize, Serialize};

/// One row of the difficulty table: reached once the score hits `threshold`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDef {
    pub name: String,
    pub threshold: u32,
}

impl TierDef {
    pub fn new(name: &str, threshold: u32) -> Self {
        Self {
            name: name.to_string(),
            threshold,
        }
    }
}

pub fn default_tiers() -> Vec<TierDef> {
    vec![
        TierDef::new("East Blue", 0),
        TierDef::new("Paradise", 3000),
        TierDef::new("Warlord Commander", 8000),
        TierDef::new("Yonko", 15000),
    ]
}

/// Index of the highest tier whose threshold is <= `score`.
///
/// `tiers` must be sorted by threshold with the first at 0; config validation
/// guarantees both.
pub fn tier_index_for_score(tiers: &[TierDef], score: u32) -> usize {
    tiers
        .iter()
        .rposition(|t| t.threshold <= score)
        .unwrap_or(0)
}

/// Tracks the current tier and only ever moves forward.
#[derive(Clone, Debug)]
pub struct TierProgress {
    index: usize,
}

impl TierProgress {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the new index when the score crosses into a higher tier.
    pub fn advance(&mut self, tiers: &[TierDef], score: u32) -> Option<usize> {
        let candidate = tier_index_for_score(tiers, score);
        if candidate > self.index {
            self.index = candidate;
            Some(candidate)
        } else {
            None
        }
    }
}

impl Default for TierProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_lookup() {
        let tiers = default_tiers();
        assert_eq!(tier_index_for_score(&tiers, 0), 0);
        assert_eq!(tier_index_for_score(&tiers, 2999), 0);
        assert_eq!(tier_index_for_score(&tiers, 3000), 1);
        assert_eq!(tier_index_for_score(&tiers, 9000), 2);
        assert_eq!(tier_index_for_score(&tiers, 1_000_000), 3);
    }

    #[test]
    fn test_tier_progress_monotonic() {
        let tiers = default_tiers();
        let mut progress = TierProgress::new();
        let mut last = 0;
        let mut transitions = 0;
        for score in (0..20_000).step_by(250) {
            if progress.advance(&tiers, score).is_some() {
                transitions += 1;
            }
            assert!(progress.index() >= last);
            last = progress.index();
        }
        assert_eq!(transitions, 3);
        assert_eq!(progress.index(), 3);
    }

    #[test]
    fn test_tier_never_regresses() {
        let tiers = default_tiers();
        let mut progress = TierProgress::new();
        assert_eq!(progress.advance(&tiers, 8000), Some(2));
        assert_eq!(progress.advance(&tiers, 100), None);
        assert_eq!(progress.index(), 2);
    }
}
