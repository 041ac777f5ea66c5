//! Fuzzy matching of free-text picks against actual scorer names.
//!
//! Picks come in as manual entry ("Kelce", "Pat Mahomes", "Penix Jr") and
//! must tolerate nicknames, suffixes and small typos without accepting an
//! unrelated player. The cascade runs cheap exact checks before falling back
//! to an edit-distance ratio:
//!
//! 1. normalize (trim + case-fold), exact equality
//! 2. substring containment in either direction
//! 3. identical last token (surname)
//! 4. `strsim::normalized_levenshtein >= threshold`

use strsim::normalized_levenshtein;

/// Default similarity threshold for the edit-distance tier.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatcher {
    threshold: f64,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl NameMatcher {
    /// Matcher with a caller-supplied threshold, clamped to (0, 1].
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Does the picked name refer to this candidate scorer?
    pub fn matches(&self, picked_name: &str, candidate_name: &str) -> bool {
        let a = normalize(picked_name);
        let b = normalize(candidate_name);
        if a.is_empty() || b.is_empty() {
            return false;
        }

        if a == b {
            return true;
        }

        // Suffix/nickname forms: "Pat Mahomes" ⊂ "Patrick Mahomes" fails
        // this, but "Penix Jr" ⊂ "Michael Penix Jr" passes.
        if a.contains(&b) || b.contains(&a) {
            return true;
        }

        // First-name variation and initials: compare surnames only.
        if let (Some(sa), Some(sb)) = (a.split_whitespace().last(), b.split_whitespace().last()) {
            if sa == sb {
                return true;
            }
        }

        normalized_levenshtein(&a, &b) >= self.threshold
    }

    /// Scored variant in [0, 1], used to disambiguate between candidates.
    ///
    /// Exact and substring matches score 1.0; everything else (including a
    /// surname-only match) scores its edit-distance ratio, so two teammates
    /// sharing a surname are separated by how close the full strings are.
    pub fn similarity(picked_name: &str, candidate_name: &str) -> f64 {
        let a = normalize(picked_name);
        let b = normalize(candidate_name);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b || a.contains(&b) || b.contains(&a) {
            return 1.0;
        }
        normalized_levenshtein(&a, &b)
    }

    /// Pick the candidate the name most plausibly refers to.
    ///
    /// Policy: among candidates that match at all, highest similarity wins;
    /// ties prefer the first-TD scorer over any-time entries. Candidates are
    /// expected in deterministic (sorted) order, so remaining ties resolve
    /// to the first seen, stably.
    pub fn best_candidate<'a, I>(
        &self,
        picked_name: &str,
        first_td_scorer: Option<&str>,
        candidates: I,
    ) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(f64, bool, &'a str)> = None;

        for candidate in candidates {
            if !self.matches(picked_name, candidate) {
                continue;
            }
            let score = Self::similarity(picked_name, candidate);
            let is_first = first_td_scorer.is_some_and(|f| f == candidate);

            let better = match &best {
                None => true,
                Some((best_score, best_is_first, _)) => {
                    score > *best_score || (score == *best_score && is_first && !*best_is_first)
                }
            };
            if better {
                best = Some((score, is_first, candidate));
            }
        }

        best.map(|(_, _, name)| name)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
