//! Approximate matching of free-text asset names against catalog names.

use log::debug;
use crate::config::DEFAULT_SIMILARITY_THRESHOLD;

/// A string similarity metric scoring on a 0-100 scale.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Token-order-insensitive ratio: both strings are normalised, split into
/// words, sorted and re-joined before comparing characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl TokenSortRatio {
    fn process(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .to_lowercase();
        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
}

impl SimilarityScorer for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        ratio(&Self::process(a), &Self::process(b))
    }
}

/// `100 * 2 * LCS / (len_a + len_b)`, rounded. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let lcs = prev[b.len()];

    let total = (a.len() + b.len()) as f64;
    (200.0 * lcs as f64 / total).round() as u8
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a> {
    pub name: &'a str,
    pub score: u8,
}

pub struct FuzzyResolver {
    scorer: Box<dyn SimilarityScorer>,
    threshold: u8,
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl std::fmt::Debug for FuzzyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyResolver")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl FuzzyResolver {
    pub fn new(threshold: u8) -> Self {
        Self::with_scorer(TokenSortRatio, threshold)
    }

    pub fn with_scorer(scorer: impl SimilarityScorer + 'static, threshold: u8) -> Self {
        Self {
            scorer: Box::new(scorer),
            threshold,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Highest-scoring candidate regardless of threshold. On equal scores the
    /// first candidate seen wins.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<NameMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<NameMatch<'a>> = None;
        for name in candidates {
            let score = self.scorer.score(query, name);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(NameMatch { name, score });
            }
        }
        best
    }

    /// The best candidate, if it scores at least the threshold.
    pub fn resolve<'a, I>(&self, query: &str, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let best = self.best_match(query, candidates)?;
        if best.score < self.threshold {
            debug!(
                "Best match for {:?} was {:?} at {}, below threshold {}",
                query, best.name, best.score, self.threshold
            );
            return None;
        }
        debug!("Resolved {:?} to {:?} (score {})", query, best.name, best.score);
        Some(best.name)
    }
}
