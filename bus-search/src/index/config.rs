//! Fuzzy matching configuration.

/// Tuning knobs for the fuzzy matcher.
///
/// Fixed per deployment; changing them means building a new index.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// How many characters from the start of a value a match may sit
    /// before the proximity penalty alone reaches 1.0.
    pub distance: usize,

    /// Maximum accepted score. 0.0 only accepts exact matches at the start
    /// of a value; 1.0 accepts nearly anything.
    pub threshold: f64,

    /// Sort matches best-first. When false, matches keep dataset order.
    pub should_sort: bool,

    /// Keep numeric scores on returned matches.
    /// Ranking uses scores either way.
    pub include_score: bool,
}

impl MatchConfig {
    /// Set the proximity distance.
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    /// Set the acceptance threshold (clamped to 0.0..=1.0).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable relevance sorting.
    pub fn with_sort(mut self, should_sort: bool) -> Self {
        self.should_sort = should_sort;
        self
    }

    /// Retain scores on returned matches.
    pub fn with_scores(mut self, include_score: bool) -> Self {
        self.include_score = include_score;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            distance: 50,
            threshold: 0.6,
            should_sort: true,
            include_score: false,
        }
    }
}
