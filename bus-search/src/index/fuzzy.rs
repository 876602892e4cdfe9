//! The fuzzy index.

use std::collections::HashMap;
use std::sync::Arc;

use super::config::MatchConfig;
use super::matcher::{Scratch, normalize, score};
use super::searchable::Searchable;

/// One search hit: a position in the indexed record list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Index into the record list the index was built from.
    pub index: usize,

    /// Combined score (lower is better). `None` unless the index was
    /// configured to keep scores.
    pub score: Option<f64>,
}

/// Approximate-match index over one record list and one set of keys.
///
/// Field values are normalized and deduplicated once at build time, so a
/// search scores each distinct value once however many records share it.
/// The index is immutable: changing records or keys means building a new
/// one.
pub struct FuzzyIndex<T: Searchable> {
    records: Arc<[T]>,
    keys: &'static [T::Key],
    /// Distinct normalized values of the selected keys.
    values: Vec<Box<[char]>>,
    /// Positions in `values`, one list per record.
    record_values: Vec<Vec<u32>>,
    config: MatchConfig,
}

impl<T: Searchable> FuzzyIndex<T> {
    /// Build an index over `records` matching on `keys`.
    pub fn build(records: Arc<[T]>, keys: &'static [T::Key], config: MatchConfig) -> Self {
        let mut values: Vec<Box<[char]>> = Vec::new();
        let mut positions: HashMap<Box<[char]>, u32> = HashMap::new();

        let record_values = records
            .iter()
            .map(|record| {
                let mut own: Vec<u32> = keys
                    .iter()
                    .flat_map(|&key| record.values(key))
                    .map(normalize)
                    .filter(|v| !v.is_empty())
                    .map(|v| {
                        *positions.entry(v).or_insert_with_key(|v| {
                            values.push(v.clone());
                            (values.len() - 1) as u32
                        })
                    })
                    .collect();
                own.sort_unstable();
                own.dedup();
                own
            })
            .collect();

        Self {
            records,
            keys,
            values,
            record_values,
            config,
        }
    }

    /// Search for `query`, best match first.
    ///
    /// A record's score is the best score of any of its values. Equal
    /// scores keep dataset order.
    pub fn search(&self, query: &str) -> Vec<Match> {
        let pattern = normalize(query.trim());
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut scratch = Scratch::default();
        let value_scores: Vec<Option<f64>> = self
            .values
            .iter()
            .map(|value| score(&pattern, value, &self.config, &mut scratch))
            .collect();

        let mut scored: Vec<(usize, f64)> = self
            .record_values
            .iter()
            .enumerate()
            .filter_map(|(index, own)| {
                own.iter()
                    .filter_map(|&v| value_scores[v as usize])
                    .min_by(f64::total_cmp)
                    .map(|best| (index, best))
            })
            .collect();

        if self.config.should_sort {
            // Stable, so ties stay in dataset order.
            scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        }

        let keep_score = self.config.include_score;
        scored
            .into_iter()
            .map(|(index, s)| Match {
                index,
                score: keep_score.then_some(s),
            })
            .collect()
    }

    /// Number of distinct values the matcher scores per search.
    pub fn distinct_values(&self) -> usize {
        self.values.len()
    }

    /// The record a match refers to.
    pub fn record(&self, m: &Match) -> &T {
        &self.records[m.index]
    }

    /// The records this index was built from.
    pub fn records(&self) -> &Arc<[T]> {
        &self.records
    }

    /// The keys this index matches on.
    pub fn keys(&self) -> &'static [T::Key] {
        self.keys
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
