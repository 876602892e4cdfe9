//! The query engine: one fuzzy index, one active generation, and a
//! single-slot cache of the most recent query.

use std::sync::Arc;

use tracing::debug;

use crate::index::{FuzzyIndex, Match, MatchConfig, Searchable};
use crate::loader::Provenance;

use super::page::{Page, PageRequest};

/// The most recent query and its full ranked match list.
#[derive(Debug)]
struct LastQuery {
    text: String,
    matches: Vec<Match>,
}

/// Counters for work the engine has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Times the fuzzy matcher actually ran
    pub matcher_runs: u64,
    /// Times the index was rebuilt after construction
    pub rebuilds: u64,
}

/// Search, pagination and lookup over one dataset generation.
///
/// The engine is always constructed with a built index, so there is no
/// "not ready" state to search against. Every rebuild clears the
/// last-query cache.
pub struct QueryEngine<T: Searchable> {
    index: FuzzyIndex<T>,
    selection: T::Selection,
    provenance: Provenance,
    last: Option<LastQuery>,
    stats: EngineStats,
}

impl<T: Searchable> QueryEngine<T> {
    /// Build an engine over `records`.
    pub fn new(
        records: impl Into<Arc<[T]>>,
        provenance: Provenance,
        selection: T::Selection,
        config: MatchConfig,
    ) -> Self {
        let index = FuzzyIndex::build(records.into(), T::keys(selection), config);
        debug!(records = index.len(), ?selection, "index built");

        Self {
            index,
            selection,
            provenance,
            last: None,
            stats: EngineStats::default(),
        }
    }

    /// Search and return one page of results.
    ///
    /// A `selection` different from the current one rebuilds the index and
    /// forces a fresh match even if `query` is unchanged. Otherwise a query
    /// equal to the previous one is served from the cached match list.
    /// An empty query returns [`Page::empty`] without matching or touching
    /// the cache.
    pub fn search(
        &mut self,
        query: &str,
        page: PageRequest,
        selection: Option<T::Selection>,
    ) -> Page<T::Summary> {
        let force = match selection {
            Some(selection) if selection != self.selection => {
                self.rebuild(selection);
                true
            }
            _ => false,
        };

        self.page_for(query, page, force)
    }

    /// Switch the field selection, rebuild, and re-run `query`.
    ///
    /// The rebuild happens even if the selection is unchanged.
    pub fn reconfigure(
        &mut self,
        selection: T::Selection,
        query: &str,
        page: PageRequest,
    ) -> Page<T::Summary> {
        self.rebuild(selection);
        self.page_for(query, page, true)
    }

    /// Replace the active generation.
    ///
    /// The new index is fully built before it replaces the old one.
    pub fn adopt(&mut self, records: impl Into<Arc<[T]>>, provenance: Provenance) {
        let index = FuzzyIndex::build(
            records.into(),
            T::keys(self.selection),
            self.index.config().clone(),
        );
        debug!(records = index.len(), ?provenance, "adopted new generation");

        self.index = index;
        self.provenance = provenance;
        self.last = None;
        self.stats.rebuilds += 1;
    }

    /// Find a record by id among the most recent matches.
    ///
    /// Only records in the current match list are visible; anything else,
    /// including ids that exist in the dataset, is `None`.
    pub fn get_by_id(&self, id: &str) -> Option<&T> {
        self.last
            .as_ref()?
            .matches
            .iter()
            .map(|m| self.index.record(m))
            .find(|record| record.id() == id)
    }

    /// Current field selection.
    pub fn selection(&self) -> T::Selection {
        self.selection
    }

    /// Where the active generation came from.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Text of the cached query, if any.
    pub fn last_query(&self) -> Option<&str> {
        self.last.as_ref().map(|l| l.text.as_str())
    }

    /// Number of records in the active generation.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    fn rebuild(&mut self, selection: T::Selection) {
        let index = FuzzyIndex::build(
            Arc::clone(self.index.records()),
            T::keys(selection),
            self.index.config().clone(),
        );
        debug!(?selection, "index rebuilt");

        self.index = index;
        self.selection = selection;
        self.last = None;
        self.stats.rebuilds += 1;
    }

    fn page_for(&mut self, query: &str, page: PageRequest, force: bool) -> Page<T::Summary> {
        if query.trim().is_empty() {
            return Page::empty();
        }

        let cached = !force && self.last.as_ref().is_some_and(|l| l.text == query);
        if !cached {
            let matches = self.index.search(query);
            self.stats.matcher_runs += 1;
            debug!(query, matches = matches.len(), "matched");
            self.last = Some(LastQuery {
                text: query.to_string(),
                matches,
            });
        }

        let matches = self.last.as_ref().map_or(&[][..], |l| l.matches.as_slice());
        let total = matches.len();

        Page {
            current_page: page.page(),
            total_pages: page.total_pages(total),
            total_results: total,
            results: matches[page.range(total)]
                .iter()
                .map(|m| self.index.record(m).summary())
                .collect(),
        }
    }
}
