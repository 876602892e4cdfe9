//! Per-worker request handling.
//!
//! Decodes one raw request, validates it, runs it against the engine, and
//! produces exactly one reply. Requests that fail to decode or validate
//! leave the engine and the remembered response untouched.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{Page, QueryEngine};
use crate::index::Searchable;
use crate::loader::Provenance;

use super::error::RequestError;
use super::request::{Command, Request};
use super::response::{ErrorResponse, RecordResponse, SearchResponse, WorkerMessage};

/// Reply type for records of type `T`.
pub type Reply<T> = WorkerMessage<<T as Searchable>::Summary, T>;

/// Owns a query engine and the last search response sent.
pub struct Handler<T: Searchable> {
    engine: QueryEngine<T>,
    last_response: Option<SearchResponse<T::Summary>>,
    max_page_size: Option<u32>,
}

impl<T> Handler<T>
where
    T: Searchable + Clone + Serialize,
{
    pub fn new(engine: QueryEngine<T>, max_page_size: Option<u32>) -> Self {
        Self {
            engine,
            last_response: None,
            max_page_size,
        }
    }

    /// Handle one raw JSON request.
    pub fn handle(&mut self, raw: &str) -> Reply<T> {
        match self.decode(raw) {
            Ok(command) => self.dispatch(command),
            Err(err) => {
                warn!(error = %err, "rejected request");
                WorkerMessage::Error(ErrorResponse::from(&err))
            }
        }
    }

    /// Run an already validated command.
    pub fn dispatch(&mut self, command: Command<T::Selection>) -> Reply<T> {
        match command {
            Command::Search {
                query,
                page,
                selection,
            } => {
                let page = self.engine.search(&query, page, selection);
                WorkerMessage::Search(self.respond(&query, page))
            }
            Command::SetOption {
                selection,
                query,
                page,
            } => {
                debug!(?selection, "field selection changed");
                let page = self.engine.reconfigure(selection, &query, page);
                WorkerMessage::Search(self.respond(&query, page))
            }
            Command::GetById { id } => {
                let matched_record = self.engine.get_by_id(&id).cloned();
                let search = self
                    .last_response
                    .clone()
                    .unwrap_or_else(|| SearchResponse::empty(self.engine.provenance()));
                WorkerMessage::Record(RecordResponse {
                    search,
                    matched_record,
                })
            }
        }
    }

    /// Swap in a new generation. The remembered response refers to the old
    /// one, so it is dropped along with the engine's query cache.
    pub fn adopt(&mut self, records: impl Into<Arc<[T]>>, provenance: Provenance) {
        self.engine.adopt(records, provenance);
        self.last_response = None;
    }

    pub fn engine(&self) -> &QueryEngine<T> {
        &self.engine
    }

    /// Most recent search response, if any.
    pub fn last_response(&self) -> Option<&SearchResponse<T::Summary>> {
        self.last_response.as_ref()
    }

    fn decode(&self, raw: &str) -> Result<Command<T::Selection>, RequestError> {
        let request: Request<T::Selection> = serde_json::from_str(raw)?;
        request.validate(self.max_page_size)
    }

    /// Build the reply for `page` and remember it for lookups.
    ///
    /// A blank query leaves the engine's match list in place, so the
    /// response that described that list stays remembered too.
    fn respond(&mut self, query: &str, page: Page<T::Summary>) -> SearchResponse<T::Summary> {
        let response = SearchResponse {
            page,
            availability: self.engine.provenance(),
        };
        let list_kept = query.trim().is_empty() && self.engine.last_query().is_some();
        if !list_kept {
            self.last_response = Some(response.clone());
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Route, StopRecord};
    use crate::index::MatchConfig;
    use crate::protocol::ErrorKind;

    fn routes() -> Vec<Route> {
        vec![
            Route::new("A", "Majestic Express").with_stops(["X", "Y"]),
            Route::new("B", "Majestic Local"),
            Route::new("C", "Airport Link").with_stops(["Hebbal"]),
        ]
    }

    fn handler(provenance: Provenance) -> Handler<Route> {
        let engine = QueryEngine::new(
            routes(),
            provenance,
            Default::default(),
            MatchConfig::default(),
        );
        Handler::new(engine, Some(100))
    }

    fn search(query: &str, page: u32, page_size: u32) -> String {
        serde_json::json!({"op": "SEARCH", "query": query, "page": page, "pageSize": page_size})
            .to_string()
    }

    #[test]
    fn search_reports_availability() {
        let mut handler = handler(Provenance::Cached);
        let reply = handler.handle(&search("majestic", 1, 10));

        let WorkerMessage::Search(response) = reply else {
            panic!("expected search reply, got {reply:?}");
        };
        assert_eq!(response.availability, Provenance::Cached);
        assert_eq!(response.page.total_results, 2);
        assert_eq!(handler.last_response(), Some(&response));
    }

    #[test]
    fn lookup_extends_previous_response() {
        let mut handler = handler(Provenance::Fresh);
        let WorkerMessage::Search(previous) = handler.handle(&search("majestic", 1, 1)) else {
            panic!("expected search reply");
        };

        let reply = handler.handle(r#"{"op":"GET_BY_ID","id":"B"}"#);
        let WorkerMessage::Record(record) = reply else {
            panic!("expected record reply, got {reply:?}");
        };
        assert_eq!(record.search, previous);
        assert_eq!(record.matched_record.map(|r| r.id), Some("B".to_string()));
    }

    #[test]
    fn lookup_outside_matches_is_null() {
        let mut handler = handler(Provenance::Fresh);
        handler.handle(&search("majestic", 1, 10));

        let reply = handler.handle(r#"{"op":"GET_BY_ID","id":"C"}"#);
        let WorkerMessage::Record(record) = reply else {
            panic!("expected record reply");
        };
        assert_eq!(record.matched_record, None);
    }

    #[test]
    fn lookup_before_any_search() {
        let mut handler = handler(Provenance::Fresh);
        let reply = handler.handle(r#"{"op":"GET_BY_ID","id":"A"}"#);
        let WorkerMessage::Record(record) = reply else {
            panic!("expected record reply");
        };
        assert_eq!(record.matched_record, None);
        assert_eq!(record.search.page.total_results, 0);
        assert_eq!(record.search.page.current_page, 1);
    }

    #[test]
    fn rejected_request_changes_nothing() {
        let mut handler = handler(Provenance::Fresh);
        handler.handle(&search("majestic", 1, 10));
        let before = handler.last_response().cloned();
        let runs = handler.engine().stats().matcher_runs;

        for raw in [
            "{not json",
            r#"{"op":"SEARCH","query":"airport","page":0,"pageSize":10}"#,
            r#"{"op":"SEARCH","query":"airport","page":1,"pageSize":1000}"#,
            r#"{"op":"SET_OPTION","query":"airport","page":1,"pageSize":10,"fieldSelection":"nope"}"#,
            r#"{"op":"GET_BY_ID","id":""}"#,
        ] {
            let reply = handler.handle(raw);
            assert!(
                matches!(reply, WorkerMessage::Error(_)),
                "{raw} should be rejected, got {reply:?}"
            );
        }

        assert_eq!(handler.last_response().cloned(), before);
        assert_eq!(handler.engine().stats().matcher_runs, runs);
        assert_eq!(handler.engine().last_query(), Some("majestic"));
    }

    #[test]
    fn error_kinds() {
        let mut handler = handler(Provenance::Fresh);

        let WorkerMessage::Error(err) = handler.handle("[]") else {
            panic!("expected error");
        };
        assert_eq!(err.kind, ErrorKind::Malformed);

        let WorkerMessage::Error(err) =
            handler.handle(r#"{"op":"SEARCH","query":"x","page":1,"pageSize":0}"#)
        else {
            panic!("expected error");
        };
        assert_eq!(err.kind, ErrorKind::Invalid);
    }

    #[test]
    fn set_option_switches_fields() {
        let mut handler = handler(Provenance::Fresh);
        let reply = handler.handle(
            r#"{"op":"SET_OPTION","query":"hebbal","page":1,"pageSize":10,"fieldSelection":"route_name"}"#,
        );
        let WorkerMessage::Search(response) = reply else {
            panic!("expected search reply");
        };
        assert_eq!(response.page.total_results, 0);

        let reply = handler.handle(
            r#"{"op":"SET_OPTION","query":"hebbal","page":1,"pageSize":10,"fieldSelection":"route_stops"}"#,
        );
        let WorkerMessage::Search(response) = reply else {
            panic!("expected search reply");
        };
        assert_eq!(response.page.results[0].id, "C");
        assert_eq!(handler.engine().selection(), crate::index::RouteSelection::RouteStops);
    }

    #[test]
    fn adopt_forgets_last_response() {
        let mut handler = handler(Provenance::Cached);
        handler.handle(&search("majestic", 1, 10));

        handler.adopt(vec![Route::new("Z", "Majestic Night")], Provenance::Fresh);
        assert!(handler.last_response().is_none());

        let WorkerMessage::Search(response) = handler.handle(&search("majestic", 1, 10)) else {
            panic!("expected search reply");
        };
        assert_eq!(response.availability, Provenance::Fresh);
        assert_eq!(response.page.results[0].id, "Z");
    }

    #[test]
    fn stop_lookup_returns_routes() {
        let stops = vec![StopRecord {
            name: "Hebbal".into(),
            routes: vec!["500D".into(), "KIA-9".into()],
        }];
        let engine = QueryEngine::new(
            stops,
            Provenance::Fresh,
            Default::default(),
            MatchConfig::default(),
        );
        let mut handler = Handler::new(engine, Some(100));

        handler.handle(&search("hebbal", 1, 10));
        let WorkerMessage::Record(record) = handler.handle(r#"{"op":"GET_BY_ID","id":"Hebbal"}"#)
        else {
            panic!("expected record reply");
        };
        let matched = record.matched_record.unwrap();
        assert_eq!(matched.routes, ["500D", "KIA-9"]);
        assert_eq!(record.search.page.results, ["Hebbal"]);
    }

    #[test]
    fn blank_search_keeps_lookup_consistent() {
        let mut handler = handler(Provenance::Fresh);
        let WorkerMessage::Search(previous) = handler.handle(&search("majestic", 1, 10)) else {
            panic!("expected search reply");
        };

        let WorkerMessage::Search(blank) = handler.handle(&search("  ", 1, 10)) else {
            panic!("expected search reply");
        };
        assert_eq!(blank.page.total_results, 0);

        let WorkerMessage::Record(record) = handler.handle(r#"{"op":"GET_BY_ID","id":"A"}"#)
        else {
            panic!("expected record reply");
        };
        assert_eq!(record.search, previous);
        assert_eq!(record.matched_record.map(|r| r.id), Some("A".to_string()));
    }

    #[test]
    fn large_pages_accepted_without_cap() {
        let engine = QueryEngine::new(
            routes(),
            Provenance::Fresh,
            Default::default(),
            MatchConfig::default(),
        );
        let mut handler = Handler::new(engine, None);

        let WorkerMessage::Search(response) = handler.handle(&search("majestic", 1, 500)) else {
            panic!("expected search reply");
        };
        assert_eq!(response.page.total_results, 2);
        assert_eq!(response.page.total_pages, 1);
    }
}
