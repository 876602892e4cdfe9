//! Messages sent back to the host.

use serde::{Deserialize, Serialize};

use crate::engine::Page;
use crate::loader::Provenance;

use super::error::{ErrorKind, RequestError};

/// A page of results plus where the data came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<S> {
    #[serde(flatten)]
    pub page: Page<S>,

    /// Whether results come from fresh, cached or unavailable data
    pub availability: Provenance,
}

impl<S> SearchResponse<S> {
    /// The response sent before any search has happened.
    pub fn empty(availability: Provenance) -> Self {
        Self {
            page: Page::empty(),
            availability,
        }
    }
}

/// The previous search response extended with a looked-up record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse<S, R> {
    #[serde(flatten)]
    pub search: SearchResponse<S>,

    /// The matching record, or `null`
    pub matched_record: Option<R>,
}

/// A rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Every message a worker emits, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage<S, R> {
    /// Sent once, after the first index is built
    Ready,
    Search(SearchResponse<S>),
    Record(RecordResponse<S, R>),
    Error(ErrorResponse),
}

impl<S, R> WorkerMessage<S, R> {
    /// The search payload, for `search` and `record` messages.
    pub fn as_search(&self) -> Option<&SearchResponse<S>> {
        match self {
            WorkerMessage::Search(search) => Some(search),
            WorkerMessage::Record(record) => Some(&record.search),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{Route, RouteSummary};

    type Message = WorkerMessage<RouteSummary, Route>;

    fn page() -> Page<RouteSummary> {
        Page {
            current_page: 1,
            total_pages: 1,
            total_results: 1,
            results: vec![Route::new("A", "Majestic Express").summary()],
        }
    }

    #[test]
    fn ready_shape() {
        let json = serde_json::to_value(Message::Ready).unwrap();
        assert_eq!(json, json!({"type": "ready"}));
    }

    #[test]
    fn search_shape() {
        let message = Message::Search(SearchResponse {
            page: page(),
            availability: Provenance::Cached,
        });
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "search",
                "currentPage": 1,
                "totalPages": 1,
                "totalResults": 1,
                "results": [{"id": "A", "route_name": "Majestic Express", "map_link": null}],
                "availability": "cached",
            })
        );
    }

    #[test]
    fn record_shape() {
        let route = Route::new("A", "Majestic Express").with_stops(["X", "Y"]);
        let message = Message::Record(RecordResponse {
            search: SearchResponse {
                page: page(),
                availability: Provenance::Fresh,
            },
            matched_record: Some(route),
        });
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "record");
        assert_eq!(json["totalResults"], 1);
        assert_eq!(json["matchedRecord"]["route_stops"], json!(["X", "Y"]));

        let missing = Message::Record(RecordResponse {
            search: SearchResponse::empty(Provenance::Fresh),
            matched_record: None,
        });
        let json = serde_json::to_value(&missing).unwrap();
        assert!(json["matchedRecord"].is_null());
        assert_eq!(json["totalPages"], 0);
    }

    #[test]
    fn messages_decode_back() {
        let message = Message::Search(SearchResponse {
            page: page(),
            availability: Provenance::Fresh,
        });
        let text = serde_json::to_string(&message).unwrap();
        let decoded: Message = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, message);

        let error: Message =
            serde_json::from_str(r#"{"type":"error","kind":"invalid","message":"bad page"}"#)
                .unwrap();
        assert_eq!(
            error,
            Message::Error(ErrorResponse {
                kind: ErrorKind::Invalid,
                message: "bad page".into(),
            })
        );
    }
}
