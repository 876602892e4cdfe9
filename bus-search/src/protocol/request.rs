//! Requests from the host.

use serde::{Deserialize, Serialize};

use crate::engine::PageRequest;

use super::error::RequestError;

/// Arguments of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs<Sel> {
    /// Query text; may be empty
    #[serde(alias = "input")]
    pub query: String,

    /// 1-based page number
    pub page: u32,

    /// Results per page
    #[serde(alias = "limit")]
    pub page_size: u32,

    /// Field selection override
    #[serde(alias = "searchBy", skip_serializing_if = "Option::is_none")]
    pub field_selection: Option<Sel>,
}

/// Arguments of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupArgs {
    pub id: String,
}

/// Arguments of a reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionArgs<Sel> {
    #[serde(alias = "input")]
    pub query: String,

    pub page: u32,

    #[serde(alias = "limit")]
    pub page_size: u32,

    /// The new field selection
    #[serde(alias = "searchBy")]
    pub field_selection: Sel,
}

/// A request envelope as sent across the boundary, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request<Sel> {
    Search(SearchArgs<Sel>),
    #[serde(alias = "GET_ROUTE")]
    GetById(LookupArgs),
    SetOption(OptionArgs<Sel>),
}

/// A validated request, ready to run against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<Sel> {
    Search {
        query: String,
        page: PageRequest,
        selection: Option<Sel>,
    },
    GetById {
        id: String,
    },
    SetOption {
        selection: Sel,
        query: String,
        page: PageRequest,
    },
}

impl<Sel> Request<Sel> {
    /// Check field-level constraints. `max_page_size` caps `pageSize` when
    /// set.
    pub fn validate(self, max_page_size: Option<u32>) -> Result<Command<Sel>, RequestError> {
        match self {
            Request::Search(args) => Ok(Command::Search {
                page: page_request(args.page, args.page_size, max_page_size)?,
                query: args.query,
                selection: args.field_selection,
            }),
            Request::GetById(args) => {
                if args.id.is_empty() {
                    return Err(RequestError::EmptyId);
                }
                Ok(Command::GetById { id: args.id })
            }
            Request::SetOption(args) => Ok(Command::SetOption {
                page: page_request(args.page, args.page_size, max_page_size)?,
                selection: args.field_selection,
                query: args.query,
            }),
        }
    }
}

fn page_request(page: u32, page_size: u32, max: Option<u32>) -> Result<PageRequest, RequestError> {
    if let Some(max) = max.filter(|&max| page_size > max) {
        return Err(RequestError::PageSizeTooLarge {
            size: page_size,
            max,
        });
    }
    Ok(PageRequest::new(page, page_size)?)
}
