//! Pagination engine
//!
//! Orchestrates the filter, group-by and sort translators and the cursor
//! codec into one search request per page, and turns the engine's hits back
//! into a cursor-paginated [`Connection`].
//!
//! Ordering is made total by appending the document type's identifier field
//! as an ascending tie-break, so a cursor taken from any hit resumes exactly
//! after it. One extra hit is requested to learn whether a next page exists.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::engine::{SearchRequest, SearchResponse};
use crate::query::{to_aggregations, to_query, to_sort, SortClause, SortOrder, SortSpec};
use crate::schema::ProtoSchema;

use super::connection::{decode_aggregations, Connection, Edge, PageInfo};
use super::cursor::Cursor;
use super::errors::{PaginationError, PaginationResult};

/// Client arguments of one page request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub filter: Value,
    #[serde(default)]
    pub sort: Option<Vec<SortSpec>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub first: Option<usize>,
    #[serde(default)]
    pub group_by: Value,
}

impl PageRequest {
    /// Parse raw page request arguments
    pub fn parse(input: &Value) -> PaginationResult<Self> {
        serde_json::from_value(input.clone()).map_err(|e| PaginationError::InvalidRequest(e.to_string()))
    }

    pub fn sort_specs(&self) -> &[SortSpec] {
        self.sort.as_deref().unwrap_or_default()
    }
}

/// A planned search and what is needed to read its response back
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub request: SearchRequest,
    /// Hits returned to the caller; the request asks for one more
    pub page_size: usize,
    /// Whether the page resumes after a cursor
    pub resumed: bool,
}

/// Builds page requests and decodes page responses for one proto schema
#[derive(Debug, Clone, Copy)]
pub struct PaginationEngine<'a> {
    schema: &'a ProtoSchema,
    default_page_size: usize,
    max_page_size: usize,
}

impl<'a> PaginationEngine<'a> {
    pub fn new(schema: &'a ProtoSchema, default_page_size: usize, max_page_size: usize) -> Self {
        Self {
            schema,
            default_page_size,
            max_page_size,
        }
    }

    /// Effective page size for a requested `first`
    pub fn page_size(&self, first: Option<usize>) -> PaginationResult<usize> {
        match first {
            None => Ok(self.default_page_size),
            Some(requested) if requested > self.max_page_size => Err(PaginationError::PageSizeExceeded {
                requested,
                maximum: self.max_page_size,
            }),
            Some(requested) => Ok(requested),
        }
    }

    /// Sort clauses for a page: the caller's sort, relevance when there is
    /// none, then the identifier tie-break unless already present.
    pub fn sort_clauses(&self, document_type: &str, specs: &[SortSpec]) -> PaginationResult<Vec<SortClause>> {
        let id_field = self.schema.id_field(document_type)?;

        let mut clauses = specs.iter().map(to_sort).collect::<Result<Vec<_>, _>>()?;
        if clauses.is_empty() {
            clauses.push(SortClause::Score { order: SortOrder::Desc });
        }
        if !clauses.iter().any(|clause| clause.sorts_by_field(&id_field)) {
            clauses.push(SortClause::field(id_field, SortOrder::Asc));
        }
        Ok(clauses)
    }

    /// Plan the search for one page
    pub fn plan(&self, document_type: &str, index: &str, page: &PageRequest) -> PaginationResult<SearchPlan> {
        let page_size = self.page_size(page.first)?;
        let sort = self.sort_clauses(document_type, page.sort_specs())?;

        let search_after = match &page.after {
            Some(after) => Some(Cursor::decode_for(after, sort.len())?.into_keys()),
            None => None,
        };

        let mut request = SearchRequest::new(index);
        request.query = to_query(&page.filter)?;
        request.sort = sort;
        request.search_after = search_after;
        request.size = page_size + 1;
        request.aggregations = to_aggregations(&page.group_by)?;

        debug!(
            index,
            size = page_size,
            sort_clauses = request.sort.len(),
            aggregations = request.aggregations.len(),
            resumed = request.search_after.is_some(),
            "Search planned"
        );

        Ok(SearchPlan {
            resumed: request.search_after.is_some(),
            request,
            page_size,
        })
    }

    /// Plan an aggregation-only search. No hits are requested.
    pub fn plan_aggregation(&self, index: &str, filter: &Value, group_by: &Value) -> PaginationResult<SearchRequest> {
        let mut request = SearchRequest::new(index);
        request.query = to_query(filter)?;
        request.aggregations = to_aggregations(group_by)?;
        request.size = 0;

        debug!(
            index,
            aggregations = request.aggregations.len(),
            "Aggregation planned"
        );
        Ok(request)
    }

    /// Assemble the page from the engine's response to a plan
    pub fn page(&self, plan: &SearchPlan, response: SearchResponse) -> PaginationResult<Connection> {
        let has_next_page = response.hits.len() > plan.page_size;

        let edges: Vec<Edge> = response
            .hits
            .into_iter()
            .take(plan.page_size)
            .map(|hit| Edge {
                cursor: Cursor::new(hit.sort).encode(),
                node: hit.source,
            })
            .collect();

        let page_info = PageInfo {
            has_previous_page: plan.resumed && !edges.is_empty(),
            has_next_page,
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Ok(Connection {
            edges,
            page_info,
            group_by: decode_aggregations(&response.aggregations)?,
        })
    }
}
