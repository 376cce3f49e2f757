//! Typed errors for the content store and the query layer

use thiserror::Error;

/// Outcome of a lookup or pagination request that produced nothing to show.
///
/// Both variants are ordinary results for the caller to turn into a
/// "not found" response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no matching content")]
    NotFound,
    #[error("page {page} is out of range ({total_pages} pages)")]
    InvalidPage { page: usize, total_pages: usize },
}

/// Reasons the content store refuses to build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("duplicate {field} {value:?} in {collection}")]
    Duplicate {
        collection: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("invalid slug {slug:?} in {collection}")]
    InvalidSlug {
        collection: &'static str,
        slug: String,
    },
    #[error("slug {slug:?} is reserved in {collection}")]
    ReservedSlug {
        collection: &'static str,
        slug: String,
    },
}
