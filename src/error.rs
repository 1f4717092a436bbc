use thiserror::Error;

/// A structural invariant of the index does not hold.
///
/// Only [`validate_invariants`](crate::AutocompleteIndex::validate_invariants)
/// produces these. Any of them indicates a bug in the index itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantError {
    #[error("item key {key:?} does not start with node path {path:?}")]
    KeyOutsidePath { path: String, key: String },

    #[error("node {path:?} caches score {cached} but its subtree maximum is {actual}")]
    ScoreMismatch {
        path: String,
        cached: f64,
        actual: f64,
    },

    #[error("node {path:?} child lookup is out of sync with its child order: {detail}")]
    ChildIndexMismatch { path: String, detail: String },

    #[error("node {path:?} is marked sorted but position {position} breaks descending order")]
    UnsortedNode { path: String, position: usize },

    #[error("index reports {cached} items but {actual} are reachable")]
    LengthMismatch { cached: usize, actual: usize },
}

pub type InvariantResult<T = ()> = Result<T, InvariantError>;
