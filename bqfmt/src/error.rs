use bqfmt_lang::utils::error::ReportableError;
use bqfmt_lang::utils::metadata::Location;
use thiserror::Error;

/// Errors raised while printing a tree. Apart from [`FormatError::UnsupportedNodeType`]
/// they only occur for trees that do not come from `bqfmt_lang::parse`, e.g. hand-written
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unsupported node type `{0}`")]
    UnsupportedNodeType(String),
    #[error("{node_type} node has no token")]
    MissingToken { node_type: String },
    #[error("{node_type} node has no `{slot}` child")]
    MissingChild { node_type: String, slot: String },
    #[error("invalid syntax tree: {0}")]
    InvalidTree(String),
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidTree(err.to_string())
    }
}

impl ReportableError for FormatError {
    fn get_labels(&self) -> Vec<(Location, String)> {
        vec![]
    }
}
