//! Errors
//!
//! Custom error types used throughout the `cartprune` crate.
use thiserror::Error;

/// Errors that can occur while growing, pruning, or evaluating a tree.
#[derive(Debug, Error)]
pub enum CartError {
    /// The pruning path has no candidate subtrees.
    #[error("The pruning path contains no candidate subtrees; the tree must be grown before selection.")]
    EmptyPath,
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Evaluation data does not line up with the schema the tree was trained on.
    #[error("Data does not match the training schema, expected {0} but {1} provided.")]
    SchemaMismatch(String, String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
