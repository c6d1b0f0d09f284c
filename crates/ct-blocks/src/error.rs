//! Error types for block construction and model files.

use ct_graph::GraphError;
use thiserror::Error;

pub type BlockResult<T> = Result<T, BlockError>;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Block {block}: parameter {param} = {value} is not finite")]
    NonFiniteParam {
        block: String,
        param: &'static str,
        value: f64,
    },

    #[error("Unknown block name in connection: {name}")]
    UnknownBlock { name: String },

    #[error("Duplicate block name: {name}")]
    DuplicateBlock { name: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
