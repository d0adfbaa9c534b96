//! Error types for cellscene.

use std::fmt;
use std::io;

use crate::scene::NodeId;

/// Result type alias for cellscene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cellscene operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from presenting a frame.
    Io(io::Error),
    /// Attaching a node under one of its own descendants.
    Cycle {
        /// The node being attached.
        node: NodeId,
        /// The would-be parent, which is a descendant of `node`.
        parent: NodeId,
    },
    /// Child insertion index past the end of the child list.
    InvalidIndex { index: usize, len: usize },
    /// Node id not present in the tree (destroyed or never created).
    UnknownNode(NodeId),
    /// Layout engine call failure.
    Layout(String),
    /// Buffer dimension error (e.g., zero width/height).
    InvalidDimensions { width: u32, height: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Cycle { node, parent } => {
                write!(f, "attaching node {node} under {parent} would create a cycle")
            }
            Self::InvalidIndex { index, len } => {
                write!(f, "child index {index} out of range for {len} children")
            }
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::Layout(msg) => write!(f, "layout engine error: {msg}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
