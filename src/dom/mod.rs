//! In-process document model for the editable region.
//!
//! The page document is an arena of element and text nodes addressed by
//! [`NodeId`]. Boundary offsets follow the DOM convention: a child index for
//! element containers and a character offset for text containers (counted in
//! `char`s rather than UTF-16 code units).
//!
//! # Architecture
//!
//! - [`Dom`]: node arena with tree mutation helpers
//! - [`Range`] / [`Boundary`]: start/end boundary pairs and the range
//!   algorithms the editor needs (`delete_contents`, `insert_node`, ...)
//! - `html`: fragment parser and serializer used by `inner_html`,
//!   `set_inner_html` and `parse_fragment`

mod html;
mod node;
mod range;

pub use html::{escape_text, unescape};
pub use node::{Dom, NodeId, NodeKind};
pub use range::{Boundary, Range};

/// Errors raised by tree mutations.
///
/// These never cross the editor's public command API; callers that mutate
/// through the editor swallow them and log at debug level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("node {0:?} cannot have children")]
    NotContainer(NodeId),
    #[error("inserting {child:?} into {parent:?} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("offset {offset} is out of bounds for node {node:?}")]
    IndexSize { node: NodeId, offset: usize },
}
