//! Boundary points and ranges.

use std::cmp::Ordering;

use super::node::{Dom, NodeId};
use super::DomError;

/// A boundary point: a container node plus an offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A start/end boundary pair, always kept in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub const fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// A caret at `at`.
    pub const fn collapsed_at(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    /// Check if start and end are the same boundary point
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Collapse onto the start (`to_start`) or the end boundary.
    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end = self.start;
        } else {
            self.start = self.end;
        }
    }

    /// Range around `node` inside its parent.
    pub fn select_node(dom: &Dom, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        let index = dom.index_of(node)?;
        Some(Self::new(
            Boundary::new(parent, index),
            Boundary::new(parent, index + 1),
        ))
    }

    /// Range spanning the contents of `node`.
    pub fn select_node_contents(dom: &Dom, node: NodeId) -> Self {
        Self::new(
            Boundary::new(node, 0),
            Boundary::new(node, dom.node_len(node)),
        )
    }
}

impl Dom {
    fn boundary_key(&self, at: Boundary) -> Vec<usize> {
        let mut key = self.path(at.node);
        key.push(at.offset);
        key
    }

    /// Document-order comparison of two boundary points in the same tree.
    pub fn compare_boundaries(&self, a: Boundary, b: Boundary) -> Ordering {
        self.boundary_key(a).cmp(&self.boundary_key(b))
    }

    /// Deepest node containing both boundary containers.
    pub fn common_ancestor(&self, range: &Range) -> NodeId {
        let starts: Vec<NodeId> = std::iter::once(range.start.node)
            .chain(self.ancestors(range.start.node))
            .collect();
        std::iter::once(range.end.node)
            .chain(self.ancestors(range.end.node))
            .find(|node| starts.contains(node))
            .unwrap_or(range.start.node)
    }

    /// Whether `node` lies entirely between `start` and `end`.
    fn is_contained(&self, node: NodeId, start: Boundary, end: Boundary) -> bool {
        let (Some(parent), Some(index)) = (self.parent(node), self.index_of(node)) else {
            return false;
        };
        self.compare_boundaries(Boundary::new(parent, index), start) != Ordering::Less
            && self.compare_boundaries(Boundary::new(parent, index + 1), end) != Ordering::Greater
    }

    /// Outermost nodes fully inside the range, in document order.
    fn contained_nodes(&self, range: &Range) -> Vec<NodeId> {
        let ancestor = self.common_ancestor(range);
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(ancestor).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_contained(node, range.start, range.end) {
                out.push(node);
            } else {
                stack.extend(self.children(node).iter().rev().copied());
            }
        }
        out
    }

    /// Text nodes whose characters the range covers, in document order.
    ///
    /// Text boundaries are split first, so each returned node lies wholly
    /// inside the range.
    pub fn split_text_nodes_in_range(&mut self, range: &Range) -> Result<Vec<NodeId>, DomError> {
        let range = self.split_boundaries(range)?;
        let mut out = Vec::new();
        for node in self.contained_nodes(&range) {
            if self.is_text(node) {
                out.push(node);
            } else {
                out.extend(
                    self.descendants(node)
                        .into_iter()
                        .filter(|&child| self.is_text(child)),
                );
            }
        }
        out.retain(|&node| self.node_len(node) > 0);
        Ok(out)
    }

    /// Move text boundaries onto element boundaries, splitting text nodes
    /// where a boundary falls inside them.
    fn split_boundaries(&mut self, range: &Range) -> Result<Range, DomError> {
        let mut start = range.start;
        let mut end = range.end;

        if self.is_text(end.node) {
            end = self.split_at_boundary(end)?;
        }
        if self.is_text(start.node) {
            let parent = self.parent(start.node);
            let index = self.index_of(start.node);
            let len = self.node_len(start.node);
            start = self.split_at_boundary(start)?;
            let split = start.offset > 0 && start.offset < len;
            if let (true, Some(parent), Some(index)) = (split, parent, index) {
                if end.node == parent && end.offset > index {
                    end.offset += 1;
                }
            }
        }
        Ok(Range::new(start, end))
    }

    fn split_at_boundary(&mut self, at: Boundary) -> Result<Boundary, DomError> {
        let parent = self.parent(at.node).ok_or(DomError::Detached(at.node))?;
        let index = self.index_of(at.node).unwrap_or(0);
        let len = self.node_len(at.node);
        if at.offset == 0 {
            return Ok(Boundary::new(parent, index));
        }
        if at.offset < len {
            self.split_text(at.node, at.offset)?;
        }
        Ok(Boundary::new(parent, index + 1))
    }

    /// Text covered by the range.
    pub fn range_to_string(&self, range: &Range) -> String {
        if range.start.node == range.end.node {
            if let Some(text) = self.text(range.start.node) {
                return text
                    .chars()
                    .skip(range.start.offset)
                    .take(range.end.offset.saturating_sub(range.start.offset))
                    .collect();
            }
        }

        let ancestor = self.common_ancestor(range);
        let mut out = String::new();
        for node in self.descendants(ancestor) {
            let Some(text) = self.text(node) else {
                continue;
            };
            let len = text.chars().count();
            let from = if node == range.start.node {
                range.start.offset
            } else if self.compare_boundaries(Boundary::new(node, 0), range.start)
                != Ordering::Less
            {
                0
            } else {
                continue;
            };
            let to = if node == range.end.node {
                range.end.offset
            } else if self.compare_boundaries(Boundary::new(node, len), range.end)
                != Ordering::Greater
            {
                len
            } else {
                continue;
            };
            out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
        }
        out
    }

    /// Remove everything inside the range and collapse it onto its start.
    ///
    /// Partially selected ancestors are kept; only fully covered nodes and
    /// covered text are removed.
    pub fn delete_contents(&mut self, range: &mut Range) -> Result<(), DomError> {
        if range.is_collapsed() {
            return Ok(());
        }
        if range.start.node == range.end.node && self.is_text(range.start.node) {
            self.delete_text(range.start.node, range.start.offset, range.end.offset)?;
            range.collapse(true);
            return Ok(());
        }

        self.extract_contents(range)?;
        Ok(())
    }

    /// Detach the outermost nodes covered by the range and return them in
    /// document order. Text boundaries are split first; partially covered
    /// elements stay where they are. The range collapses onto its start.
    pub fn extract_contents(&mut self, range: &mut Range) -> Result<Vec<NodeId>, DomError> {
        if range.is_collapsed() {
            return Ok(Vec::new());
        }
        let split = self.split_boundaries(range)?;
        let nodes = self.contained_nodes(&split);
        for &node in &nodes {
            self.detach(node);
        }
        *range = Range::collapsed_at(split.start);
        Ok(nodes)
    }

    /// Insert `node` at the range start.
    ///
    /// A collapsed range ends up selecting the inserted node.
    pub fn insert_node(&mut self, range: &mut Range, node: NodeId) -> Result<(), DomError> {
        let start = range.start;
        let (parent, index) = if self.is_text(start.node) {
            let parent = self.parent(start.node).ok_or(DomError::Detached(start.node))?;
            let index = self.index_of(start.node).unwrap_or(0);
            let len = self.node_len(start.node);
            if start.offset == 0 {
                (parent, index)
            } else if start.offset >= len {
                (parent, index + 1)
            } else {
                let tail = self.split_text(start.node, start.offset)?;
                if range.end.node == start.node && range.end.offset > start.offset {
                    range.end = Boundary::new(tail, range.end.offset - start.offset);
                } else if range.end.node == parent && range.end.offset > index {
                    range.end.offset += 1;
                }
                (parent, index + 1)
            }
        } else {
            (start.node, start.offset)
        };

        let was_collapsed = range.is_collapsed();
        self.insert_child(parent, index, node)?;
        if was_collapsed {
            *range = Range::new(Boundary::new(parent, index), Boundary::new(parent, index + 1));
        } else {
            range.start = Boundary::new(parent, index);
            if range.end.node == parent && range.end.offset >= index {
                range.end.offset += 1;
            }
        }
        Ok(())
    }

    /// Insert several sibling nodes at the range start, in order.
    ///
    /// Afterwards the range spans all of them.
    pub fn insert_nodes(&mut self, range: &mut Range, nodes: &[NodeId]) -> Result<(), DomError> {
        let Some((&first, rest)) = nodes.split_first() else {
            return Ok(());
        };
        range.collapse(true);
        self.insert_node(range, first)?;
        let start = range.start;
        let mut last = first;
        for &node in rest {
            self.insert_after(last, node)?;
            last = node;
        }
        let parent = self.parent(last).ok_or(DomError::Detached(last))?;
        let index = self.index_of(last).unwrap_or(0);
        *range = Range::new(start, Boundary::new(parent, index + 1));
        Ok(())
    }
}
