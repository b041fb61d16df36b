//! Arena-backed node tree.

use super::DomError;

/// Identifies a node inside one [`Dom`].
///
/// Ids are never reused: a detached node keeps its id (and its subtree) so a
/// stale range pointing into it stays addressable, the same way a live DOM
/// keeps removed nodes alive while something references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        /// Lowercase tag name
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The page document.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<NodeData>,
    body: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a document containing only an empty `<body>`.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            body: NodeId(0),
        };
        dom.body = dom.create_element("body");
        dom
    }

    /// The document body (top of the attached tree).
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Detached copy of a node without its children (`cloneNode(false)`).
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        self.push(kind)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Lowercase tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// DOM-style `nodeName`: uppercase tag or `#text`.
    pub fn node_name(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => tag.to_ascii_uppercase(),
            NodeKind::Text(_) => "#text".to_string(),
        }
    }

    pub fn has_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag(id).is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    /// Data of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) => {
                *text = value.to_string();
                Ok(())
            }
            NodeKind::Element { .. } => Err(DomError::NotText(id)),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => {
                let name = name.to_ascii_lowercase();
                match attrs.iter_mut().find(|(key, _)| *key == name) {
                    Some(entry) => entry.1 = value.to_string(),
                    None => attrs.push((name, value.to_string())),
                }
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotContainer(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Element children only (jQuery-style `children()`).
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Position of `id` among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.children(parent).get(prev).copied())
    }

    /// Boundary length: characters for text, child count for elements.
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Element { .. } => self.children(id).len(),
        }
    }

    /// Inclusive containment: `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// The node itself when it is an element, else its parent.
    pub fn element_of(&self, id: NodeId) -> Option<NodeId> {
        if self.is_element(id) {
            Some(id)
        } else {
            self.parent(id)
        }
    }

    /// Nearest inclusive ancestor satisfying `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Dom, NodeId) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| pred(self, node))
    }

    /// Pre-order descendants, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Insert `child` at `index` of `parent`, detaching it first.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DomError> {
        if self.is_text(parent) {
            return Err(DomError::NotContainer(parent));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let mut index = index;
        if self.parent(child) == Some(parent) {
            if let Some(old) = self.index_of(child) {
                if old < index {
                    index -= 1;
                }
            }
        }
        self.detach(child);
        let len = self.nodes[parent.0].children.len();
        if index > len {
            return Err(DomError::IndexSize {
                node: parent,
                offset: index,
            });
        }
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self.index_of(reference).unwrap_or(0);
        self.insert_child(parent, index, node)
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self.index_of(reference).map_or(0, |index| index + 1);
        self.insert_child(parent, index, node)
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        self.insert_before(old, new)?;
        self.detach(old);
        Ok(())
    }

    pub fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Replace an element with its children.
    pub fn unwrap(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.parent(id).ok_or(DomError::Detached(id))?;
        let mut index = self.index_of(id).unwrap_or(0);
        for child in self.children(id).to_vec() {
            self.insert_child(parent, index, child)?;
            index += 1;
        }
        self.detach(id);
        Ok(())
    }

    /// Split a text node at a character offset. The tail moves into a new
    /// text node inserted right after the original, which is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        let len = text.chars().count();
        if offset > len {
            return Err(DomError::IndexSize { node: id, offset });
        }
        let at = char_to_byte(text, offset);
        let (head, tail) = text.split_at(at);
        let (head, tail) = (head.to_string(), tail.to_string());
        let tail_node = self.create_text(&tail);
        self.set_text(id, &head)?;
        if self.parent(id).is_some() {
            self.insert_after(id, tail_node)?;
        }
        Ok(tail_node)
    }

    /// Splice text into a text node at a character offset.
    pub fn insert_text(&mut self, id: NodeId, offset: usize, data: &str) -> Result<(), DomError> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        if offset > text.chars().count() {
            return Err(DomError::IndexSize { node: id, offset });
        }
        let at = char_to_byte(text, offset);
        let mut updated = text.to_string();
        updated.insert_str(at, data);
        self.set_text(id, &updated)
    }

    /// Remove the characters `from..to` of a text node.
    pub fn delete_text(&mut self, id: NodeId, from: usize, to: usize) -> Result<(), DomError> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        let len = text.chars().count();
        if from > to || to > len {
            return Err(DomError::IndexSize {
                node: id,
                offset: to,
            });
        }
        let updated: String = text
            .chars()
            .enumerate()
            .filter(|(i, _)| *i < from || *i >= to)
            .map(|(_, ch)| ch)
            .collect();
        self.set_text(id, &updated)
    }

    /// Path of child indexes from the top of the node's tree down to it.
    pub(crate) fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_of(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Byte index of the `offset`-th character (clamped to the end).
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(dom: &mut Dom, text: &str) -> (NodeId, NodeId) {
        let p = dom.create_element("P");
        let t = dom.create_text(text);
        dom.append_child(p, t).unwrap();
        dom.append_child(dom.body(), p).unwrap();
        (p, t)
    }

    #[test]
    fn test_tag_is_lowercased_and_node_name_uppercased() {
        let mut dom = Dom::new();
        let (p, t) = paragraph(&mut dom, "hi");
        assert_eq!(dom.tag(p), Some("p"));
        assert_eq!(dom.node_name(p), "P");
        assert_eq!(dom.node_name(t), "#text");
    }

    #[test]
    fn test_split_text_inserts_tail_after() {
        let mut dom = Dom::new();
        let (p, t) = paragraph(&mut dom, "héllo");
        let tail = dom.split_text(t, 2).unwrap();
        assert_eq!(dom.text(t), Some("hé"));
        assert_eq!(dom.text(tail), Some("llo"));
        assert_eq!(dom.children(p), &[t, tail]);
    }

    #[test]
    fn test_insert_child_rejects_cycles() {
        let mut dom = Dom::new();
        let (p, _) = paragraph(&mut dom, "x");
        let err = dom.append_child(p, dom.body()).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let mut dom = Dom::new();
        let (p, t) = paragraph(&mut dom, "a");
        let b = dom.create_element("b");
        let inner = dom.create_text("b");
        dom.append_child(b, inner).unwrap();
        dom.append_child(p, b).unwrap();
        dom.unwrap(b).unwrap();
        assert_eq!(dom.children(p), &[t, inner]);
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_clone_shallow_copies_attrs_not_children() {
        let mut dom = Dom::new();
        let (p, _) = paragraph(&mut dom, "a");
        dom.set_attr(p, "class", "lead").unwrap();
        let copy = dom.clone_shallow(p);
        assert_eq!(dom.tag(copy), Some("p"));
        assert_eq!(dom.attr(copy, "class"), Some("lead"));
        assert!(dom.children(copy).is_empty());
        assert_eq!(dom.parent(copy), None);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let mut dom = Dom::new();
        let (p, t) = paragraph(&mut dom, "a");
        assert!(dom.contains(p, p));
        assert!(dom.contains(p, t));
        assert!(!dom.contains(t, p));
    }

    #[test]
    fn test_delete_text_by_chars() {
        let mut dom = Dom::new();
        let (_, t) = paragraph(&mut dom, "a\u{200b}bc");
        dom.delete_text(t, 1, 2).unwrap();
        assert_eq!(dom.text(t), Some("abc"));
    }
}
