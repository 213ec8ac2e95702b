//! Tree Access Layer
//!
//! A mutable, ordered HTML tree stored as an arena. Every node lives in one
//! `Vec` and is addressed by a stable [`NodeId`]; a node records its parent
//! index and the ordered list of its child indices. Detaching a node only
//! edits the parent's child list, so a removed subtree stays addressable
//! (and can be re-inserted elsewhere) without any pointer fix-ups.
//!
//! Parsing goes through `dom_query` (html5ever); the parsed DOM is copied into
//! the arena once and every later read or mutation happens here.
//!
//! Traversal helpers such as [`Tree::descendants`] return a snapshot `Vec` of
//! ids, so a pass may freely mutate the tree while walking the snapshot. Use
//! [`Tree::is_attached`] to skip nodes that an earlier step removed.

use std::collections::HashSet;

use dom_query::Document;

/// Stable handle to a node inside one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One `name="value"` pair on an element, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root. Exactly one per tree, at [`Tree::root`].
    Document,
    /// An element with a lowercase tag name and ordered attributes.
    Element { name: String, attrs: Vec<Attribute> },
    /// A text node.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

const ROOT: NodeId = NodeId(0);

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are serialized verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Arena-backed HTML document tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding only the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    /// Parses an HTML document.
    ///
    /// html5ever always synthesizes `<html>`, `<head>` and `<body>`, so the
    /// result has a body even for fragments. Comments, doctypes and
    /// processing instructions are dropped.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = Document::from(html);
        let mut tree = Self::new();

        let mut stack: Vec<(dom_query::NodeRef, NodeId)> = document
            .root()
            .children()
            .into_iter()
            .rev()
            .map(|child| (child, ROOT))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            if node.is_element() {
                let Some(name) = node.node_name() else {
                    continue;
                };
                let attrs = node
                    .attrs()
                    .iter()
                    .map(|attr| Attribute {
                        name: attr.name.local.to_string(),
                        value: attr.value.to_string(),
                    })
                    .collect();
                let id = tree.push(NodeData::Element {
                    name: name.to_ascii_lowercase(),
                    attrs,
                });
                tree.link_last(parent, id);
                stack.extend(node.children().into_iter().rev().map(|child| (child, id)));
            } else if node.is_text() {
                let id = tree.push(NodeData::Text(node.text().to_string()));
                tree.link_last(parent, id);
            }
        }

        tree
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // === Node Information ===

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of arena slots, including detached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds only the document root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element { .. })
    }

    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    /// Lowercase tag name, `None` for text and document nodes.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    #[must_use]
    pub fn is_one_of(&self, id: NodeId, tags: &[&str]) -> bool {
        self.tag_name(id).is_some_and(|name| tags.contains(&name))
    }

    // === Attribute Operations ===

    /// Attributes of an element; empty for other node kinds.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match self.data(id) {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attrs(id).iter().any(|attr| attr.name == name)
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            if let Some(attr) = attrs.iter_mut().find(|attr| attr.name == name) {
                value.clone_into(&mut attr.value);
            } else {
                attrs.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        self.retain_attrs(id, |attr| attr.name != name);
    }

    /// Keeps only the attributes for which `keep` returns true.
    pub fn retain_attrs(&mut self, id: NodeId, keep: impl FnMut(&Attribute) -> bool) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(keep);
        }
    }

    /// `class` and `id` joined with a space, the string signal vocabularies
    /// are matched against.
    #[must_use]
    pub fn class_and_id(&self, id: NodeId) -> String {
        let class = self.attr(id, "class").unwrap_or_default();
        let ident = self.attr(id, "id").unwrap_or_default();
        format!("{class} {ident}")
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Appends a class token unless it is already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attr(id, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &value);
    }

    // === Text Content ===

    /// Contents of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replaces a text node's contents, or an element's children with a
    /// single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeData::Text(contents) = &mut self.nodes[id.0].data {
            text.clone_into(contents);
            return;
        }
        if self.is_element(id) {
            self.remove_children(id);
            let child = self.create_text(text);
            self.append_child(id, child);
        }
    }

    /// Concatenated contents of every descendant text node.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    // === Tree Navigation ===

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
    }

    /// Position of `id` in its parent's child list.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    #[must_use]
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    /// Element ancestors from the parent upwards, at most `max_depth` of
    /// them (`0` means unbounded).
    #[must_use]
    pub fn ancestors(&self, id: NodeId, max_depth: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            if !self.is_element(node) {
                break;
            }
            out.push(node);
            if max_depth > 0 && out.len() == max_depth {
                break;
            }
            current = self.parent(node);
        }
        out
    }

    /// True when an ancestor within `max_depth` levels (`0` = any) has `tag`.
    #[must_use]
    pub fn has_ancestor_tag(&self, id: NodeId, tag: &str, max_depth: usize) -> bool {
        self.ancestors(id, max_depth)
            .into_iter()
            .any(|ancestor| self.is_tag(ancestor, tag))
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// True when the node is still reachable from the document root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(ROOT, id)
    }

    /// Number of element ancestors.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id, 0).len()
    }

    // === Querying ===

    /// Every node below `id` in document order (snapshot).
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Element descendants matching `pred`, in document order.
    #[must_use]
    pub fn select(&self, id: NodeId, pred: impl Fn(&Tree, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.is_element(node) && pred(self, node))
            .collect()
    }

    /// Element descendants whose tag is one of `tags`, in document order.
    #[must_use]
    pub fn elements_by_tag(&self, id: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.select(id, |tree, node| tree.is_one_of(node, tags))
    }

    #[must_use]
    pub fn find_first(&self, id: NodeId, pred: impl Fn(&Tree, NodeId) -> bool) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&node| self.is_element(node) && pred(self, node))
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(ROOT)
            .iter()
            .copied()
            .find(|&child| self.is_tag(child, "html"))
    }

    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&child| self.is_tag(child, "head"))
    }

    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&child| self.is_tag(child, "body"))
    }

    // === Tree Manipulation ===

    /// Creates a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Removes a node (with its subtree) from its parent. The subtree stays
    /// in the arena and may be re-inserted.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Alias of [`Tree::detach`] matching DOM vocabulary.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.contains(child, parent), "append would create a cycle");
        self.detach(child);
        self.link_last(parent, child);
    }

    /// Moves `child` into `parent` at `index` (clamped to the child count).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(!self.contains(child, parent), "insert would create a cycle");
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Moves `node` to sit immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        else {
            return;
        };
        self.insert_child(parent, index, node);
    }

    /// Puts `new` in `old`'s place; `old` becomes detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.detach(new);
        let (Some(parent), Some(index)) = (self.parent(old), self.index_in_parent(old)) else {
            return;
        };
        self.nodes[parent.0].children[index] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
    }

    /// Replaces a node with its children, in place.
    pub fn unwrap(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(index..=index, children);
        self.nodes[id.0].parent = None;
    }

    /// Changes an element's tag name, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, new_name: &str) {
        if let NodeData::Element { name, .. } = &mut self.nodes[id.0].data {
            *name = new_name.to_ascii_lowercase();
        }
    }

    /// Detaches every child of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Moves all children of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            self.link_last(to, child);
        }
    }

    /// Replaces `parent`'s child list with `children` in one step. Former
    /// children left out become detached.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for child in std::mem::take(&mut self.nodes[parent.0].children) {
            self.nodes[child.0].parent = None;
        }
        for &child in &children {
            self.detach(child);
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    /// Unwraps every node in `ids`, rebuilding each affected child list
    /// once. Targets nested in other targets are unwrapped too.
    pub fn unwrap_all(&mut self, ids: &[NodeId]) {
        let targets: HashSet<NodeId> = ids
            .iter()
            .copied()
            .filter(|&id| self.parent(id).is_some())
            .collect();

        let mut seen = HashSet::new();
        let parents: Vec<NodeId> = ids
            .iter()
            .filter(|id| targets.contains(id))
            .filter_map(|&id| self.parent(id))
            .filter(|parent| !targets.contains(parent) && seen.insert(*parent))
            .collect();

        for parent in parents {
            let mut spliced = Vec::with_capacity(self.children(parent).len());
            for child in self.children(parent).to_vec() {
                self.take_unwrapped(child, &targets, &mut spliced);
            }
            self.set_children(parent, spliced);
        }
    }

    fn take_unwrapped(&mut self, node: NodeId, targets: &HashSet<NodeId>, out: &mut Vec<NodeId>) {
        if !targets.contains(&node) {
            out.push(node);
            return;
        }
        self.nodes[node.0].parent = None;
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
            self.take_unwrapped(child, targets, out);
        }
    }

    // === Serialization ===

    /// Markup of the node and its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, true, &mut out);
        out
    }

    /// Markup of the node's children.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, false, &mut out);
        out
    }

    /// Markup of the whole document.
    #[must_use]
    pub fn html(&self) -> String {
        self.inner_html(ROOT)
    }

    fn serialize(&self, id: NodeId, include_self: bool, out: &mut String) {
        // (node, closing) pairs: closing entries emit end tags.
        let mut stack: Vec<(NodeId, bool)> = if include_self {
            vec![(id, false)]
        } else {
            self.children(id).iter().rev().map(|&child| (child, false)).collect()
        };

        while let Some((node, closing)) = stack.pop() {
            match self.data(node) {
                NodeData::Element { name, attrs } => {
                    if closing {
                        out.push_str("</");
                        out.push_str(name);
                        out.push('>');
                        continue;
                    }
                    out.push('<');
                    out.push_str(name);
                    for attr in attrs {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        escape_into(&attr.value, true, out);
                        out.push('"');
                    }
                    out.push('>');
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        continue;
                    }
                    stack.push((node, true));
                    stack.extend(self.children(node).iter().rev().map(|&child| (child, false)));
                }
                NodeData::Text(text) => {
                    let raw = self
                        .parent(node)
                        .and_then(|parent| self.tag_name(parent))
                        .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent));
                    if raw {
                        out.push_str(text);
                    } else {
                        escape_into(text, false, out);
                    }
                }
                NodeData::Document => {
                    stack.extend(self.children(node).iter().rev().map(|&child| (child, false)));
                }
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Parse HTML string into a tree.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Tree {
    Tree::parse(html)
}
