//! Generic document tree that every host adapter maps into.
//!
//! Nodes live in an arena owned by [`Document`] and refer to each other by
//! [`NodeId`]. Parent links are plain indices, so the tree cannot form
//! ownership cycles and a node can be looked up from anywhere in the pass.
//!
//! All spans are byte offsets into the *original* source buffer of the
//! compilation unit, not into the region a host happened to parse. This lets
//! several documents (e.g. one per Lit template) feed a single patch list.

use indexmap::IndexMap;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Half-open byte range `[start, end)` into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Slice `source` with this span.
    pub fn slice(self, source: &str) -> &str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A tag with attributes (`<div>`, `<Button>`).
    Element,
    /// Literal text between tags.
    Text,
    /// An annotation candidate (`<!-- -->`, `{/* */}`).
    Comment,
    /// Structural node without attributes: document root, fragments,
    /// `{#if}`/`{#each}` blocks and their branches.
    Container,
    /// Anything a host keeps verbatim: expressions, block markers,
    /// script bodies, doctypes.
    Opaque,
}

/// Value of an attribute as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Bare attribute, e.g. `disabled`.
    Missing,
    /// Literal value. `span` covers the raw value including quotes.
    Static { text: String, span: Span },
    /// Host expression, e.g. `{expr}`. `source` is the raw text of `span`.
    Dynamic { source: String, span: Span },
}

impl AttrValue {
    pub fn span(&self) -> Option<Span> {
        match self {
            AttrValue::Missing => None,
            AttrValue::Static { span, .. } | AttrValue::Dynamic { span, .. } => Some(*span),
        }
    }

    pub fn static_text(&self) -> Option<&str> {
        match self {
            AttrValue::Static { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
    /// Whole attribute, name through end of value.
    pub span: Span,
}

impl Attribute {
    /// Shorthand attributes (`{class}`) have a value spanning the attribute itself.
    pub fn is_shorthand(&self) -> bool {
        self.value.span() == Some(self.span)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: Option<String>,
    pub attributes: IndexMap<String, Attribute>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub span: Span,
    /// Raw source text for Text and Opaque nodes, inner text for comments.
    pub raw_text: String,
    /// One entry per lexical comment held by a Comment node.
    pub bodies: Vec<String>,
    /// Offset where a new attribute is inserted (Element only).
    pub attr_insert: Option<usize>,
    consumed: bool,
}

impl Node {
    fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            tag: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            span,
            raw_text: String::new(),
            bodies: Vec::new(),
            attr_insert: None,
            consumed: false,
        }
    }

    pub fn element(tag: impl Into<String>, span: Span, attr_insert: usize) -> Self {
        Self {
            tag: Some(tag.into()),
            attr_insert: Some(attr_insert),
            ..Self::new(NodeKind::Element, span)
        }
    }

    pub fn text(raw: impl Into<String>, span: Span) -> Self {
        Self {
            raw_text: raw.into(),
            ..Self::new(NodeKind::Text, span)
        }
    }

    pub fn comment(bodies: Vec<String>, span: Span) -> Self {
        Self {
            raw_text: bodies.join(" "),
            bodies,
            ..Self::new(NodeKind::Comment, span)
        }
    }

    pub fn container(tag: Option<String>, span: Span) -> Self {
        Self {
            tag,
            ..Self::new(NodeKind::Container, span)
        }
    }

    pub fn opaque(raw: impl Into<String>, span: Span) -> Self {
        Self {
            raw_text: raw.into(),
            ..Self::new(NodeKind::Opaque, span)
        }
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.push_attribute(attr);
        self
    }

    /// Keep the first occurrence when a name repeats, as browsers do.
    pub fn push_attribute(&mut self, attr: Attribute) {
        if !self.attributes.contains_key(&attr.name) {
            self.attributes.insert(attr.name.clone(), attr);
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_comment(&self) -> bool {
        self.kind == NodeKind::Comment
    }

    pub fn is_whitespace_text(&self) -> bool {
        self.kind == NodeKind::Text && self.raw_text.trim().is_empty()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

/// Arena-backed tree for one annotated region.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    dialect: Option<&'static str>,
}

impl Document {
    /// Create a document whose root container covers `span`.
    pub fn new(span: Span) -> Self {
        Self {
            nodes: vec![Node::container(None, span)],
            dialect: None,
        }
    }

    /// Tag the document with the embedded syntax it was read from, for hosts
    /// that find more than one kind of region in a file.
    pub fn with_dialect(mut self, dialect: &'static str) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn dialect(&self) -> Option<&'static str> {
        self.dialect
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append `node` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).tag.as_deref()
    }

    pub fn set_end(&mut self, id: NodeId, end: usize) {
        self.nodes[id.0].span.end = end;
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.node(id).attributes.get(name)
    }

    /// Record a merged attribute value on the tree.
    ///
    /// Existing attributes keep their spans so the tree still describes the
    /// original buffer; new attributes get an empty span at `attr_insert`.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let node = &mut self.nodes[id.0];
        match node.attributes.get_mut(name) {
            Some(attr) => {
                let span = attr.value.span().unwrap_or(attr.span);
                attr.value = AttrValue::Static {
                    text: value.to_string(),
                    span,
                };
            }
            None => {
                let at = node.attr_insert.unwrap_or(node.span.start);
                let span = Span::new(at, at);
                node.attributes.insert(
                    name.to_string(),
                    Attribute {
                        name: name.to_string(),
                        value: AttrValue::Static {
                            text: value.to_string(),
                            span,
                        },
                        span,
                    },
                );
            }
        }
    }

    pub fn mark_consumed(&mut self, id: NodeId) {
        self.nodes[id.0].consumed = true;
    }

    /// Ids in pre-order (document order), root first.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Walk up from `id` (exclusive) through parent links.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |p| self.parent(*p))
    }
}
