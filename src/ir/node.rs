use std::fmt;

/// Node kinds are tree-sitter-python kind names (`"call"`, `"comparison_operator"`, `"("`, ...).
/// Synthesized nodes reuse the same vocabulary so that they are indistinguishable from parsed ones.
pub type Kind = &'static str;

/// Kind of the zero-width leaf appended to every parsed module to carry trailing text.
pub const END_MARKER: Kind = "endmarker";

/// Kind used when wrapping an expression in a new pair of parentheses.
pub const PARENTHESIZED: Kind = "parenthesized_expression";

/// A token of the concrete syntax tree.
///
/// The `prefix` holds everything between the previous token and this one: whitespace, blank lines,
/// comments and line continuations. Rendering a tree is the concatenation of `prefix + text` over all
/// leaves in order, which is what makes the tree lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub kind: Kind,
    pub text: String,
    pub prefix: String,
}

impl Leaf {
    /// Creates a leaf with an empty prefix.
    pub fn new(kind: Kind, text: impl Into<String>) -> Self {
        Leaf { kind, text: text.into(), prefix: String::new() }
    }

    /// Creates a leaf with the given prefix.
    pub fn with_prefix(kind: Kind, text: impl Into<String>, prefix: impl Into<String>) -> Self {
        Leaf { kind, text: text.into(), prefix: prefix.into() }
    }

    /// Token equality: same kind and same literal text, prefix ignored.
    pub fn is(&self, kind: &str, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// True for `(`, `[` and `{`.
    pub fn is_opening_bracket(&self) -> bool {
        matches!(self.kind, "(" | "[" | "{")
    }

    pub fn is_closing_bracket(&self) -> bool {
        matches!(self.kind, ")" | "]" | "}")
    }

    /// True for keyword tokens (`assert`, `not`, `in`, ...) and names.
    ///
    /// Anonymous tree-sitter tokens use their own text as kind, so a keyword is an anonymous token made
    /// of identifier characters.
    pub fn is_word(&self) -> bool {
        self.kind == "identifier"
            || (self.kind == self.text && self.text.chars().all(|c| c.is_ascii_alphabetic() || c == '_'))
    }
}

/// An interior node: a grammar symbol with ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub kind: Kind,
    pub children: Vec<Node>,
}

/// A node of the lossless concrete syntax tree.
///
/// Every node is exclusively owned by its parent, so `clone()` produces a fully independent tree. There
/// are no parent links; locations inside a tree are expressed as child-index paths (see [`Node::get`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
}

impl Node {
    /// Creates a leaf node with an empty prefix.
    pub fn leaf(kind: Kind, text: impl Into<String>) -> Self {
        Node::Leaf(Leaf::new(kind, text))
    }

    /// Creates a branch node.
    pub fn branch(kind: Kind, children: Vec<Node>) -> Self {
        Node::Branch(Branch { kind, children })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Leaf(leaf) => leaf.kind,
            Node::Branch(branch) => branch.kind,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(_) => None,
        }
    }

    /// Returns true if this node is a leaf with the given kind and text.
    pub fn is_token(&self, kind: &str, text: &str) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.is(kind, text))
    }

    /// Returns true if this node is a leaf opening a bracketed group.
    pub fn is_opening_bracket(&self) -> bool {
        self.as_leaf().is_some_and(Leaf::is_opening_bracket)
    }

    pub fn is_closing_bracket(&self) -> bool {
        self.as_leaf().is_some_and(Leaf::is_closing_bracket)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Branch(branch) => &branch.children,
        }
    }

    /// Mutable access to the children; `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch(branch) => Some(&mut branch.children),
        }
    }

    pub fn first_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(branch) => branch.children.iter().find_map(Node::first_leaf),
        }
    }

    pub fn first_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(branch) => branch.children.iter_mut().find_map(Node::first_leaf_mut),
        }
    }

    pub fn last_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(branch) => branch.children.iter().rev().find_map(Node::last_leaf),
        }
    }

    /// The whitespace and comments preceding this node, i.e. the prefix of its first leaf.
    pub fn prefix(&self) -> &str {
        self.first_leaf().map_or("", |leaf| leaf.prefix.as_str())
    }

    /// Replaces the prefix of the first leaf. A branch without leaves is left untouched.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        if let Some(leaf) = self.first_leaf_mut() {
            leaf.prefix = prefix.into();
        }
    }

    /// Resolves a child-index path.
    ///
    /// # Arguments
    /// * `path` - Indices to follow from this node; the empty path designates the node itself.
    ///
    /// # Returns
    /// The node found, or `None` if an index is out of range or a leaf is reached too early.
    ///
    /// # Examples
    /// For the tree of `a == b`, the path `[2]` designates `b`.
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        path.iter().try_fold(self, |node, &index| node.children().get(index))
    }

    /// Mutable variant of [`Node::get`].
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Replaces the node at `path`, returning the node that was there.
    pub fn replace(&mut self, path: &[usize], replacement: Node) -> Option<Node> {
        self.get_mut(path).map(|slot| std::mem::replace(slot, replacement))
    }

    /// Returns the leaf that immediately precedes the node at `path` in document order.
    ///
    /// The search walks back up the path and, at each level, looks at the preceding siblings for their
    /// last leaf. This stands in for parent links when deciding how an inserted operand must be spaced.
    pub fn leaf_before(&self, path: &[usize]) -> Option<&Leaf> {
        for depth in (0..path.len()).rev() {
            let parent = self.get(&path[..depth])?;
            let index = path[depth];
            if let Some(leaf) = parent.children()[..index.min(parent.children().len())]
                .iter()
                .rev()
                .find_map(Node::last_leaf)
            {
                return Some(leaf);
            }
        }
        None
    }

    /// Wraps this node in a new pair of parentheses.
    ///
    /// The node's prefix moves in front of the opening parenthesis, so the wrapped expression sits
    /// exactly where the original did.
    pub fn parenthesize(mut self) -> Node {
        let prefix = self
            .first_leaf_mut()
            .map(|leaf| std::mem::take(&mut leaf.prefix))
            .unwrap_or_default();
        let open = Leaf::with_prefix("(", "(", prefix);
        Node::branch(PARENTHESIZED, vec![Node::Leaf(open), self, Node::leaf(")", ")")])
    }

    /// Number of line breaks in the rendered text of this node.
    pub fn line_breaks(&self) -> usize {
        self.leaves().map(|leaf| count_newlines(&leaf.prefix) + count_newlines(&leaf.text)).sum()
    }

    /// Iterates over all leaves in document order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Renders the tree back to source text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for leaf in self.leaves() {
            out.push_str(&leaf.prefix);
            out.push_str(&leaf.text);
        }
        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leaf in self.leaves() {
            f.write_str(&leaf.prefix)?;
            f.write_str(&leaf.text)?;
        }
        Ok(())
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

/// Depth-first, left-to-right iterator over the leaves of a tree.
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Leaf;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => return Some(leaf),
                Node::Branch(branch) => self.stack.extend(branch.children.iter().rev()),
            }
        }
        None
    }
}

pub(crate) fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
