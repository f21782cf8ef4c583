//! Labeled ordered trees and their production-indexed representation.
//!
//! [`TreeNode`] is the owned, recursive form used to build and exchange
//! trees. Kernels do not walk it directly: they consume a
//! [`TreeRepresentation`], which flattens a tree into an arena of
//! [`ProductionNode`]s with stable pre-order ids, precomputed productions and
//! the node order sorted by production.
//!
//! ## Bracketed notation
//!
//! Trees parse from the usual constituency notation, where bare tokens are
//! leaves:
//!
//! ```rust
//! use tensorlogic_convolution_kernels::{TreeNode, TreeRepresentation};
//!
//! let tree: TreeNode = "(S (NP (DT the) (NN dog)) (VP barks))".parse().unwrap();
//! assert_eq!(tree.num_nodes(), 8);
//!
//! let rep = TreeRepresentation::from_tree(&tree);
//! assert_eq!(rep.node(0).unwrap().production(), "S -> NP VP");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// A tree node with label and children
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode {
    /// Node label
    pub label: String,
    /// Child nodes
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Create a tree node with children
    pub fn with_children(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Get the height of the tree
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        height
    }

    /// Get the number of nodes in the tree
    pub fn num_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Production string: the label followed by the children's labels.
    pub fn production(&self) -> String {
        if self.children.is_empty() {
            return self.label.clone();
        }
        let children: Vec<&str> = self.children.iter().map(|c| c.label.as_str()).collect();
        format!("{} -> {}", self.label, children.join(" "))
    }
}

// Parsed trees may be deeper than the call stack allows.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `None` closes the innermost open node.
        let mut stack: Vec<Option<(&TreeNode, bool)>> = vec![Some((self, true))];
        while let Some(item) = stack.pop() {
            let Some((node, first)) = item else {
                write!(f, ")")?;
                continue;
            };
            if !first {
                write!(f, " ")?;
            }
            if node.children.is_empty() {
                write!(f, "{}", node.label)?;
                continue;
            }
            write!(f, "({}", node.label)?;
            stack.push(None);
            stack.extend(node.children.iter().rev().map(|c| Some((c, false))));
        }
        Ok(())
    }
}

impl FromStr for TreeNode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        TreeParser { input: s, pos: 0 }.parse()
    }
}

/// Iterative parser for bracketed trees, so nesting depth is not bounded by
/// the call stack.
struct TreeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TreeParser<'a> {
    fn parse(mut self) -> Result<TreeNode> {
        let mut open: Vec<(usize, TreeNode)> = Vec::new();
        let mut root: Option<TreeNode> = None;

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let start = self.pos;
            if open.is_empty() && root.is_some() {
                return Err(self.error(start, "trailing input after tree"));
            }
            let finished = match c {
                '(' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let label = self.label()?;
                    open.push((start, TreeNode::new(label)));
                    None
                }
                ')' => {
                    self.pos += 1;
                    let (_, node) = open
                        .pop()
                        .ok_or_else(|| self.error(start, "unexpected ')'"))?;
                    Some(node)
                }
                _ => Some(TreeNode::new(self.label()?)),
            };

            if let Some(node) = finished {
                match open.last_mut() {
                    Some((_, parent)) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
        }

        if let Some((offset, _)) = open.last() {
            return Err(self.error(*offset, "unbalanced '(': missing ')'"));
        }
        root.ok_or_else(|| self.error(0, "empty tree"))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn label(&mut self) -> Result<&'a str> {
        let rest: &'a str = &self.input[self.pos..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error(self.pos, "expected a node label"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn error(&self, offset: usize, reason: &str) -> KernelError {
        KernelError::MalformedInput {
            offset,
            reason: reason.to_string(),
        }
    }
}

/// A node of a [`TreeRepresentation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionNode {
    id: usize,
    label: String,
    production: String,
    children: Vec<usize>,
}

impl ProductionNode {
    /// Identifier, unique within the owning tree.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Node label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label plus immediate children's labels.
    pub fn production(&self) -> &str {
        &self.production
    }

    /// Ids of the children, in order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Flattened tree with nodes sorted by production.
///
/// Node ids are assigned in pre-order starting at 0, so the root is node 0
/// and the largest id is `len() - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeRepresentation {
    nodes: Vec<ProductionNode>,
    ordered: Vec<usize>,
}

impl TreeRepresentation {
    /// A tree without nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten `root` into a representation.
    pub fn from_tree(root: &TreeNode) -> Self {
        let mut nodes: Vec<ProductionNode> = Vec::new();
        let mut stack: Vec<(&TreeNode, Option<usize>)> = vec![(root, None)];

        while let Some((node, parent)) = stack.pop() {
            let id = nodes.len();
            nodes.push(ProductionNode {
                id,
                label: node.label.clone(),
                production: node.production(),
                children: Vec::with_capacity(node.children.len()),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(id);
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        let mut ordered: Vec<usize> = (0..nodes.len()).collect();
        ordered.sort_by(|&a, &b| nodes[a].production.cmp(&nodes[b].production));

        Self { nodes, ordered }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    pub fn node(&self, id: usize) -> Option<&ProductionNode> {
        self.nodes.get(id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[ProductionNode] {
        &self.nodes
    }

    /// Root node, if any.
    pub fn root(&self) -> Option<&ProductionNode> {
        self.nodes.first()
    }

    /// Node ids sorted by production string.
    pub fn ordered_nodes_by_production(&self) -> &[usize] {
        &self.ordered
    }

    /// Largest node id, if any.
    pub fn max_id(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }
}

impl From<&TreeNode> for TreeRepresentation {
    fn from(root: &TreeNode) -> Self {
        Self::from_tree(root)
    }
}

impl FromStr for TreeRepresentation {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::from_tree(&s.parse::<TreeNode>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_node_creation() {
        let node = TreeNode::new("root");
        assert_eq!(node.label, "root");
        assert!(node.children.is_empty());
        assert!(node.is_leaf());
    }

    #[test]
    fn test_tree_height_and_size() {
        let tree = TreeNode::with_children(
            "root",
            vec![
                TreeNode::new("child1"),
                TreeNode::with_children("child2", vec![TreeNode::new("grandchild")]),
            ],
        );
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.num_nodes(), 4);
    }

    #[test]
    fn test_production() {
        let tree = TreeNode::with_children("NP", vec![TreeNode::new("DT"), TreeNode::new("NN")]);
        assert_eq!(tree.production(), "NP -> DT NN");
        assert_eq!(TreeNode::new("dog").production(), "dog");
    }

    #[test]
    fn test_parse_nested() {
        let tree: TreeNode = "(S (NP (DT the) (NN dog)) (VP barks))".parse().unwrap();
        assert_eq!(tree.label, "S");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].children[1].children[0].label, "dog");
        assert_eq!(tree.children[1].children[0].label, "barks");
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn test_parse_single_token() {
        let tree: TreeNode = "  X ".parse().unwrap();
        assert_eq!(tree, TreeNode::new("X"));

        let tree: TreeNode = "(X)".parse().unwrap();
        assert_eq!(tree, TreeNode::new("X"));
    }

    #[test]
    fn test_parse_display_round_trip() {
        let text = "(S (NP (DT the) (NN dog)) (VP barks))";
        let tree: TreeNode = text.parse().unwrap();
        assert_eq!(tree.to_string(), text);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("", 0),
            ("   ", 0),
            ("(S (NP a)", 0),
            ("(S a))", 5),
            ("()", 1),
            ("(S a) (T b)", 6),
            ("a b", 2),
        ];
        for (input, expected_offset) in cases {
            match input.parse::<TreeNode>() {
                Err(KernelError::MalformedInput { offset, .. }) => {
                    assert_eq!(offset, expected_offset, "input {:?}", input)
                }
                other => panic!("expected parse error for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_parse_nested_chain() {
        let depth = 1_000;
        let text = format!("{}x{}", "(A ".repeat(depth), ")".repeat(depth));
        let tree: TreeNode = text.parse().unwrap();
        let rep = TreeRepresentation::from_tree(&tree);
        assert_eq!(rep.len(), depth + 1);
    }

    #[test]
    fn test_deep_chain_parses_and_drops() {
        let depth = 100_000;
        let mut text = String::new();
        for level in 0..depth {
            text.push_str(&format!("(L{} ", level));
        }
        text.push('x');
        text.push_str(&")".repeat(depth));

        let tree: TreeNode = text.parse().unwrap();
        assert_eq!(tree.num_nodes(), depth + 1);
        assert_eq!(tree.height(), depth + 1);
        assert_eq!(tree.to_string(), text);
        drop(tree);

        let rep: TreeRepresentation = text.parse().unwrap();
        assert_eq!(rep.len(), depth + 1);
        assert_eq!(rep.node(depth - 1).unwrap().production(), format!("L{} -> x", depth - 1));
    }

    #[test]
    fn test_representation_preorder_ids() {
        let rep: TreeRepresentation = "(S (NP (DT the) (NN dog)) (VP barks))".parse().unwrap();
        let labels: Vec<&str> = rep.nodes().iter().map(|n| n.label()).collect();
        assert_eq!(labels, ["S", "NP", "DT", "the", "NN", "dog", "VP", "barks"]);
        assert_eq!(rep.root().unwrap().children(), &[1, 6]);
        assert_eq!(rep.node(1).unwrap().children(), &[2, 4]);
        assert!(!rep.node(3).unwrap().has_children());
        assert_eq!(rep.max_id(), Some(7));
        for (id, node) in rep.nodes().iter().enumerate() {
            assert_eq!(node.id(), id);
        }
    }

    #[test]
    fn test_representation_sorted_by_production() {
        let rep: TreeRepresentation = "(S (NP (DT the) (NN dog)) (VP (V saw) (NP (DT the) (NN cat))))"
            .parse()
            .unwrap();
        let productions: Vec<&str> = rep
            .ordered_nodes_by_production()
            .iter()
            .map(|&id| rep.node(id).unwrap().production())
            .collect();
        let mut sorted = productions.clone();
        sorted.sort();
        assert_eq!(productions, sorted);
        assert_eq!(productions.len(), rep.len());
    }

    #[test]
    fn test_empty_representation() {
        let rep = TreeRepresentation::empty();
        assert!(rep.is_empty());
        assert_eq!(rep.max_id(), None);
        assert!(rep.root().is_none());
        assert!(rep.ordered_nodes_by_production().is_empty());
    }
}
